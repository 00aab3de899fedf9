use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Catalog files processed by the grouping batch, in processing order.
pub const DEFAULT_CATALOG_FILES: &[&str] = &[
    "pomp-specials.json",
    "messing-draadfittingen.json",
    "rvs-draadfittingen.json",
    "slangkoppelingen.json",
    "pe-buizen.json",
    "rubber-slangen.json",
    "slangklemmen.json",
    "pu-afzuigslangen.json",
    "zwarte-draad-en-lasfittingen.json",
    "kunststof-afvoerleidingen.json",
    "verzinkte-buizen.json",
    "zuigerpompen.json",
    "plat-oprolbare-slangen.json",
    "makita-catalogus-2022-nl.json",
    "makita-tuinfolder-2022-nl.json",
    "kranzle-catalogus-2021-nl-1.json",
    "airpress-catalogus-eng.json",
    "airpress-catalogus-nl-fr.json",
    "bronpompen.json",
    "centrifugaalpompen.json",
    "dompelpompen.json",
    "drukbuizen.json",
    "catalogus-aandrijftechniek-150922.json",
    "digitale-versie-pompentoebehoren-compressed.json",
    "abs-persluchtbuizen.json",
];

/// Name of the file that concatenates every per-catalog output.
pub const COMBINED_FILE_NAME: &str = "products_all_grouped.json";

/// Brand recognised by substring in a catalog filename. Checked in order.
const BRAND_MARKERS: &[(&str, &str)] = &[
    ("makita", "Makita"),
    ("airpress", "Airpress"),
    ("kranzle", "Kränzle"),
    ("kränzle", "Kränzle"),
    ("dema", "Dema"),
];

const FALLBACK_BRAND: &str = "Various";

/// Optional YAML override of [`DEFAULT_CATALOG_FILES`].
#[derive(Debug, Deserialize)]
pub struct CatalogsFile {
    pub catalogs: Vec<String>,
}

impl Default for CatalogsFile {
    fn default() -> Self {
        Self {
            catalogs: DEFAULT_CATALOG_FILES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Strip the `.json` extension from a catalog filename.
///
/// `"pe-buizen.json"` → `"pe-buizen"`.
#[must_use]
pub fn catalog_name(file_name: &str) -> &str {
    file_name.strip_suffix(".json").unwrap_or(file_name)
}

/// Output filename for a catalog: hyphens become underscores and
/// `_grouped.json` is appended.
///
/// `"pe-buizen.json"` → `"pe_buizen_grouped.json"`.
#[must_use]
pub fn grouped_file_name(file_name: &str) -> String {
    format!("{}_grouped.json", catalog_name(file_name).replace('-', "_"))
}

/// Derive the display brand from a catalog filename.
#[must_use]
pub fn brand_for_catalog(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    BRAND_MARKERS
        .iter()
        .find(|(marker, _)| lower.contains(*marker))
        .map_or(FALLBACK_BRAND, |(_, brand)| *brand)
}

/// Load and validate the ordered catalog list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalogs(path: &Path) -> Result<CatalogsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalogs_file: CatalogsFile = serde_yaml::from_str(&content)?;

    validate_catalogs(&catalogs_file)?;

    Ok(catalogs_file)
}

fn validate_catalogs(catalogs_file: &CatalogsFile) -> Result<(), ConfigError> {
    if catalogs_file.catalogs.is_empty() {
        return Err(ConfigError::Validation(
            "catalog list must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut seen_outputs = HashSet::new();

    for file in &catalogs_file.catalogs {
        if !Path::new(file).extension().is_some_and(|ext| ext == "json") {
            return Err(ConfigError::Validation(format!(
                "catalog '{file}' must be a .json file"
            )));
        }

        if file.contains('/') || file.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "catalog '{file}' must be a bare filename"
            )));
        }

        if !seen.insert(file.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalog: '{file}'"
            )));
        }

        // `a-b.json` and `a_b.json` would overwrite each other's output.
        let output = grouped_file_name(file);
        if !seen_outputs.insert(output.clone()) {
            return Err(ConfigError::Validation(format!(
                "catalog '{file}' collides with another catalog on output '{output}'"
            )));
        }
    }

    Ok(())
}
