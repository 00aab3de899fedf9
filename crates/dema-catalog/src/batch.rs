//! Batch run over the configured catalog files.
//!
//! Every catalog is processed independently: a missing or malformed file is
//! logged and skipped, the run itself only fails when the output directory
//! cannot be created.

use std::fs;
use std::path::{Path, PathBuf};

use dema_core::{catalog_name, grouped_file_name, ProductGroup, COMBINED_FILE_NAME};
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::group_products;
use crate::error::CatalogError;
use crate::RawProduct;

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Catalog filenames (e.g. `"pe-buizen.json"`), processed in order.
    pub catalogs: Vec<String>,
}

/// A catalog that was grouped and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogOutcome {
    pub catalog: String,
    pub products: usize,
    pub groups: usize,
    pub output_file: String,
}

/// A catalog left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCatalog {
    pub catalog: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: Vec<CatalogOutcome>,
    pub skipped: Vec<SkippedCatalog>,
    pub total_products: usize,
    pub total_groups: usize,
    /// Number of groups in the combined file.
    pub combined_groups: usize,
}

impl BatchSummary {
    fn skip(&mut self, catalog: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedCatalog {
            catalog: catalog.to_string(),
            reason: reason.into(),
        });
    }
}

/// Run the grouping pipeline over `options.catalogs`.
///
/// Writes one `<name>_grouped.json` per processed catalog and a combined
/// `products_all_grouped.json` built from the files actually written.
///
/// # Errors
///
/// Returns [`CatalogError::OutputDir`] if the output directory cannot be
/// created. Per-catalog failures are reported in the summary instead.
pub fn run_batch(options: &BatchOptions) -> Result<BatchSummary, CatalogError> {
    fs::create_dir_all(&options.output_dir).map_err(|source| CatalogError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;

    let mut summary = BatchSummary::default();

    for catalog_file in &options.catalogs {
        let input_path = options.input_dir.join(catalog_file);
        if !input_path.exists() {
            tracing::warn!(catalog = %catalog_file, path = %input_path.display(), "catalog file not found; skipping");
            summary.skip(catalog_file, "file not found");
            continue;
        }

        let products = match read_catalog(&input_path) {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(catalog = %catalog_file, error = %e, "catalog unreadable; skipping");
                summary.skip(catalog_file, e.to_string());
                continue;
            }
        };

        let groups = group_products(&products, catalog_file);
        let output_file = grouped_file_name(catalog_file);
        let output_path = options.output_dir.join(&output_file);

        if let Err(e) = write_json(&output_path, &groups) {
            tracing::error!(catalog = %catalog_file, error = %e, "failed to write grouped catalog");
            summary.skip(catalog_file, e.to_string());
            continue;
        }

        tracing::info!(
            catalog = %catalog_name(catalog_file),
            products = products.len(),
            groups = groups.len(),
            output = %output_file,
            "catalog grouped"
        );

        summary.total_products += products.len();
        summary.total_groups += groups.len();
        summary.processed.push(CatalogOutcome {
            catalog: catalog_name(catalog_file).to_string(),
            products: products.len(),
            groups: groups.len(),
            output_file,
        });
    }

    let combined = combine_outputs(&options.output_dir, &summary.processed);
    summary.combined_groups = combined.len();
    let combined_path = options.output_dir.join(COMBINED_FILE_NAME);
    match write_json(&combined_path, &combined) {
        Ok(()) => tracing::info!(
            groups = combined.len(),
            path = %combined_path.display(),
            "combined catalog written"
        ),
        Err(e) => tracing::error!(error = %e, "failed to write combined catalog"),
    }

    tracing::info!(
        processed = summary.processed.len(),
        skipped = summary.skipped.len(),
        products = summary.total_products,
        groups = summary.total_groups,
        "catalog batch complete"
    );

    Ok(summary)
}

/// Read a catalog file as a non-empty array of records. Elements that are
/// not JSON objects are dropped with a warning.
///
/// # Errors
///
/// Returns [`CatalogError::Read`], [`CatalogError::Parse`] or
/// [`CatalogError::NotAnArray`].
pub fn read_catalog(path: &Path) -> Result<Vec<RawProduct>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let elements = match value {
        Value::Array(elements) if !elements.is_empty() => elements,
        _ => {
            return Err(CatalogError::NotAnArray {
                path: path.to_path_buf(),
            })
        }
    };

    let mut products = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Object(record) => products.push(record),
            other => tracing::warn!(
                path = %path.display(),
                index,
                kind = json_kind(&other),
                "skipping non-object catalog entry"
            ),
        }
    }
    Ok(products)
}

/// Load a grouped file written by [`run_batch`].
///
/// # Errors
///
/// Returns [`CatalogError::Read`] or [`CatalogError::Parse`].
pub fn read_grouped(path: &Path) -> Result<Vec<ProductGroup>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Concatenate the per-catalog outputs as they are on disk.
fn combine_outputs(output_dir: &Path, processed: &[CatalogOutcome]) -> Vec<Value> {
    let mut combined = Vec::new();
    for outcome in processed {
        let path = output_dir.join(&outcome.output_file);
        let groups = fs::read_to_string(&path)
            .map_err(|source| CatalogError::Read {
                path: path.clone(),
                source,
            })
            .and_then(|raw| {
                serde_json::from_str::<Vec<Value>>(&raw).map_err(|source| CatalogError::Parse {
                    path: path.clone(),
                    source,
                })
            });
        match groups {
            Ok(groups) => combined.extend(groups),
            Err(e) => {
                tracing::warn!(catalog = %outcome.catalog, error = %e, "grouped file not combined");
            }
        }
    }
    combined
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
