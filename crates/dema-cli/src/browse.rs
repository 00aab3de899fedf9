//! Read-only commands over a grouped catalog: `facets` and `search`.

use std::fmt;
use std::path::PathBuf;

use dema_catalog::{
    build_facets, filter_variants, flatten_groups, read_grouped, search_groups, suggest,
    ActiveFilters, FacetDimension, FacetOption, GroupQuery,
};
use dema_core::{AppConfig, ProductGroup, COMBINED_FILE_NAME};

pub(crate) struct SearchArgs {
    pub query: Option<String>,
    pub catalog: Option<String>,
    pub filters: Vec<String>,
    pub suggest: bool,
    pub limit: usize,
}

fn load_groups(config: &AppConfig, file: Option<PathBuf>) -> anyhow::Result<Vec<ProductGroup>> {
    let path = file.unwrap_or_else(|| config.catalog_output_dir.join(COMBINED_FILE_NAME));
    let groups = read_grouped(&path)?;
    tracing::debug!(path = %path.display(), groups = groups.len(), "grouped catalog loaded");
    Ok(groups)
}

/// Print facet options for the variants that pass `filters`.
pub(crate) fn run_facets(
    config: &AppConfig,
    file: Option<PathBuf>,
    filters: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let groups = load_groups(config, file)?;
    let filters = ActiveFilters::from_pairs(filters)?;

    let variants = flatten_groups(&groups);
    let visible: Vec<_> = filter_variants(&variants, &filters)
        .into_iter()
        .cloned()
        .collect();
    let facets = build_facets(&visible);

    if json {
        println!("{}", serde_json::to_string_pretty(&facets)?);
    } else {
        for (dimension, options) in &facets {
            print!("{}", render_facet(*dimension, options));
        }
    }
    Ok(())
}

struct FacetListing<'a> {
    dimension: FacetDimension,
    options: &'a [FacetOption],
}

impl fmt::Display for FacetListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.dimension)?;
        if self.options.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for option in self.options {
            writeln!(f, "  {} ({})", option.label, option.count)?;
        }
        Ok(())
    }
}

pub(crate) fn render_facet(dimension: FacetDimension, options: &[FacetOption]) -> String {
    FacetListing { dimension, options }.to_string()
}

/// Print matching groups, or type-ahead suggestions with `--suggest`.
pub(crate) fn run_search(
    config: &AppConfig,
    file: Option<PathBuf>,
    args: SearchArgs,
) -> anyhow::Result<()> {
    let groups = load_groups(config, file)?;

    if args.suggest {
        let query = args.query.unwrap_or_default();
        for suggestion in suggest(&flatten_groups(&groups), &query) {
            println!("{:<12} {}", suggestion.kind.label(), suggestion.value);
        }
        return Ok(());
    }

    let query = GroupQuery {
        search: args.query,
        catalog: args.catalog,
        filters: ActiveFilters::from_pairs(&args.filters)?,
    };
    let found = search_groups(&groups, &query);
    for group in found.iter().take(args.limit) {
        println!("{}", render_group_line(group));
    }
    println!("\n{} of {} groups match", found.len(), groups.len());
    Ok(())
}

pub(crate) fn render_group_line(group: &ProductGroup) -> String {
    format!(
        "{:<40} {} [{}] ({} variants)",
        group.group_id, group.name, group.brand, group.variant_count
    )
}
