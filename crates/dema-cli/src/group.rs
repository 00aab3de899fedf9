//! `group` command: run the catalog batch and report what happened.

use std::fmt;
use std::path::PathBuf;

use dema_catalog::{run_batch, BatchOptions, BatchSummary};
use dema_core::{load_catalogs, AppConfig, CatalogsFile};

/// Resolve the batch inputs from flags, falling back to configuration.
///
/// A catalogs file given on the command line wins over `DEMA_CATALOGS_PATH`;
/// with neither, the built-in catalog list is used.
pub(crate) fn batch_options(
    config: &AppConfig,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    catalogs_path: Option<PathBuf>,
) -> anyhow::Result<BatchOptions> {
    let catalogs = match catalogs_path.or_else(|| config.catalogs_path.clone()) {
        Some(path) => load_catalogs(&path)?,
        None => CatalogsFile::default(),
    };

    Ok(BatchOptions {
        input_dir: input_dir.unwrap_or_else(|| config.catalog_input_dir.clone()),
        output_dir: output_dir.unwrap_or_else(|| config.catalog_output_dir.clone()),
        catalogs: catalogs.catalogs,
    })
}

/// Group every configured catalog and print the summary.
///
/// # Errors
///
/// Returns an error if the catalogs file is invalid or the output directory
/// cannot be created. Individual catalog failures only show up as skipped.
pub(crate) fn run_group(
    config: &AppConfig,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    catalogs_path: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let options = batch_options(config, input_dir, output_dir, catalogs_path)?;
    tracing::info!(
        input = %options.input_dir.display(),
        output = %options.output_dir.display(),
        catalogs = options.catalogs.len(),
        "starting catalog grouping"
    );

    let summary = run_batch(&options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(())
}

struct SummaryReport<'a>(&'a BatchSummary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        for outcome in &summary.processed {
            writeln!(
                f,
                "✓ {}: {} products → {} groups ({})",
                outcome.catalog, outcome.products, outcome.groups, outcome.output_file
            )?;
        }
        for skipped in &summary.skipped {
            writeln!(f, "✗ {}: {}", skipped.catalog, skipped.reason)?;
        }
        writeln!(
            f,
            "\n{} catalogs processed, {} skipped: {} products in {} groups ({} in combined file)",
            summary.processed.len(),
            summary.skipped.len(),
            summary.total_products,
            summary.total_groups,
            summary.combined_groups
        )
    }
}

pub(crate) fn render_summary(summary: &BatchSummary) -> String {
    SummaryReport(summary).to_string()
}
