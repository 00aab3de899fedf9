//! In-memory view of the combined grouped catalog served by the API.

use std::path::Path;

use dema_catalog::{flatten_groups, read_grouped, FlatVariant};
use dema_core::ProductGroup;

#[derive(Debug, Default)]
pub struct CatalogIndex {
    groups: Vec<ProductGroup>,
    variants: Vec<FlatVariant>,
}

impl CatalogIndex {
    #[must_use]
    pub fn new(groups: Vec<ProductGroup>) -> Self {
        let variants = flatten_groups(&groups);
        Self { groups, variants }
    }

    /// Load `path`, falling back to an empty catalog when it is missing or
    /// unreadable so the quote endpoint keeps working.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match read_grouped(path) {
            Ok(groups) => {
                tracing::info!(path = %path.display(), groups = groups.len(), "catalog loaded");
                Self::new(groups)
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog not available; serving an empty catalog");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn groups(&self) -> &[ProductGroup] {
        &self.groups
    }

    #[must_use]
    pub fn variants(&self) -> &[FlatVariant] {
        &self.variants
    }

    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&ProductGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }
}
