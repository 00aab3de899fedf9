pub mod aggregate;
pub mod batch;
pub mod error;
pub mod extract;
pub mod facets;
mod fields;
pub mod grouping;
pub mod search;

pub use aggregate::group_products;
pub use batch::{
    read_catalog, read_grouped, run_batch, BatchOptions, BatchSummary, CatalogOutcome,
    SkippedCatalog,
};
pub use error::CatalogError;
pub use extract::{extract_attributes, extract_properties, ATTRIBUTE_FIELDS, PROPERTY_FIELDS};
pub use facets::{
    build_facets, filter_variants, flatten_groups, ActiveFilters, FacetDimension, FacetOption,
    FlatVariant,
};
pub use grouping::{grouping_key, UNGROUPED_KEY};
pub use search::{search_groups, suggest, GroupQuery, SearchSuggestion, SuggestionKind};

/// A raw record from a catalog file: arbitrary keys, insertion order kept.
pub type RawProduct = serde_json::Map<String, serde_json::Value>;
