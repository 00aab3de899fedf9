pub mod app_config;
pub mod cart;
pub mod catalogs;
pub mod config;
pub mod products;
pub mod quote;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::{
    CartItem, CartState, CartStore, JsonFileCartStore, MemoryCartStore, NewCartItem, QuoteCart,
};
pub use catalogs::{
    brand_for_catalog, catalog_name, grouped_file_name, load_catalogs, CatalogsFile,
    COMBINED_FILE_NAME, DEFAULT_CATALOG_FILES,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{scalar_text, GroupMedia, ProductGroup, Variant};
pub use quote::{QuoteCustomer, QuoteDocument, QuoteItem, QuoteRequest, CUSTOMER_SUBJECT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalogs file {path}: {source}")]
    CatalogsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogs file: {0}")]
    CatalogsFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("failed to access cart file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode cart file {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode cart state: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request has no items")]
    NoItems,

    #[error("invalid quote item {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("invalid customer field {field}: {reason}")]
    InvalidCustomer { field: &'static str, reason: String },

    #[error("failed to render quote template: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to build quote PDF: {0}")]
    Pdf(String),
}
