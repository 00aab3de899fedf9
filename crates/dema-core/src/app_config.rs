use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Deployment environment, from `DEMA_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding the per-catalog JSON files extracted from the PDFs.
    pub catalog_input_dir: PathBuf,
    /// Directory receiving `*_grouped.json` and `products_all_grouped.json`.
    pub catalog_output_dir: PathBuf,
    /// Optional YAML override of the ordered catalog list.
    pub catalogs_path: Option<PathBuf>,
    pub cart_path: PathBuf,
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    pub mail_from: String,
    pub quote_recipients: Vec<String>,
    pub mail_timeout_secs: u64,
    pub rate_limit_per_minute: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_input_dir", &self.catalog_input_dir)
            .field("catalog_output_dir", &self.catalog_output_dir)
            .field("catalogs_path", &self.catalogs_path)
            .field("cart_path", &self.cart_path)
            .field("mail_relay_url", &self.mail_relay_url)
            .field(
                "mail_relay_token",
                &self.mail_relay_token.as_ref().map(|_| "[redacted]"),
            )
            .field("mail_from", &self.mail_from)
            .field("quote_recipients", &self.quote_recipients)
            .field("mail_timeout_secs", &self.mail_timeout_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
