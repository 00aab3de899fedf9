//! Environment-driven configuration for both binaries.
//!
//! Every setting has a default so a bare checkout runs; only values that are
//! present but malformed are errors.

use std::env::VarError;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_MAIL_FROM: &str = "\"DEMA Shop\" <noreply@demashop.be>";
const DEFAULT_RECIPIENTS: &str = "info@demashop.be";

/// Read `.env` (if any), then build the config from the process env.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Build the config from the process env as it is, without `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Env access for [`build_app_config`]; tests drive it from a map.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn text(&self, var: &str, default: &str) -> String {
        (self.lookup)(var).unwrap_or_else(|_| default.to_string())
    }

    /// Trimmed value; blank counts as unset.
    fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, var: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(var, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let vars = Vars { lookup };

    Ok(AppConfig {
        env: parse_environment(&vars.text("DEMA_ENV", "development")),
        bind_addr: vars.parsed::<SocketAddr>("DEMA_BIND_ADDR", "0.0.0.0:3000")?,
        log_level: vars.text("DEMA_LOG_LEVEL", "info"),
        catalog_input_dir: PathBuf::from(
            vars.text("DEMA_CATALOG_INPUT_DIR", "./documents/Product_pdfs/json"),
        ),
        catalog_output_dir: PathBuf::from(vars.text("DEMA_CATALOG_OUTPUT_DIR", "./public/data")),
        catalogs_path: vars.optional("DEMA_CATALOGS_PATH").map(PathBuf::from),
        cart_path: PathBuf::from(vars.text("DEMA_CART_PATH", "./.dema/quote-cart.json")),
        mail_relay_url: vars.optional("DEMA_MAIL_RELAY_URL"),
        mail_relay_token: vars.optional("DEMA_MAIL_RELAY_TOKEN"),
        mail_from: vars.text("DEMA_MAIL_FROM", DEFAULT_MAIL_FROM),
        quote_recipients: parse_recipients(&vars.text("DEMA_QUOTE_RECIPIENTS", DEFAULT_RECIPIENTS))?,
        mail_timeout_secs: vars.parsed("DEMA_MAIL_TIMEOUT_SECS", "30")?,
        rate_limit_per_minute: vars.parsed("DEMA_RATE_LIMIT_PER_MINUTE", "30")?,
    })
}

/// `production` and `test` are recognised; anything else is development.
fn parse_environment(raw: &str) -> Environment {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Comma-separated recipient list; empty entries are ignored.
fn parse_recipients(raw: &str) -> Result<Vec<String>, ConfigError> {
    let recipients: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if recipients.is_empty() {
        return Err(ConfigError::Validation(
            "DEMA_QUOTE_RECIPIENTS must name at least one address".to_string(),
        ));
    }

    if let Some(bad) = recipients.iter().find(|r| !r.contains('@')) {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEMA_QUOTE_RECIPIENTS".to_string(),
            reason: format!("'{bad}' is not a mail address"),
        });
    }

    Ok(recipients)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
