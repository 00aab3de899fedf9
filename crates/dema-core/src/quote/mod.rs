//! Quote request payload, as posted by the storefront.

mod document;
mod pdf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::QuoteError;

pub use document::{QuoteDocument, CUSTOMER_SUBJECT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QuoteCustomer {
    /// Name to greet or list the customer by; falls back to the address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<QuoteItem>,
    pub customer: QuoteCustomer,
    /// Submission time reported by the client. Absent means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl QuoteRequest {
    /// Check the request before anything is rendered or sent.
    ///
    /// # Errors
    ///
    /// Returns the first [`QuoteError`] found.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.items.is_empty() {
            return Err(QuoteError::NoItems);
        }

        for (index, item) in self.items.iter().enumerate() {
            if item.sku.trim().is_empty() {
                return Err(QuoteError::InvalidItem {
                    index,
                    reason: "sku is empty".to_string(),
                });
            }
            if item.name.trim().is_empty() {
                return Err(QuoteError::InvalidItem {
                    index,
                    reason: format!("item {} has no name", item.sku),
                });
            }
            if item.quantity == 0 {
                return Err(QuoteError::InvalidItem {
                    index,
                    reason: format!("item {} has quantity 0", item.sku),
                });
            }
        }

        let customer = &self.customer;
        for (field, value) in [
            ("name", &customer.name),
            ("email", &customer.email),
            ("phone", &customer.phone),
        ] {
            if value.trim().is_empty() {
                return Err(QuoteError::InvalidCustomer {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if !customer.email.contains('@') {
            return Err(QuoteError::InvalidCustomer {
                field: "email",
                reason: format!("'{}' is not a mail address", customer.email),
            });
        }

        Ok(())
    }

    /// Total units requested across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}
