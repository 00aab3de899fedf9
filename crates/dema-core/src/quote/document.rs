use std::fmt;

use askama::Template;
use chrono::{DateTime, Utc};

use super::QuoteRequest;
use crate::QuoteError;

pub(super) const COMPANY_NAME: &str = "DEMA-SHOP bv";
pub(super) const COMPANY_LINES: &[&str] = &[
    "Ovenstraat 11 • 8800 Roeselare • Belgium",
    "T +32(0)51 20 51 41 • info@demashop.be • www.demashop.be",
    "BTW BE 0426.954.705 • RPR Kortrijk",
];
pub(super) const TITLE: &str = "QUOTE REQUEST";
pub(super) const FOOTER_LINES: &[&str] = &[
    "This is a quote request. A formal quote will be sent to you shortly.",
    "Thank you for choosing DEMA-SHOP!",
];

/// Subject of the copy sent back to the customer.
pub const CUSTOMER_SUBJECT: &str = "Your Quote Request - DEMA-SHOP";

const NEXT_STEPS: &[&str] = &[
    "Our team reviews your request",
    "We prepare a customized quote",
    "You receive the quote via email",
    "You can accept or discuss modifications",
];

/// Product names longer than this are cut and suffixed with `...`.
const MAX_NAME_CHARS: usize = 40;

#[derive(Debug, Clone)]
pub(super) struct CustomerRow {
    pub(super) label: &'static str,
    pub(super) value: String,
}

#[derive(Debug, Clone)]
pub(super) struct ItemRow {
    pub(super) position: usize,
    pub(super) name: String,
    pub(super) sku: String,
    pub(super) quantity: u32,
    pub(super) category: String,
    pub(super) notes: String,
}

/// Printable quote request: company header, customer block, item table and
/// footer. `Display` gives the plain-text layout; HTML and PDF renderings
/// share the same rows.
#[derive(Debug, Clone)]
pub struct QuoteDocument {
    submitted_at: DateTime<Utc>,
    pub(super) date: String,
    customer_name: String,
    pub(super) customer_rows: Vec<CustomerRow>,
    /// Empty when the customer left no message.
    pub(super) message: String,
    pub(super) items: Vec<ItemRow>,
}

#[derive(Template)]
#[template(path = "quote_request.html")]
struct QuoteHtml<'a> {
    doc: &'a QuoteDocument,
    company: &'static str,
    company_lines: &'static [&'static str],
    title: &'static str,
    footer_lines: &'static [&'static str],
}

#[derive(Template)]
#[template(path = "quote_confirmation.html")]
struct ConfirmationHtml<'a> {
    customer_name: &'a str,
    steps: &'static [&'static str],
}

#[derive(Template)]
#[template(path = "quote_confirmation.txt")]
struct ConfirmationText<'a> {
    customer_name: &'a str,
    steps: &'static [&'static str],
}

impl QuoteDocument {
    /// Lay out `request`. `now` is used when the request carries no timestamp.
    #[must_use]
    pub fn new(request: &QuoteRequest, now: DateTime<Utc>) -> Self {
        let customer = &request.customer;
        let mut customer_rows = vec![
            CustomerRow {
                label: "Name",
                value: customer.name.clone(),
            },
            CustomerRow {
                label: "Email",
                value: customer.email.clone(),
            },
            CustomerRow {
                label: "Phone",
                value: customer.phone.clone(),
            },
        ];
        let optional = [
            ("Company", &customer.company),
            ("VAT Number", &customer.vat_number),
            ("Address", &customer.address),
        ];
        for (label, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                customer_rows.push(CustomerRow {
                    label,
                    value: value.to_string(),
                });
            }
        }

        let items = request
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemRow {
                position: index + 1,
                name: truncate_name(&item.name),
                sku: item.sku.clone(),
                quantity: item.quantity,
                category: item.category.clone().unwrap_or_default(),
                notes: item.notes.clone().unwrap_or_default(),
            })
            .collect();

        let submitted_at = request.timestamp.unwrap_or(now);
        Self {
            submitted_at,
            date: submitted_at.format("%d/%m/%Y").to_string(),
            customer_name: customer.display_name().to_string(),
            customer_rows,
            message: customer
                .message
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            items,
        }
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// HTML rendering for the team mail body.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Render`] if the template fails to render.
    pub fn to_html(&self) -> Result<String, QuoteError> {
        let page = QuoteHtml {
            doc: self,
            company: COMPANY_NAME,
            company_lines: COMPANY_LINES,
            title: TITLE,
            footer_lines: FOOTER_LINES,
        };
        Ok(page.render()?)
    }

    /// Subject of the message sent to the sales team.
    #[must_use]
    pub fn team_subject(&self) -> String {
        format!("New Quote Request from {}", self.customer_name)
    }

    /// Plain-text acknowledgement for the customer. The document itself
    /// travels as an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Render`] if the template fails to render.
    pub fn confirmation_text(&self) -> Result<String, QuoteError> {
        let page = ConfirmationText {
            customer_name: &self.customer_name,
            steps: NEXT_STEPS,
        };
        Ok(page.render()?)
    }

    /// HTML acknowledgement for the customer.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Render`] if the template fails to render.
    pub fn confirmation_html(&self) -> Result<String, QuoteError> {
        let page = ConfirmationHtml {
            customer_name: &self.customer_name,
            steps: NEXT_STEPS,
        };
        Ok(page.render()?)
    }
}

impl fmt::Display for QuoteDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(72);

        writeln!(f, "{COMPANY_NAME}")?;
        for line in COMPANY_LINES {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "\n{TITLE}")?;
        writeln!(f, "Date: {}", self.date)?;

        writeln!(f, "\nCUSTOMER INFORMATION")?;
        for row in &self.customer_rows {
            writeln!(f, "- {}: {}", row.label, row.value)?;
        }
        if !self.message.is_empty() {
            writeln!(f, "\nMessage: {}", self.message)?;
        }

        writeln!(f, "\nREQUESTED PRODUCTS ({})", self.items.len())?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<4}{:<42}{:<18}{:>6}", "#", "Product", "SKU", "Qty")?;
        writeln!(f, "{rule}")?;
        for item in &self.items {
            writeln!(
                f,
                "{:<4}{:<42}{:<18}{:>6}",
                item.position, item.name, item.sku, item.quantity
            )?;
            if !item.category.is_empty() {
                writeln!(f, "    Category: {}", item.category)?;
            }
            if !item.notes.is_empty() {
                writeln!(f, "    Notes: {}", item.notes)?;
            }
        }
        writeln!(f, "{rule}")?;

        writeln!(f)?;
        for line in FOOTER_LINES {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_CHARS {
        let head: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::quote::{QuoteCustomer, QuoteItem};

    fn request() -> QuoteRequest {
        QuoteRequest {
            items: vec![
                QuoteItem {
                    sku: "DP-100".to_string(),
                    name: "Dompelpomp 100".to_string(),
                    quantity: 2,
                    category: Some("Pompen".to_string()),
                    notes: None,
                },
                QuoteItem {
                    sku: "LONG-1".to_string(),
                    name: "Zeer lange productnaam die zeker niet op één regel past".to_string(),
                    quantity: 1,
                    category: None,
                    notes: Some("a < b & \"c\"".to_string()),
                },
            ],
            customer: QuoteCustomer {
                name: "Jan Peeters".to_string(),
                email: "jan@example.be".to_string(),
                phone: "051000000".to_string(),
                company: Some("Peeters & Zonen".to_string()),
                vat_number: None,
                address: Some("  ".to_string()),
                message: Some("Graag snel antwoord".to_string()),
            },
            timestamp: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
        }
    }

    #[test]
    fn truncate_name_keeps_short_names() {
        assert_eq!(truncate_name("Slangklem"), "Slangklem");
    }

    #[test]
    fn truncate_name_cuts_to_forty_chars() {
        let long = "x".repeat(41);
        let cut = truncate_name(&long);
        assert_eq!(cut.chars().count(), 40);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn text_contains_every_section() {
        let text = QuoteDocument::new(&request(), Utc::now()).to_string();
        assert!(text.starts_with("DEMA-SHOP bv"));
        assert!(text.contains("QUOTE REQUEST"));
        assert!(text.contains("Date: 01/03/2026"));
        assert!(text.contains("- Company: Peeters & Zonen"));
        assert!(text.contains("Message: Graag snel antwoord"));
        assert!(text.contains("REQUESTED PRODUCTS (2)"));
        assert!(text.contains("DP-100"));
        assert!(text.contains("Category: Pompen"));
        assert!(text.contains("Thank you for choosing DEMA-SHOP!"));
    }

    #[test]
    fn blank_optional_customer_fields_are_omitted() {
        let text = QuoteDocument::new(&request(), Utc::now()).to_string();
        assert!(!text.contains("Address:"));
        assert!(!text.contains("VAT Number:"));
    }

    #[test]
    fn html_escapes_customer_text() {
        let html = QuoteDocument::new(&request(), Utc::now())
            .to_html()
            .expect("html");
        assert!(html.contains("Peeters &amp; Zonen"));
        assert!(html.contains("a &lt; b &amp; &quot;c&quot;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn html_lists_every_item_and_the_message() {
        let html = QuoteDocument::new(&request(), Utc::now())
            .to_html()
            .expect("html");
        assert!(html.contains("Requested Products (2)"));
        assert!(html.contains("<td>DP-100</td>"));
        assert!(html.contains("<td>LONG-1</td>"));
        assert!(html.contains("Graag snel antwoord"));
        assert!(html.contains("Date: 01/03/2026"));
    }

    #[test]
    fn html_omits_message_block_when_blank() {
        let mut req = request();
        req.customer.message = Some("   ".to_string());
        let html = QuoteDocument::new(&req, Utc::now())
            .to_html()
            .expect("html");
        assert!(!html.contains("<h3>Message</h3>"));
    }

    #[test]
    fn missing_timestamp_uses_now() {
        let mut req = request();
        req.timestamp = None;
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let doc = QuoteDocument::new(&req, now);
        assert_eq!(doc.submitted_at(), now);
        assert!(doc.to_string().contains("Date: 16/10/2026"));
    }

    #[test]
    fn subjects_name_the_customer() {
        let doc = QuoteDocument::new(&request(), Utc::now());
        assert_eq!(doc.team_subject(), "New Quote Request from Jan Peeters");

        let mut anonymous = request();
        anonymous.customer.name = " ".to_string();
        let doc = QuoteDocument::new(&anonymous, Utc::now());
        assert_eq!(doc.team_subject(), "New Quote Request from jan@example.be");
    }

    #[test]
    fn confirmation_greets_and_lists_next_steps() {
        let doc = QuoteDocument::new(&request(), Utc::now());
        let text = doc.confirmation_text().expect("text");
        assert!(text.starts_with("Dear Jan Peeters,"));
        assert!(text.contains("4. You can accept or discuss modifications"));

        let html = doc.confirmation_html().expect("html");
        assert!(html.contains("<p>Dear Jan Peeters,</p>"));
        assert!(html.contains("<li>Our team reviews your request</li>"));
    }
}
