//! Storefront filter facets over flattened variants.
//!
//! Bucket values are derived from the flattened specification map, the
//! same way for counting and for filtering, so a selected option always
//! matches exactly the variants it was counted from.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use dema_core::ProductGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;
use crate::fields::positive_number;

/// One variant with its group context, as the product listing sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatVariant {
    /// Union of the variant's properties and attributes.
    #[serde(flatten)]
    pub specs: Map<String, Value>,
    pub sku: Option<String>,
    /// Variant label, or the SKU when there is no label.
    pub name: Option<String>,
    pub group_id: String,
    pub group_name: String,
    pub catalog: String,
    pub brand: String,
    pub category: String,
    pub pdf_source: String,
    pub page_in_pdf: Option<Value>,
}

impl FlatVariant {
    #[must_use]
    pub fn spec(&self, key: &str) -> Option<&Value> {
        self.specs.get(key)
    }
}

/// Flatten every variant of `groups`, in group then variant order.
#[must_use]
pub fn flatten_groups(groups: &[ProductGroup]) -> Vec<FlatVariant> {
    groups
        .iter()
        .flat_map(|group| {
            group.variants.iter().map(move |variant| {
                let mut specs = variant.properties.clone();
                let sku = variant.sku_text();
                for (key, value) in &variant.attributes {
                    specs.insert(key.clone(), value.clone());
                }
                FlatVariant {
                    specs,
                    name: variant.label.clone().or_else(|| sku.clone()),
                    sku,
                    group_id: group.group_id.clone(),
                    group_name: group.name.clone(),
                    catalog: group.catalog.clone(),
                    brand: group.brand.clone(),
                    category: group.category.clone(),
                    pdf_source: format!("{}.pdf", group.catalog),
                    page_in_pdf: variant.page_in_pdf.clone(),
                }
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetDimension {
    PdfSource,
    PowerKw,
    PressureMaxBar,
    VoltageV,
    WeightKg,
    ConnectionTypes,
}

impl FacetDimension {
    pub const ALL: [FacetDimension; 6] = [
        Self::PdfSource,
        Self::PowerKw,
        Self::PressureMaxBar,
        Self::VoltageV,
        Self::WeightKg,
        Self::ConnectionTypes,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfSource => "pdf_source",
            Self::PowerKw => "power_kw",
            Self::PressureMaxBar => "pressure_max_bar",
            Self::VoltageV => "voltage_v",
            Self::WeightKg => "weight_kg",
            Self::ConnectionTypes => "connection_types",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::PowerKw | Self::PressureMaxBar | Self::VoltageV | Self::WeightKg
        )
    }

    /// Bucket values of `variant` for this dimension. Empty when the variant
    /// has no usable value.
    #[must_use]
    pub fn values_of(self, variant: &FlatVariant) -> Vec<String> {
        match self {
            Self::PdfSource => {
                if variant.pdf_source.is_empty() {
                    Vec::new()
                } else {
                    vec![variant.pdf_source.clone()]
                }
            }
            Self::PowerKw => positive_number(variant.spec("power_kw"))
                .or_else(|| positive_number(variant.spec("power_kw_derived")))
                .map(round_tenth)
                .into_iter()
                .collect(),
            Self::PressureMaxBar => positive_number(variant.spec("pressure_max_bar"))
                .map(round_whole)
                .into_iter()
                .collect(),
            Self::VoltageV => positive_number(variant.spec("voltage_v"))
                .map(round_whole)
                .into_iter()
                .collect(),
            Self::WeightKg => positive_number(variant.spec("weight_kg"))
                .map(round_tenth)
                .into_iter()
                .collect(),
            Self::ConnectionTypes => connection_types(variant),
        }
    }
}

impl fmt::Display for FacetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetDimension {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownFacet(s.to_string()))
    }
}

fn round_tenth(value: f64) -> String {
    format_bucket((value * 10.0).round() / 10.0)
}

fn round_whole(value: f64) -> String {
    format_bucket(value.round())
}

/// Shortest decimal rendering: `12.0` → `"12"`, `1.5` → `"1.5"`.
fn format_bucket(value: f64) -> String {
    format!("{value}")
}

fn connection_types(variant: &FlatVariant) -> Vec<String> {
    let mut values = Vec::new();
    if let Some(Value::Array(entries)) = variant.spec("connection_types") {
        for entry in entries {
            if let Some(text) = scalar_text(entry) {
                if !values.contains(&text) {
                    values.push(text);
                }
            }
        }
    }
    if let Some(text) = variant.spec("connection_type").and_then(scalar_text) {
        if !values.contains(&text) {
            values.push(text);
        }
    }
    values
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// A selectable facet value with the number of variants it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    #[serde(rename = "type")]
    pub dimension: FacetDimension,
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Build the option list of every dimension.
///
/// Every dimension is present in the result, possibly with no options.
#[must_use]
pub fn build_facets(variants: &[FlatVariant]) -> BTreeMap<FacetDimension, Vec<FacetOption>> {
    FacetDimension::ALL
        .into_iter()
        .map(|dimension| (dimension, facet_options(dimension, variants)))
        .collect()
}

fn facet_options(dimension: FacetDimension, variants: &[FlatVariant]) -> Vec<FacetOption> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut options: Vec<FacetOption> = Vec::new();

    for variant in variants {
        for value in dimension.values_of(variant) {
            if let Some(&slot) = seen.get(&value) {
                options[slot].count += 1;
            } else {
                seen.insert(value.clone(), options.len());
                options.push(FacetOption {
                    dimension,
                    label: value.clone(),
                    value,
                    count: 1,
                });
            }
        }
    }

    match dimension {
        FacetDimension::PdfSource => options.sort_by(|a, b| b.count.cmp(&a.count)),
        d if d.is_numeric() => options.sort_by(|a, b| {
            let a = a.value.parse::<f64>().unwrap_or(f64::MAX);
            let b = b.value.parse::<f64>().unwrap_or(f64::MAX);
            a.total_cmp(&b)
        }),
        _ => options.sort_by(|a, b| {
            a.value
                .to_lowercase()
                .cmp(&b.value.to_lowercase())
                .then_with(|| a.value.cmp(&b.value))
        }),
    }
    options
}

/// Selected facet values: OR within a dimension, AND across dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilters(BTreeMap<FacetDimension, Vec<String>>);

impl ActiveFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the selection of `dimension`.
    pub fn select(&mut self, dimension: FacetDimension, value: impl Into<String>) {
        let value = value.into();
        let selected = self.0.entry(dimension).or_default();
        if !selected.contains(&value) {
            selected.push(value);
        }
    }

    /// Drop every selection of `dimension`.
    pub fn clear(&mut self, dimension: FacetDimension) {
        self.0.remove(&dimension);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    #[must_use]
    pub fn selected(&self, dimension: FacetDimension) -> &[String] {
        self.0.get(&dimension).map_or(&[], Vec::as_slice)
    }

    /// Parse `dimension=value` pairs, as given on a command line.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidFilter`] for a pair without `=` or
    /// with an empty value, and [`CatalogError::UnknownFacet`] for an
    /// unknown dimension.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (dimension, value) = pair
                .split_once('=')
                .filter(|(_, v)| !v.trim().is_empty())
                .ok_or_else(|| CatalogError::InvalidFilter(pair.to_string()))?;
            filters.select(dimension.trim().parse()?, value.trim());
        }
        Ok(filters)
    }

    /// Whether `variant` satisfies every active dimension.
    #[must_use]
    pub fn matches(&self, variant: &FlatVariant) -> bool {
        self.0.iter().all(|(dimension, selected)| {
            selected.is_empty() || {
                let values = dimension.values_of(variant);
                selected.iter().any(|s| values.contains(s))
            }
        })
    }
}

/// Variants that satisfy `filters`, in input order.
#[must_use]
pub fn filter_variants<'a>(
    variants: &'a [FlatVariant],
    filters: &ActiveFilters,
) -> Vec<&'a FlatVariant> {
    variants.iter().filter(|v| filters.matches(v)).collect()
}

#[cfg(test)]
#[path = "facets_test.rs"]
mod tests;
