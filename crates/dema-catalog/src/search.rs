//! Free-text search over grouped products.

use std::collections::HashSet;

use dema_core::{scalar_text, ProductGroup};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::facets::{flatten_groups, ActiveFilters, FlatVariant};

/// Minimum query length, in characters, before suggestions are offered.
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionKind {
    #[serde(rename = "SKU")]
    Sku,
    #[serde(rename = "Name")]
    Name,
    #[serde(rename = "Catalog PDF")]
    CatalogPdf,
    #[serde(rename = "PDF Page")]
    PdfPage,
}

impl SuggestionKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sku => "SKU",
            Self::Name => "Name",
            Self::CatalogPdf => "Catalog PDF",
            Self::PdfPage => "PDF Page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub value: String,
    pub group_id: String,
    pub sku: Option<String>,
}

/// Type-ahead suggestions for `query` over flattened variants.
///
/// Matches are case-insensitive substrings of the SKU, the name, the PDF
/// source and the page number, deduplicated, capped at
/// [`MAX_SUGGESTIONS`].
#[must_use]
pub fn suggest(variants: &[FlatVariant], query: &str) -> Vec<SearchSuggestion> {
    if query.chars().count() < MIN_SUGGEST_CHARS {
        return Vec::new();
    }
    let query = query.to_lowercase();
    let mut seen: HashSet<String> = HashSet::new();
    let mut suggestions = Vec::new();

    let mut offer = |dedup_key: String, kind: SuggestionKind, value: String, variant: &FlatVariant| {
        if suggestions.len() < MAX_SUGGESTIONS && seen.insert(dedup_key) {
            suggestions.push(SearchSuggestion {
                kind,
                value,
                group_id: variant.group_id.clone(),
                sku: variant.sku.clone(),
            });
        }
    };

    for variant in variants {
        if let Some(sku) = variant.sku.as_deref().filter(|s| contains(s, &query)) {
            offer(format!("sku-{sku}"), SuggestionKind::Sku, sku.to_string(), variant);
        }
        if let Some(name) = variant.name.as_deref().filter(|n| contains(n, &query)) {
            offer(format!("name-{name}"), SuggestionKind::Name, name.to_string(), variant);
        }
        if contains(&variant.pdf_source, &query) {
            offer(
                format!("pdf-{}", variant.pdf_source),
                SuggestionKind::CatalogPdf,
                variant.pdf_source.clone(),
                variant,
            );
        }
        if let Some(page) = page_text(variant.page_in_pdf.as_ref()).filter(|p| contains(p, &query)) {
            offer(
                format!("page-{}-{page}", variant.sku.as_deref().unwrap_or_default()),
                SuggestionKind::PdfPage,
                format!("Page {page} in {}", variant.pdf_source),
                variant,
            );
        }
    }

    suggestions
}

fn contains(haystack: &str, lowered_query: &str) -> bool {
    haystack.to_lowercase().contains(lowered_query)
}

fn page_text(page: Option<&Value>) -> Option<String> {
    let page = page?;
    let present = match page {
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    };
    if present {
        scalar_text(page)
    } else {
        None
    }
}

/// Criteria for listing product groups.
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub search: Option<String>,
    /// Catalog name without extension.
    pub catalog: Option<String>,
    pub filters: ActiveFilters,
}

impl GroupQuery {
    fn matches_text(&self, group: &ProductGroup) -> bool {
        let Some(query) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return true;
        };
        let query = query.to_lowercase();
        contains(&group.name, &query)
            || contains(&group.family, &query)
            || group.variants.iter().any(|v| {
                v.sku_text().is_some_and(|s| contains(&s, &query))
                    || v.label.as_deref().is_some_and(|l| contains(l, &query))
            })
    }

    fn matches_catalog(&self, group: &ProductGroup) -> bool {
        self.catalog
            .as_deref()
            .filter(|c| !c.is_empty())
            .is_none_or(|c| group.catalog == c)
    }
}

/// Groups matching `query`, in input order. With active facet filters a
/// group is kept when at least one of its variants satisfies them.
#[must_use]
pub fn search_groups<'a>(groups: &'a [ProductGroup], query: &GroupQuery) -> Vec<&'a ProductGroup> {
    let candidates: Vec<&ProductGroup> = groups
        .iter()
        .filter(|g| query.matches_text(g) && query.matches_catalog(g))
        .collect();

    if query.filters.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|group| {
            flatten_groups(std::slice::from_ref(*group))
                .iter()
                .any(|v| query.filters.matches(v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::facets::FacetDimension;

    fn group(catalog: &str, name: &str, variants: Value) -> ProductGroup {
        serde_json::from_value(json!({
            "group_id": format!("{catalog}-{}", name.to_lowercase()),
            "name": name,
            "family": "General",
            "catalog": catalog,
            "source_pdf": format!("{catalog}.json"),
            "brand": "Various",
            "category": "Products",
            "variants": variants,
            "images": [],
            "variant_count": 0,
            "media": []
        }))
        .expect("group")
    }

    fn sample() -> Vec<ProductGroup> {
        vec![
            group(
                "pompen",
                "Dompelpomp",
                json!([
                    {"sku": "DP-100", "label": "Dompelpomp", "page_in_pdf": 12,
                     "properties": {"pressure_max_bar": 4}, "attributes": {}},
                    {"sku": "DP-200", "label": "Dompelpomp", "page_in_pdf": 12,
                     "properties": {"pressure_max_bar": 6}, "attributes": {}}
                ]),
            ),
            group(
                "kranen",
                "Kogelkraan",
                json!([
                    {"sku": "KK-1", "label": "Kogelkraan", "page_in_pdf": 3,
                     "properties": {}, "attributes": {}}
                ]),
            ),
        ]
    }

    #[test]
    fn short_queries_yield_nothing() {
        let flat = flatten_groups(&sample());
        assert!(suggest(&flat, "d").is_empty());
        assert!(suggest(&flat, "").is_empty());
    }

    #[test]
    fn suggestions_are_deduplicated() {
        let flat = flatten_groups(&sample());
        let found = suggest(&flat, "domp");
        let kinds: Vec<_> = found.iter().map(|s| (s.kind, s.value.as_str())).collect();
        assert_eq!(kinds, [(SuggestionKind::Name, "Dompelpomp")]);
    }

    #[test]
    fn sku_and_pdf_matches_are_case_insensitive() {
        let flat = flatten_groups(&sample());
        let found = suggest(&flat, "dp-");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.kind == SuggestionKind::Sku));

        let pdf = suggest(&flat, "KRANEN");
        assert_eq!(pdf[0].kind, SuggestionKind::CatalogPdf);
        assert_eq!(pdf[0].value, "kranen.pdf");
    }

    #[test]
    fn page_suggestions_name_the_pdf() {
        let flat = flatten_groups(&sample());
        let found = suggest(&flat, "12");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, "Page 12 in pompen.pdf");
        assert_eq!(found[1].sku.as_deref(), Some("DP-200"));
    }

    #[test]
    fn suggestions_are_capped() {
        let variants: Vec<Value> = (0..30)
            .map(|i| json!({"sku": format!("AB-{i}"), "properties": {}, "attributes": {}}))
            .collect();
        let groups = vec![group("mix", "Mix", Value::Array(variants))];
        let found = suggest(&flatten_groups(&groups), "ab");
        assert_eq!(found.len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn group_search_matches_name_family_and_variants() {
        let groups = sample();
        let query = GroupQuery {
            search: Some("kk-1".to_string()),
            ..GroupQuery::default()
        };
        let found = search_groups(&groups, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Kogelkraan");

        let all = GroupQuery {
            search: Some("general".to_string()),
            ..GroupQuery::default()
        };
        assert_eq!(search_groups(&groups, &all).len(), 2);
    }

    #[test]
    fn group_search_restricts_catalog() {
        let groups = sample();
        let query = GroupQuery {
            catalog: Some("pompen".to_string()),
            ..GroupQuery::default()
        };
        let found = search_groups(&groups, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].catalog, "pompen");
    }

    #[test]
    fn group_search_applies_facet_filters() {
        let groups = sample();
        let mut query = GroupQuery::default();
        query.filters.select(FacetDimension::PressureMaxBar, "6");
        let found = search_groups(&groups, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].group_id, "pompen-dompelpomp");

        query.filters.select(FacetDimension::PdfSource, "kranen.pdf");
        assert!(search_groups(&groups, &query).is_empty());
    }
}
