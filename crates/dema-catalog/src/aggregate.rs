//! Folding of flat catalog records into [`ProductGroup`]s.
//!
//! Group-level descriptive fields come from the first record seen for a
//! key; later records only contribute variants and images.

use std::collections::HashMap;

use dema_core::{brand_for_catalog, catalog_name, GroupMedia, ProductGroup, Variant};
use serde_json::Value;

use crate::extract::{extract_attributes, extract_properties};
use crate::fields::{first_present, present_text};
use crate::grouping::{normalize_key, series_source, UNGROUPED_KEY};
use crate::RawProduct;

/// A group while records are still being folded into it.
struct GroupBuilder {
    group_id: String,
    name: String,
    family: String,
    source_pdf: String,
    category: String,
    variants: Vec<Variant>,
    images: Vec<String>,
}

impl GroupBuilder {
    fn seed(record: &RawProduct, catalog: &str, catalog_file: &str, key: &str, raw_key: &str) -> Self {
        Self {
            group_id: format!("{catalog}-{key}"),
            name: first_present(record, &["series_name", "type"])
                .unwrap_or_else(|| raw_key.to_string()),
            family: first_present(record, &["family_id", "series_id"])
                .unwrap_or_else(|| "General".to_string()),
            source_pdf: present_text(record, "source_pdf")
                .unwrap_or_else(|| catalog_file.to_string()),
            category: first_present(record, &["catalog_group", "application"])
                .unwrap_or_else(|| "Products".to_string()),
            variants: Vec::new(),
            images: Vec::new(),
        }
    }

    fn push_variant(&mut self, record: &RawProduct) {
        let label = first_present(record, &["series_name", "type", "sku"]);
        let page = record.get("page").cloned();

        self.variants.push(Variant {
            sku: record.get("sku").cloned(),
            label,
            page_in_pdf: page.clone(),
            page,
            properties: extract_properties(record),
            attributes: extract_attributes(record),
        });

        if let Some(image) = image_path(record, "image") {
            if !self.images.contains(&image) {
                self.images.push(image);
            }
        }
        // A series image becomes the main image even when variant images
        // were recorded first.
        if let Some(series_image) = image_path(record, "series_image") {
            if !self.images.contains(&series_image) {
                self.images.insert(0, series_image);
            }
        }
    }

    fn finish(self, catalog: &str, brand: &str) -> ProductGroup {
        let variant_count = self.variants.len();
        let default_variant_sku = self.variants.first().and_then(|v| v.sku.clone());
        let media = self
            .images
            .first()
            .map(|url| GroupMedia::main(url.as_str()))
            .into_iter()
            .collect();

        ProductGroup {
            group_id: self.group_id,
            name: self.name,
            family: self.family,
            catalog: catalog.to_string(),
            source_pdf: self.source_pdf,
            brand: brand.to_string(),
            category: self.category,
            variants: self.variants,
            images: self.images,
            variant_count,
            default_variant_sku,
            media,
        }
    }
}

/// Image path of `field` with one leading `/` removed.
fn image_path(record: &RawProduct, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(path) if !path.is_empty() => {
            Some(path.strip_prefix('/').unwrap_or(path).to_string())
        }
        _ => None,
    }
}

/// Group the records of one catalog file.
///
/// `catalog_file` is the source filename (e.g. `"pe-buizen.json"`); it
/// namespaces the group ids and determines the brand. Groups are returned
/// in the order their first record appears.
#[must_use]
pub fn group_products(products: &[RawProduct], catalog_file: &str) -> Vec<ProductGroup> {
    let catalog = catalog_name(catalog_file);
    let brand = brand_for_catalog(catalog_file);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut builders: Vec<GroupBuilder> = Vec::new();

    for record in products {
        let raw_key = series_source(record);
        let key = raw_key
            .as_deref()
            .map_or_else(|| UNGROUPED_KEY.to_string(), normalize_key);

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let raw = raw_key.as_deref().unwrap_or(UNGROUPED_KEY);
                builders.push(GroupBuilder::seed(record, catalog, catalog_file, &key, raw));
                index.insert(key, builders.len() - 1);
                builders.len() - 1
            }
        };

        builders[slot].push_variant(record);
    }

    builders
        .into_iter()
        .map(|b| b.finish(catalog, brand))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(value: serde_json::Value) -> Vec<RawProduct> {
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|v| v.as_object().cloned().expect("object"))
            .collect()
    }

    #[test]
    fn widgets_end_to_end() {
        let input = records(json!([
            {"sku": "A1", "series_name": "Widget", "pressure_bar": 10},
            {"sku": "A2", "series_name": "Widget", "pressure_bar": 12}
        ]));
        let groups = group_products(&input, "widgets.json");

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.group_id, "widgets-widget");
        assert_eq!(group.catalog, "widgets");
        assert_eq!(group.name, "Widget");
        assert_eq!(group.family, "General");
        assert_eq!(group.category, "Products");
        assert_eq!(group.brand, "Various");
        assert_eq!(group.source_pdf, "widgets.json");
        assert_eq!(group.variant_count, 2);
        assert_eq!(group.default_variant_sku, Some(json!("A1")));
        let skus: Vec<_> = group.variants.iter().map(|v| v.sku.clone()).collect();
        assert_eq!(skus, [Some(json!("A1")), Some(json!("A2"))]);
        assert_eq!(group.variants[1].properties["pressure_bar"], json!(12));
        assert!(group.media.is_empty());
    }

    #[test]
    fn same_key_lands_in_one_group() {
        let input = records(json!([
            {"sku": "1", "series_id": "HD 5/11"},
            {"sku": "2", "type": "x"},
            {"sku": "3", "series_id": "hd-5-11"},
            {"sku": "4", "series_name": "HD 5 11 "}
        ]));
        let groups = group_products(&input, "kranzle-catalogus.json");

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "kranzle-catalogus-hd-5-11");
        assert_eq!(groups[0].variant_count, 3);
        assert_eq!(groups[1].group_id, "kranzle-catalogus-x");
        assert!(groups.iter().all(|g| g.brand == "Kränzle"));
    }

    #[test]
    fn series_image_takes_main_position() {
        let input = records(json!([
            {"sku": "P1", "series_name": "S", "image": "a.png"},
            {"sku": "P2", "series_name": "S", "series_image": "b.png"}
        ]));
        let group = &group_products(&input, "pompen.json")[0];
        assert_eq!(group.images, ["b.png", "a.png"]);
        assert_eq!(group.media[0].url, "b.png");
        assert_eq!(group.media[0].role, "main");
    }

    #[test]
    fn images_are_deduplicated_and_unslashed() {
        let input = records(json!([
            {"sku": "P1", "series_name": "S", "image": "/img/a.png", "series_image": "/img/s.png"},
            {"sku": "P2", "series_name": "S", "image": "img/a.png", "series_image": "img/s.png"},
            {"sku": "P3", "series_name": "S", "image": "img/c.png"}
        ]));
        let group = &group_products(&input, "pompen.json")[0];
        assert_eq!(group.images, ["img/s.png", "img/a.png", "img/c.png"]);
    }

    #[test]
    fn first_record_seeds_group_metadata() {
        let input = records(json!([
            {"sku": "P1", "series_id": "S-1", "catalog_group": "Pompen"},
            {"sku": "P2", "series_id": "S-1", "series_name": "Later Name", "family_id": "F9", "catalog_group": "Other"}
        ]));
        let group = &group_products(&input, "pompen.json")[0];
        assert_eq!(group.name, "S-1");
        assert_eq!(group.family, "S-1");
        assert_eq!(group.category, "Pompen");
        assert_eq!(group.variants[1].label.as_deref(), Some("Later Name"));
    }

    #[test]
    fn descriptive_fallbacks() {
        let input = records(json!([
            {"sku": "P1", "type": "Kogelkraan", "family_id": "FAM", "application": "Water", "source_pdf": "kranen.pdf"}
        ]));
        let group = &group_products(&input, "makita-catalogus.json")[0];
        assert_eq!(group.name, "Kogelkraan");
        assert_eq!(group.family, "FAM");
        assert_eq!(group.category, "Water");
        assert_eq!(group.source_pdf, "kranen.pdf");
        assert_eq!(group.brand, "Makita");
        assert_eq!(group.variants[0].attributes["application"], json!("Water"));
    }

    #[test]
    fn ungrouped_records_share_a_group() {
        let input = records(json!([{"sku": "U1"}, {"sku": "U2", "series_id": ""}]));
        let groups = group_products(&input, "pe-buizen.json");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_id, "pe-buizen-ungrouped");
        assert_eq!(groups[0].name, "ungrouped");
        assert_eq!(groups[0].variants[0].label.as_deref(), Some("U1"));
    }

    #[test]
    fn page_is_duplicated_into_page_in_pdf() {
        let input = records(json!([{"sku": "P1", "page": 17}]));
        let variant = &group_products(&input, "pe-buizen.json")[0].variants[0];
        assert_eq!(variant.page, Some(json!(17)));
        assert_eq!(variant.page_in_pdf, Some(json!(17)));
    }

    #[test]
    fn explicit_null_page_is_kept() {
        let input = records(json!([{"sku": "P1", "page": null}, {"sku": "P2"}]));
        let group = &group_products(&input, "pe-buizen.json")[0];
        assert_eq!(group.variants[0].page, Some(Value::Null));
        assert_eq!(group.variants[0].page_in_pdf, Some(Value::Null));
        assert_eq!(group.variants[1].page, None);

        let json = serde_json::to_value(group).expect("serialize");
        assert!(json["variants"][0]
            .as_object()
            .is_some_and(|v| v.contains_key("page") && v.contains_key("page_in_pdf")));
        assert!(json["variants"][1].get("page").is_none());
    }

    #[test]
    fn integral_float_series_ids_group_with_integers() {
        let input = records(json!([
            {"sku": "A", "series_id": 1.0},
            {"sku": "B", "series_id": 1},
            {"sku": "C", "series_id": 2}
        ]));
        let groups = group_products(&input, "x.json");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "x-1");
        assert_eq!(groups[0].name, "1");
        assert_eq!(groups[0].variant_count, 2);
        assert_eq!(groups[1].group_id, "x-2");
    }

    #[test]
    fn numeric_sku_passes_through_unchanged() {
        let input = records(json!([{"sku": 7, "series_id": 3}]));
        let group = &group_products(&input, "x.json")[0];
        assert_eq!(group.group_id, "x-3");
        assert_eq!(group.variants[0].sku, Some(json!(7)));
        assert_eq!(group.default_variant_sku, Some(json!(7)));
        assert_eq!(group.variants[0].sku_text().as_deref(), Some("7"));

        let json = serde_json::to_value(group).expect("serialize");
        assert_eq!(json["default_variant_sku"], json!(7));
        assert_eq!(json["variants"][0]["sku"], json!(7));
    }

    #[test]
    fn counts_and_defaults_are_consistent() {
        let input = records(json!([
            {"sku": "A", "series_name": "X"},
            {"sku": "B", "series_name": "Y"},
            {"series_name": "Y"},
            {"sku": "C", "series_name": "X"}
        ]));
        for group in group_products(&input, "mix.json") {
            assert_eq!(group.variant_count, group.variants.len());
            assert_eq!(group.default_variant_sku, group.variants[0].sku);
        }
    }

    #[test]
    fn distinct_catalogs_do_not_share_group_ids() {
        let input = records(json!([{"sku": "A", "series_name": "Widget"}]));
        let a = group_products(&input, "a.json");
        let b = group_products(&input, "b.json");
        assert_ne!(a[0].group_id, b[0].group_id);
    }
}
