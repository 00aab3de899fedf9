//! Allow-list driven extraction of variant specifications.

use serde_json::{Map, Value};

use crate::fields::is_meaningful;
use crate::RawProduct;

/// Numeric and physical specification fields copied into `properties`.
pub const PROPERTY_FIELDS: &[&str] = &[
    "type",
    "debiet_m3_h",
    "aansluiting",
    "aanzuigdiepte_m",
    "opv_hoogte_m",
    "lengte",
    "spanning_v",
    "vermogen_w",
    "stroom_a",
    "pomp_dia_mm",
    "pressure_max_bar",
    "pressure_bar",
    "flow_lpm",
    "flow_m3_h",
    "power_w",
    "voltage_v",
    "rpm",
    "weight_kg",
    "dimensions_mm",
    "material",
    "connection_size",
    "diameter_mm",
    "length_m",
    "width_mm",
    "height_mm",
    "depth_mm",
    "capacity_l",
];

/// Descriptive specification fields copied into `attributes`.
pub const ATTRIBUTE_FIELDS: &[&str] = &[
    "spec_liquid_temp_range",
    "spec_temp_range",
    "spec_max_pressure",
    "spec_application_desc",
    "spec_housing",
    "spec_product_variant",
    "application",
    "color",
    "finish",
    "thread_type",
    "pressure_rating",
];

/// Copy every allow-listed field of `record` that is present, not `null`
/// and not an empty string. Output order follows `fields`.
#[must_use]
pub fn extract_fields(record: &RawProduct, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|&field| {
            record
                .get(field)
                .filter(|v| is_meaningful(v))
                .map(|v| (field.to_string(), v.clone()))
        })
        .collect()
}

#[must_use]
pub fn extract_properties(record: &RawProduct) -> Map<String, Value> {
    extract_fields(record, PROPERTY_FIELDS)
}

#[must_use]
pub fn extract_attributes(record: &RawProduct) -> Map<String, Value> {
    extract_fields(record, ATTRIBUTE_FIELDS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> RawProduct {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn allow_lists_are_disjoint() {
        let properties: HashSet<&str> = PROPERTY_FIELDS.iter().copied().collect();
        let overlap: Vec<&&str> = ATTRIBUTE_FIELDS
            .iter()
            .filter(|f| properties.contains(**f))
            .collect();
        assert!(overlap.is_empty(), "overlapping fields: {overlap:?}");
    }

    #[test]
    fn allow_lists_have_no_duplicates() {
        for list in [PROPERTY_FIELDS, ATTRIBUTE_FIELDS] {
            let unique: HashSet<&str> = list.iter().copied().collect();
            assert_eq!(unique.len(), list.len());
        }
    }

    #[test]
    fn skips_null_empty_and_missing() {
        let r = record(json!({
            "pressure_bar": null,
            "material": "",
            "weight_kg": 0,
            "voltage_v": 230
        }));
        let props = extract_properties(&r);
        assert_eq!(props.len(), 2);
        assert_eq!(props["weight_kg"], json!(0));
        assert_eq!(props["voltage_v"], json!(230));
    }

    #[test]
    fn output_follows_allow_list_order() {
        let r = record(json!({
            "capacity_l": 50,
            "material": "PE",
            "type": "HD",
            "sku": "ignored"
        }));
        let props = extract_properties(&r);
        let keys: Vec<&String> = props.keys().collect();
        assert_eq!(keys, ["type", "material", "capacity_l"]);
    }

    #[test]
    fn attributes_use_their_own_list() {
        let r = record(json!({
            "color": "blauw",
            "thread_type": "BSP",
            "pressure_bar": 10,
            "spec_max_pressure": "16 bar"
        }));
        let attrs = extract_attributes(&r);
        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, ["spec_max_pressure", "color", "thread_type"]);
    }

    #[test]
    fn array_and_object_values_are_copied() {
        let r = record(json!({"dimensions_mm": [120, 80], "finish": {"coat": "zink"}}));
        assert_eq!(extract_properties(&r)["dimensions_mm"], json!([120, 80]));
        assert_eq!(extract_attributes(&r)["finish"], json!({"coat": "zink"}));
    }
}
