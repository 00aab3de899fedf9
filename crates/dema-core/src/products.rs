use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A family of SKUs from one catalog that share a series and, usually, a
/// display image.
///
/// Field order is the serialized key order of the grouped JSON files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductGroup {
    /// `<catalog>-<grouping key>`, unique within the combined output.
    pub group_id: String,
    pub name: String,
    pub family: String,
    /// Catalog filename without the `.json` extension.
    pub catalog: String,
    pub source_pdf: String,
    pub brand: String,
    pub category: String,
    pub variants: Vec<Variant>,
    /// Unique image paths without a leading `/`. Index 0 is the main image.
    pub images: Vec<String>,
    pub variant_count: usize,
    /// The first variant's `sku`, as extracted.
    #[serde(
        default,
        deserialize_with = "kept_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_variant_sku: Option<Value>,
    pub media: Vec<GroupMedia>,
}

impl ProductGroup {
    /// Returns the variant marked as the group default, if any.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        let sku = self.default_variant_sku.as_ref()?;
        self.variants.iter().find(|v| v.sku.as_ref() == Some(sku))
    }

    /// Returns the main image path (`images[0]`), if the group has one.
    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Finds a variant by SKU. Numeric SKUs match their text form.
    #[must_use]
    pub fn variant(&self, sku: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.sku_text().as_deref() == Some(sku))
    }
}

/// A single SKU inside a [`ProductGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// SKU exactly as extracted; catalogs mix strings and numbers.
    #[serde(
        default,
        deserialize_with = "kept_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub sku: Option<Value>,
    /// Best available display name: series name, type, then SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Page number in the source PDF, exactly as extracted. An explicit
    /// `null` is kept; only a missing field is omitted.
    #[serde(
        default,
        deserialize_with = "kept_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<Value>,
    #[serde(
        default,
        deserialize_with = "kept_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_in_pdf: Option<Value>,
    /// Numeric and physical specifications, in allow-list order.
    pub properties: Map<String, Value>,
    /// Descriptive specifications, in allow-list order.
    pub attributes: Map<String, Value>,
}

impl Variant {
    /// Text form of the SKU, for display and lookups.
    #[must_use]
    pub fn sku_text(&self) -> Option<String> {
        self.sku.as_ref().and_then(scalar_text)
    }
}

/// A present field keeps its value even when that value is `null`, so that
/// grouped files read back unchanged.
fn kept_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Text form of a string or number field.
///
/// Numbers print the way the storefront's JavaScript prints them: a float
/// with no fractional part loses its `.0`, so `1.0` and `1` read the same.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

/// A media reference attached to a group. Only the `main` role is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMedia {
    pub role: String,
    pub url: String,
}

impl GroupMedia {
    #[must_use]
    pub fn main(url: impl Into<String>) -> Self {
        Self {
            role: "main".to_string(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn make_variant(sku: &str) -> Variant {
        Variant {
            sku: Some(json!(sku)),
            label: Some("Widget".to_string()),
            page: Some(json!(4)),
            page_in_pdf: Some(json!(4)),
            properties: Map::new(),
            attributes: Map::new(),
        }
    }

    fn make_group(variants: Vec<Variant>, images: Vec<&str>) -> ProductGroup {
        let images: Vec<String> = images.into_iter().map(ToOwned::to_owned).collect();
        ProductGroup {
            group_id: "widgets-widget".to_string(),
            name: "Widget".to_string(),
            family: "General".to_string(),
            catalog: "widgets".to_string(),
            source_pdf: "widgets.json".to_string(),
            brand: "Various".to_string(),
            category: "Products".to_string(),
            variant_count: variants.len(),
            default_variant_sku: variants.first().and_then(|v| v.sku.clone()),
            media: images.first().map(GroupMedia::main).into_iter().collect(),
            images,
            variants,
        }
    }

    #[test]
    fn default_variant_resolves_sku() {
        let group = make_group(vec![make_variant("A1"), make_variant("A2")], vec![]);
        let default = group.default_variant().expect("expected a default variant");
        assert_eq!(default.sku, Some(json!("A1")));
    }

    #[test]
    fn default_variant_none_for_empty_group() {
        let group = make_group(vec![], vec![]);
        assert!(group.default_variant().is_none());
    }

    #[test]
    fn main_image_is_first_image() {
        let group = make_group(vec![make_variant("A1")], vec!["b.png", "a.png"]);
        assert_eq!(group.main_image(), Some("b.png"));
        assert_eq!(group.media, vec![GroupMedia::main("b.png")]);
    }

    #[test]
    fn variant_lookup_by_sku() {
        let group = make_group(vec![make_variant("A1"), make_variant("A2")], vec![]);
        assert!(group.variant("A2").is_some());
        assert!(group.variant("B9").is_none());
    }

    #[test]
    fn variant_lookup_matches_numeric_sku() {
        let mut numeric = make_variant("unused");
        numeric.sku = Some(json!(7));
        let group = make_group(vec![numeric], vec![]);
        assert!(group.variant("7").is_some());
        assert_eq!(group.default_variant_sku, Some(json!(7)));
        assert!(group.default_variant().is_some());
    }

    #[test]
    fn scalar_text_prints_numbers_like_javascript() {
        assert_eq!(scalar_text(&json!(1.0)).as_deref(), Some("1"));
        assert_eq!(scalar_text(&json!(1)).as_deref(), Some("1"));
        assert_eq!(scalar_text(&json!(-3.0)).as_deref(), Some("-3"));
        assert_eq!(scalar_text(&json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(scalar_text(&json!("HD 5/11")).as_deref(), Some("HD 5/11"));
        assert_eq!(scalar_text(&json!(true)), None);
        assert_eq!(scalar_text(&Value::Null), None);
    }

    #[test]
    fn explicit_null_page_survives_a_round_trip() {
        let variant: Variant = serde_json::from_value(json!({
            "sku": "A1",
            "page": null,
            "page_in_pdf": null,
            "properties": {},
            "attributes": {}
        }))
        .expect("variant");
        assert_eq!(variant.page, Some(Value::Null));
        let back = serde_json::to_value(&variant).expect("serialize");
        assert_eq!(back["page"], Value::Null);
        assert!(back.as_object().is_some_and(|o| o.contains_key("page_in_pdf")));

        let bare: Variant =
            serde_json::from_value(json!({"properties": {}, "attributes": {}})).expect("variant");
        let back = serde_json::to_value(&bare).expect("serialize");
        assert!(back.get("page").is_none());
        assert!(back.get("sku").is_none());
    }

    #[test]
    fn serialization_omits_absent_default_sku() {
        let group = make_group(vec![], vec![]);
        let value = serde_json::to_value(&group).expect("serialize");
        assert!(value.get("default_variant_sku").is_none());
        assert_eq!(value["media"], json!([]));
    }

    #[test]
    fn serialization_preserves_field_order() {
        let group = make_group(vec![make_variant("A1")], vec!["a.png"]);
        let json = serde_json::to_string(&group).expect("serialize");
        let keys = [
            "\"group_id\"",
            "\"name\"",
            "\"family\"",
            "\"catalog\"",
            "\"source_pdf\"",
            "\"brand\"",
            "\"category\"",
            "\"variants\"",
            "\"images\"",
            "\"variant_count\"",
            "\"default_variant_sku\"",
            "\"media\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(k).unwrap_or_else(|| panic!("missing key {k}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
