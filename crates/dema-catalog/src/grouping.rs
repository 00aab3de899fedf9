//! Series key used to fold catalog records into product groups.

use std::sync::LazyLock;

use regex::Regex;

use crate::fields::first_present;
use crate::RawProduct;

/// Key assigned to records with no usable series field.
pub const UNGROUPED_KEY: &str = "ungrouped";

/// Fields consulted for the grouping key, highest priority first.
pub const KEY_FIELDS: &[&str] = &["series_id", "series_name", "type", "family_id"];

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Raw (un-normalized) series value of a record, if any key field is present.
#[must_use]
pub fn series_source(record: &RawProduct) -> Option<String> {
    first_present(record, KEY_FIELDS)
}

/// Normalized grouping key for a record.
///
/// The key matches `^[a-z0-9]+(-[a-z0-9]+)*$`, or is [`UNGROUPED_KEY`].
#[must_use]
pub fn grouping_key(record: &RawProduct) -> String {
    series_source(record).map_or_else(|| UNGROUPED_KEY.to_string(), |raw| normalize_key(&raw))
}

/// Lower-case `raw` and collapse every run of characters outside
/// `[a-z0-9]` into a single hyphen. Edge hyphens are dropped.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = NON_ALNUM_RUN.replace_all(&lowered, "-");
    let key = collapsed.trim_matches('-');
    if key.is_empty() {
        UNGROUPED_KEY.to_string()
    } else {
        key.to_string()
    }
}
