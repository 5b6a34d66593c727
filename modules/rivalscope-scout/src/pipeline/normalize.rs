//! Map heterogeneous adapter records onto `ScrapedAd`.
//!
//! Each target field has an ordered alias list; the first alias holding a
//! non-empty value wins. The order is part of the contract.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use rivalscope_common::ScrapedAd;

/// One record as an adapter returned it.
pub type RawRecord = serde_json::Map<String, Value>;

pub const TITLE_ALIASES: &[&str] = &["title", "name", "headline", "caption"];
pub const DESCRIPTION_ALIASES: &[&str] = &["description", "summary", "text", "adText"];
pub const IMAGE_URL_ALIASES: &[&str] = &["imageUrl", "image", "thumbnail", "photo"];
pub const PRODUCT_URL_ALIASES: &[&str] = &["url", "productUrl", "link", "website"];
pub const PRICE_ALIASES: &[&str] = &["price", "cost", "amount", "priceText"];

/// Platform label used when neither the record nor the adapter names one.
const UNKNOWN_PLATFORM: &str = "unknown";

/// Strings count when non-blank; numbers are rendered as text. Anything else
/// (null, bool, arrays, objects) is treated as absent.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First alias with a non-empty value.
pub fn first_non_empty(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| record.get(*key).and_then(value_as_text))
}

/// Copy string/number fields of a nested object up to the top level without
/// overwriting anything already there. Actors such as the ads library nest
/// creative fields under a `snapshot` object.
pub fn lift_nested(record: &mut RawRecord, key: &str) {
    let Some(Value::Object(inner)) = record.get(key).cloned() else {
        return;
    };
    for (k, v) in inner {
        if value_as_text(&v).is_some() && !record.contains_key(&k) {
            record.insert(k, v);
        }
    }
}

pub fn normalize_record(record: &RawRecord, brand: &str, adapter_platform: &str) -> ScrapedAd {
    let platform = record
        .get("platform")
        .and_then(value_as_text)
        .or_else(|| {
            let p = adapter_platform.trim();
            (!p.is_empty()).then(|| p.to_string())
        })
        .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string());

    ScrapedAd {
        id: Uuid::new_v4(),
        brand: brand.to_string(),
        title: first_non_empty(record, TITLE_ALIASES).unwrap_or_default(),
        description: first_non_empty(record, DESCRIPTION_ALIASES).unwrap_or_default(),
        image_url: first_non_empty(record, IMAGE_URL_ALIASES).unwrap_or_default(),
        product_url: first_non_empty(record, PRODUCT_URL_ALIASES).unwrap_or_default(),
        price: first_non_empty(record, PRICE_ALIASES),
        platform,
        scraped_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn name_and_cost_fill_title_and_price() {
        let ad = normalize_record(&record(json!({"name": "Air Zoom", "cost": "$120"})), "Nike", "fixture");
        assert_eq!(ad.title, "Air Zoom");
        assert_eq!(ad.price.as_deref(), Some("$120"));
        assert_eq!(ad.brand, "Nike");
        assert_eq!(ad.platform, "fixture");
    }

    #[test]
    fn alias_order_is_respected() {
        let r = record(json!({
            "caption": "caption wins last",
            "headline": "headline",
            "name": "name beats headline",
        }));
        assert_eq!(first_non_empty(&r, TITLE_ALIASES).as_deref(), Some("name beats headline"));
    }

    #[test]
    fn empty_values_fall_through() {
        let r = record(json!({
            "title": "   ",
            "name": null,
            "headline": "Fresh drop",
            "description": "",
            "summary": "Lightweight trainer",
            "url": "",
            "link": "https://example.com/p/1",
        }));
        let ad = normalize_record(&r, "Puma", "serper_shopping");
        assert_eq!(ad.title, "Fresh drop");
        assert_eq!(ad.description, "Lightweight trainer");
        assert_eq!(ad.product_url, "https://example.com/p/1");
        assert!(ad.price.is_none());
    }

    #[test]
    fn numeric_price_is_rendered() {
        let ad = normalize_record(&record(json!({"amount": 49.5})), "Olay", "x");
        assert_eq!(ad.price.as_deref(), Some("49.5"));
    }

    #[test]
    fn record_platform_overrides_adapter() {
        let ad = normalize_record(&record(json!({"platform": "instagram"})), "Zara", "fixture");
        assert_eq!(ad.platform, "instagram");
    }

    #[test]
    fn platform_is_never_empty() {
        let ad = normalize_record(&record(json!({"platform": ""})), "Zara", "  ");
        assert_eq!(ad.platform, "unknown");
    }

    #[test]
    fn lift_nested_does_not_overwrite() {
        let mut r = record(json!({
            "title": "top",
            "snapshot": {"title": "nested", "body": "ignored-object-free", "link_url": "https://x"}
        }));
        lift_nested(&mut r, "snapshot");
        assert_eq!(r["title"], "top");
        assert_eq!(r["link_url"], "https://x");
    }
}
