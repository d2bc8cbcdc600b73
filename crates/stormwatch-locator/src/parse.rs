//! Normalisation of raw feed records into [`Location`] values.

use stormwatch_core::{Location, StoreStatus};

const MISSING: &str = "N/A";

/// Convert every usable record in `records` into a [`Location`].
///
/// Records without a finite, in-range coordinate pair are skipped with a
/// warning; the rest keep feed order.
#[must_use]
pub fn parse_locations(records: &[serde_json::Value]) -> Vec<Location> {
    let mut skipped = 0usize;
    let locations: Vec<Location> = records
        .iter()
        .filter_map(|record| {
            let location = feed_record_to_location(record);
            if location.is_none() {
                skipped += 1;
                tracing::warn!(
                    store_code = record.get("storeCode").map(ToString::to_string),
                    "skipping location record without usable coordinates"
                );
            }
            location
        })
        .collect();

    if skipped > 0 {
        tracing::info!(
            parsed = locations.len(),
            skipped,
            "parsed store-locator records"
        );
    }
    locations
}

/// Map one feed object to a [`Location`].
///
/// Text fields default to `"N/A"`; address lines are joined with `", "`.
/// `_status` is trimmed and upper-cased. Returns `None` when the record is
/// not an object or its coordinates are missing or invalid.
#[must_use]
pub fn feed_record_to_location(record: &serde_json::Value) -> Option<Location> {
    if !record.is_object() {
        return None;
    }

    let latitude = number_field(record, "latitude")?;
    let longitude = number_field(record, "longitude")?;

    let address = record
        .get("addressLines")
        .and_then(serde_json::Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| MISSING.to_string());

    let location = Location {
        store_code: code_field(record, "storeCode"),
        business_name: text_field(record, "businessName"),
        address,
        city: text_field(record, "city"),
        state: text_field(record, "state"),
        postal_code: text_field(record, "postalCode"),
        latitude,
        longitude,
        status: StoreStatus::from_code(
            record
                .get("_status")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(MISSING),
        ),
        last_changed: None,
    };

    location.has_valid_coordinates().then_some(location)
}

fn text_field(record: &serde_json::Value, key: &str) -> String {
    record
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or(MISSING)
        .to_string()
}

/// Store codes are usually strings but some feeds emit bare numbers.
fn code_field(record: &serde_json::Value, key: &str) -> String {
    match record.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Coordinates may be JSON numbers or numeric strings.
fn number_field(record: &serde_json::Value, key: &str) -> Option<f64> {
    match record.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_full_record() {
        let record = json!({
            "storeCode": "1402",
            "businessName": "Waffle House",
            "addressLines": ["3210 Dauphin St", "Suite B"],
            "city": "Mobile",
            "state": "AL",
            "postalCode": "36606",
            "latitude": 30.6954,
            "longitude": -88.1012,
            "_status": " ct "
        });

        let loc = feed_record_to_location(&record).expect("valid record");
        assert_eq!(loc.store_code, "1402");
        assert_eq!(loc.address, "3210 Dauphin St, Suite B");
        assert_eq!(loc.status, StoreStatus::ClosedTemporary);
        assert!(loc.last_changed.is_none());
    }

    #[test]
    fn missing_text_fields_default_to_na() {
        let record = json!({ "latitude": 33.0, "longitude": -84.0 });
        let loc = feed_record_to_location(&record).expect("valid record");
        assert_eq!(loc.store_code, "N/A");
        assert_eq!(loc.address, "N/A");
        assert_eq!(loc.city, "N/A");
        assert_eq!(loc.status, StoreStatus::Unknown("N/A".to_string()));
    }

    #[test]
    fn numeric_store_code_and_string_coordinates_are_accepted() {
        let record = json!({
            "storeCode": 77,
            "latitude": "34.05",
            "longitude": "-84.12",
            "_status": "A"
        });
        let loc = feed_record_to_location(&record).expect("valid record");
        assert_eq!(loc.store_code, "77");
        assert!((loc.latitude - 34.05).abs() < 1e-9);
        assert_eq!(loc.status, StoreStatus::Active);
    }

    #[test]
    fn records_without_coordinates_are_skipped() {
        let records = vec![
            json!({ "storeCode": "1", "latitude": 30.0, "longitude": -88.0, "_status": "A" }),
            json!({ "storeCode": "2", "latitude": null, "longitude": -88.0 }),
            json!({ "storeCode": "3", "longitude": -88.0 }),
            json!({ "storeCode": "4", "latitude": "north", "longitude": -88.0 }),
            json!({ "storeCode": "5", "latitude": 130.0, "longitude": -88.0 }),
            json!("not an object"),
        ];

        let locations = parse_locations(&records);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].store_code, "1");
    }
}
