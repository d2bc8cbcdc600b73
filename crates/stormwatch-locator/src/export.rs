//! Full directory records and their CSV rendering.
//!
//! Unlike [`crate::parse`], nothing is dropped here: every object in the feed
//! becomes a row, coordinates or not, and `_status` is kept exactly as the
//! feed wrote it.

use std::io::{self, Write};

use serde::Serialize;

const MISSING: &str = "N/A";

/// Column headers, in output order.
pub const CSV_HEADERS: [&str; 17] = [
    "Store Code",
    "Business Name",
    "Address",
    "City",
    "State",
    "Country",
    "Operated By",
    "Online Order Link",
    "Postal Code",
    "Latitude",
    "Longitude",
    "Phone Numbers",
    "Website URL",
    "Business Hours",
    "Status",
    "Slug",
    "Local Page URL",
];

/// One store as listed in the locator directory. Absent values are `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreRecord {
    pub store_code: String,
    pub business_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub operated_by: String,
    pub online_order_link: String,
    pub postal_code: String,
    pub latitude: String,
    pub longitude: String,
    pub phone_numbers: String,
    pub website_url: String,
    pub business_hours: String,
    pub status: String,
    pub slug: String,
    pub local_page_url: String,
}

impl StoreRecord {
    /// Returns `None` only when `record` is not a JSON object.
    #[must_use]
    pub fn from_feed(record: &serde_json::Value) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        let custom = record.get("custom").unwrap_or(&serde_json::Value::Null);

        Some(Self {
            store_code: scalar(record, "storeCode"),
            business_name: scalar(record, "businessName"),
            address: joined(record, "addressLines"),
            city: scalar(record, "city"),
            state: scalar(record, "state"),
            country: scalar(record, "country"),
            operated_by: scalar(custom, "operated_by"),
            online_order_link: scalar(custom, "online_order_link"),
            postal_code: scalar(record, "postalCode"),
            latitude: scalar(record, "latitude"),
            longitude: scalar(record, "longitude"),
            phone_numbers: joined(record, "phoneNumbers"),
            website_url: scalar(record, "websiteURL"),
            business_hours: joined(record, "formattedBusinessHours"),
            status: scalar(record, "_status"),
            slug: scalar(record, "slug"),
            local_page_url: scalar(record, "localPageUrl"),
        })
    }

    fn columns(&self) -> [&str; 17] {
        [
            &self.store_code,
            &self.business_name,
            &self.address,
            &self.city,
            &self.state,
            &self.country,
            &self.operated_by,
            &self.online_order_link,
            &self.postal_code,
            &self.latitude,
            &self.longitude,
            &self.phone_numbers,
            &self.website_url,
            &self.business_hours,
            &self.status,
            &self.slug,
            &self.local_page_url,
        ]
    }
}

/// Write a header row then one row per record, CRLF-terminated.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_csv<W: Write>(records: &[StoreRecord], mut out: W) -> io::Result<()> {
    write_row(&mut out, CSV_HEADERS)?;
    for record in records {
        write_row(&mut out, record.columns())?;
    }
    out.flush()
}

fn write_row<W: Write>(out: &mut W, fields: [&str; 17]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        write_field(out, field)?;
    }
    out.write_all(b"\r\n")
}

/// Quote fields containing a delimiter, quote, or line break; double
/// embedded quotes.
fn write_field<W: Write>(out: &mut W, field: &str) -> io::Result<()> {
    if field.contains([',', '"', '\r', '\n']) {
        write!(out, "\"{}\"", field.replace('"', "\"\""))
    } else {
        out.write_all(field.as_bytes())
    }
}

fn scalar(value: &serde_json::Value, key: &str) -> String {
    match value.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => MISSING.to_string(),
    }
}

fn joined(value: &serde_json::Value, key: &str) -> String {
    let joined = value
        .get(key)
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    if joined.is_empty() {
        MISSING.to_string()
    } else {
        joined
    }
}
