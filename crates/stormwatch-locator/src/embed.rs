//! Embedded page-props extraction from `<script type="application/json">` tags.

use regex::Regex;

/// Return the first JSON script payload on the page that carries a `props`
/// object, parsed as a `Value`.
///
/// Script tags that do not parse as JSON, or parse but lack `props`, are
/// skipped.
#[must_use]
pub fn extract_props_payload(html: &str) -> Option<serde_json::Value> {
    let script_re = Regex::new(
        r#"(?is)<script\b[^>]*\btype\s*=\s*["']application/json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");

    for cap in script_re.captures_iter(html) {
        let Some(content) = cap.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };

        if content.is_empty() || !content.contains("props") {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) if value.get("props").is_some() => return Some(value),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable JSON script tag");
            }
        }
    }

    None
}

/// The location array under `props.pageProps.locations`, if present.
#[must_use]
pub fn page_locations(payload: &serde_json::Value) -> &[serde_json::Value] {
    payload
        .pointer("/props/pageProps/locations")
        .and_then(serde_json::Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
