//! JSON-LD extraction from HTML
//!
//! Extracts schema.org JSON-LD data from <script type="application/ld+json"> tags.
//! Supports @graph arrays and multiple JSON-LD blocks.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

use super::push_value;

/// Extract schema.org JSON-LD data from HTML, keyed by @type
pub fn extract_jsonld(html: &str) -> Value {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(s) => s,
        Err(_) => return Value::Object(Map::new()),
    };

    let mut result: Map<String, Value> = Map::new();

    for element in document.select(&selector) {
        let content = element.inner_html();
        let trimmed = content.trim();

        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(json) => process_jsonld_value(&json, None, &mut result),
            Err(e) => debug!(error = %e, "skipping malformed JSON-LD block"),
        }
    }

    Value::Object(result)
}

fn process_jsonld_value(value: &Value, context: Option<&Value>, result: &mut Map<String, Value>) {
    match value {
        Value::Array(arr) => {
            for item in arr {
                process_jsonld_value(item, context, result);
            }
        }
        Value::Object(obj) => {
            let context = obj.get("@context").or(context);
            if let Some(Value::Array(graph_items)) = obj.get("@graph") {
                for item in graph_items {
                    process_jsonld_object(item, context, result);
                }
            } else {
                process_jsonld_object(value, context, result);
            }
        }
        _ => {}
    }
}

fn is_schema_org(context: Option<&Value>) -> bool {
    match context {
        Some(Value::String(s)) => s.contains("schema.org"),
        Some(Value::Array(items)) => items.iter().any(|c| is_schema_org(Some(c))),
        Some(Value::Object(obj)) => obj
            .get("@vocab")
            .and_then(Value::as_str)
            .is_some_and(|v| v.contains("schema.org")),
        _ => false,
    }
}

fn type_name(obj: &Map<String, Value>) -> Option<String> {
    let raw = match obj.get("@type")? {
        Value::String(s) => s.as_str(),
        // Use first type in array
        Value::Array(arr) => arr.first().and_then(|v| v.as_str())?,
        _ => return None,
    };
    let clean = raw
        .strip_prefix("https://schema.org/")
        .or_else(|| raw.strip_prefix("http://schema.org/"))
        .unwrap_or(raw);
    if clean.is_empty() {
        None
    } else {
        Some(clean.to_string())
    }
}

fn process_jsonld_object(value: &Value, context: Option<&Value>, result: &mut Map<String, Value>) {
    let Value::Object(obj) = value else {
        return;
    };
    let context = obj.get("@context").or(context);
    if !is_schema_org(context) {
        return;
    }
    let Some(type_name) = type_name(obj) else {
        return;
    };

    // Keywords are dropped, except @id
    let item: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !k.starts_with('@') || k.as_str() == "@id")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    // Repeated types become a list
    push_value(result, &type_name, Value::Object(item));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_jsonld() {
        let html = r##"
        <html>
        <head>
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "Product",
                "@id": "#product",
                "name": "Test Product",
                "price": "19.99"
            }
            </script>
        </head>
        </html>
        "##;

        let result = extract_jsonld(html);
        assert_eq!(result["Product"]["name"], "Test Product");
        assert_eq!(result["Product"]["@id"], "#product");
        assert!(result["Product"].get("@type").is_none());
        assert!(result["Product"].get("@context").is_none());
    }

    #[test]
    fn test_extract_graph_jsonld() {
        let html = r#"
        <script type="application/ld+json">
        {
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Product", "name": "Product 1"},
                {"@type": ["Organization", "Brand"], "name": "Org 1"}
            ]
        }
        </script>
        "#;

        let result = extract_jsonld(html);
        assert_eq!(result["Product"]["name"], "Product 1");
        assert_eq!(result["Organization"]["name"], "Org 1");
    }

    #[test]
    fn test_non_schema_org_and_malformed_blocks_are_skipped() {
        let html = r#"
        <script type="application/ld+json">{"@context": "https://example.com", "@type": "Thing"}</script>
        <script type="application/ld+json">{ not json</script>
        <script type="application/ld+json">{"@context": "http://schema.org/", "name": "untyped"}</script>
        "#;

        let result = extract_jsonld(html);
        assert_eq!(result, Value::Object(Map::new()));
    }

    #[test]
    fn test_repeated_type_becomes_list() {
        let html = r#"
        <script type="application/ld+json">
        [
            {"@context": "https://schema.org", "@type": "Offer", "price": 10},
            {"@context": "https://schema.org", "@type": "Offer", "price": 12}
        ]
        </script>
        "#;

        let result = extract_jsonld(html);
        assert_eq!(result["Offer"][1]["price"], 12);
    }
}
