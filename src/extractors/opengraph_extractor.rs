//! OpenGraph meta tags extraction
//!
//! Extracts `og:`, `article:` and `product:` properties plus Twitter Card tags
//! into a flat map keyed by the full property name (`og:title`, `og:image:width`).

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use super::push_value;

const PROPERTY_PREFIXES: [&str; 3] = ["og:", "article:", "product:"];

/// Extract OpenGraph and Twitter Card meta tags
pub fn extract_opengraph(html: &str) -> Value {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("meta") {
        Ok(s) => s,
        Err(_) => return Value::Object(Map::new()),
    };

    let mut og: Map<String, Value> = Map::new();

    for element in document.select(&selector) {
        let content = element.value().attr("content").unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        // Repeated properties, e.g. several og:image tags, become lists
        if let Some(prop) = element.value().attr("property") {
            if PROPERTY_PREFIXES.iter().any(|p| prop.starts_with(p)) {
                push_value(&mut og, prop, Value::from(content));
            }
        }

        if let Some(name) = element.value().attr("name") {
            if name.starts_with("twitter:") {
                push_value(&mut og, name, Value::from(content));
            }
        }
    }

    Value::Object(og)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_opengraph() {
        let html = r#"
        <html>
        <head>
            <meta property="og:title" content="Test Page">
            <meta property="og:description" content="A test description">
            <meta property="og:image" content="https://example.com/image.jpg">
            <meta property="og:image:width" content="1200">
            <meta property="product:price:amount" content="19.99">
            <meta name="twitter:card" content="summary_large_image">
            <meta name="description" content="Page description">
        </head>
        </html>
        "#;

        let result = extract_opengraph(html);

        assert_eq!(result["og:title"], "Test Page");
        assert_eq!(result["og:image:width"], "1200");
        assert_eq!(result["product:price:amount"], "19.99");
        assert_eq!(result["twitter:card"], "summary_large_image");
        assert!(result.get("description").is_none());
    }

    #[test]
    fn test_repeated_property_becomes_list() {
        let html = r#"
            <meta property="og:image" content="a.jpg">
            <meta property="og:image" content="b.jpg">
            <meta property="og:title" content="">
        "#;

        let result = extract_opengraph(html);
        assert_eq!(result["og:image"], serde_json::json!(["a.jpg", "b.jpg"]));
        assert!(result.get("og:title").is_none());
    }
}
