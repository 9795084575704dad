//! Microdata (schema.org HTML attributes) extraction
//!
//! Extraction happens in two steps. First every top-level itemscope is read
//! into a raw item `{"type", "id", "properties"}`. Then the items are
//! reshaped into a selector friendly tree keyed by short type names:
//!
//! ```text
//! {"BreadcrumbList": {"ListItem": [{"name": "Home"}, {"name": "Lamps"}]}}
//! ```
//!
//! Reference: https://html.spec.whatwg.org/multipage/microdata.html

use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use url::Url;

use super::push_value;

/// Extract microdata from HTML as a normalized tree
pub fn extract_microdata(html: &str, base_url: Option<&Url>) -> Value {
    let document = Html::parse_document(html);
    normalize_microdata(&extract_microdata_items(&document, base_url))
}

/// Raw top-level microdata items, in document order
pub fn extract_microdata_items(document: &Html, base_url: Option<&Url>) -> Vec<Value> {
    let selector = match Selector::parse("[itemscope]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter(|element| {
            // Nested scopes are read as part of their parent
            !element
                .ancestors()
                .filter_map(|n| n.value().as_element())
                .any(|el| el.attr("itemscope").is_some())
        })
        .map(|element| extract_item(&element, base_url))
        .collect()
}

fn extract_item(element: &ElementRef, base_url: Option<&Url>) -> Value {
    let mut item: Map<String, Value> = Map::new();

    if let Some(itemtype) = element.value().attr("itemtype") {
        if let Some(first) = itemtype.split_whitespace().next() {
            item.insert("type".to_string(), Value::String(first.to_string()));
        }
    }
    if let Some(itemid) = element.value().attr("itemid") {
        item.insert("id".to_string(), Value::String(itemid.to_string()));
    }

    let mut properties: Map<String, Value> = Map::new();
    let prop_selector = match Selector::parse("[itemprop]") {
        Ok(s) => s,
        Err(_) => {
            item.insert("properties".to_string(), Value::Object(properties));
            return Value::Object(item);
        }
    };

    for prop_element in element.select(&prop_selector) {
        if !belongs_to(&prop_element, element) {
            continue;
        }

        let Some(names) = prop_element.value().attr("itemprop") else {
            continue;
        };

        let prop_value = if prop_element.value().attr("itemscope").is_some() {
            extract_item(&prop_element, base_url)
        } else {
            Value::String(property_text(&prop_element, base_url))
        };

        for name in names.split_whitespace() {
            push_value(&mut properties, name, prop_value.clone());
        }
    }

    item.insert("properties".to_string(), Value::Object(properties));
    Value::Object(item)
}

/// True when no other itemscope sits between `prop` and `scope`
fn belongs_to(prop: &ElementRef, scope: &ElementRef) -> bool {
    let mut current = prop.parent();
    while let Some(parent_node) = current {
        if parent_node.id() == scope.id() {
            return true;
        }
        if let Some(parent_elem) = parent_node.value().as_element() {
            if parent_elem.attr("itemscope").is_some() {
                return false;
            }
        }
        current = parent_node.parent();
    }
    true
}

fn property_text(element: &ElementRef, base_url: Option<&Url>) -> String {
    let el = element.value();
    let value = match el.name() {
        "meta" => el.attr("content").unwrap_or("").to_string(),
        "link" | "a" | "area" => resolve(el.attr("href").unwrap_or(""), base_url),
        "img" | "audio" | "video" | "source" | "embed" | "iframe" | "track" => {
            resolve(el.attr("src").unwrap_or(""), base_url)
        }
        "object" => resolve(el.attr("data").unwrap_or(""), base_url),
        "time" => el
            .attr("datetime")
            .map(|s| s.to_string())
            .unwrap_or_else(|| element.text().collect::<String>()),
        "data" | "meter" => el.attr("value").unwrap_or("").to_string(),
        _ => el
            .attr("content")
            .map(|s| s.to_string())
            .unwrap_or_else(|| element.text().collect::<String>()),
    };
    value.trim().to_string()
}

fn resolve(link: &str, base_url: Option<&Url>) -> String {
    match base_url {
        Some(base) if !link.is_empty() => base
            .join(link)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| link.to_string()),
        _ => link.to_string(),
    }
}

/// Short name of an item type: `https://schema.org/Product` -> `Product`
pub fn type_key(itemtype: &str) -> String {
    if let Some(pos) = itemtype.find(".org/") {
        let name: String = itemtype[pos + 5..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() {
            return name;
        }
    }
    itemtype
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(itemtype)
        .to_string()
}

fn is_item(value: &Value) -> bool {
    value.get("properties").is_some_and(Value::is_object)
}

fn item_type(item: &Value) -> Option<String> {
    item.get("type").and_then(Value::as_str).map(type_key)
}

/// Reshape raw items: items are keyed by type, repeated types become lists
pub fn normalize_microdata(items: &[Value]) -> Value {
    let mut tree = Map::new();
    fold_items(items, &mut tree);
    Value::Object(tree)
}

fn fold_items(items: &[Value], into: &mut Map<String, Value>) {
    for item in items {
        let Some(key) = item_type(item) else {
            continue;
        };
        push_value(into, &key, normalize_properties(&item["properties"]));
    }
}

fn normalize_properties(properties: &Value) -> Value {
    let Some(properties) = properties.as_object() else {
        return properties.clone();
    };

    let mut tree = Map::new();
    for (name, value) in properties {
        match value {
            item if is_item(item) => match item_type(item) {
                Some(key) => {
                    tree.insert(key, normalize_properties(&item["properties"]));
                }
                None => {
                    tree.insert(name.clone(), normalize_properties(&item["properties"]));
                }
            },
            Value::Array(values) => {
                // Items are lifted into the parent by type, plain values stay put
                let (items, plain): (Vec<Value>, Vec<Value>) =
                    values.iter().cloned().partition(is_item);
                let mut lifted = Map::new();
                fold_items(&items, &mut lifted);
                tree.extend(lifted);
                if !plain.is_empty() {
                    tree.insert(name.clone(), Value::Array(plain));
                }
            }
            other => {
                tree.insert(name.clone(), other.clone());
            }
        }
    }
    Value::Object(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_simple_microdata() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Product">
            <span itemprop="name">Test Product</span>
            <meta itemprop="gtin13" content="1234567890123">
            <span itemprop="price">19.99</span>
        </div>
        "#;

        let result = extract_microdata(html, None);
        assert_eq!(result["Product"]["name"], "Test Product");
        assert_eq!(result["Product"]["gtin13"], "1234567890123");
    }

    #[test]
    fn test_nested_item_is_keyed_by_type() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Product">
            <span itemprop="name">Product</span>
            <div itemprop="offers" itemscope itemtype="https://schema.org/Offer">
                <span itemprop="price">19.99</span>
            </div>
        </div>
        "#;

        let result = extract_microdata(html, None);
        assert_eq!(result["Product"]["Offer"]["price"], "19.99");
        assert!(result["Product"].get("offers").is_none());
    }

    #[test]
    fn test_breadcrumb_items_are_lifted() {
        let html = r#"
        <ol itemscope itemtype="http://schema.org/BreadcrumbList">
            <li itemprop="itemListElement" itemscope itemtype="http://schema.org/ListItem">
                <a itemprop="item" href="/wonen"><span itemprop="name">Wonen</span></a>
                <meta itemprop="position" content="1">
            </li>
            <li itemprop="itemListElement" itemscope itemtype="http://schema.org/ListItem">
                <span itemprop="name">Tafellamp</span>
                <meta itemprop="position" content="2">
            </li>
        </ol>
        "#;

        let result = extract_microdata(html, None);
        let items = result["BreadcrumbList"]["ListItem"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["name"], "Tafellamp");
        assert_eq!(items[0]["position"], "1");
    }

    #[test]
    fn test_repeated_top_level_types_become_list() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Person"><span itemprop="name">A</span></div>
        <div itemscope itemtype="https://schema.org/Person"><span itemprop="name">B</span></div>
        "#;
        let result = extract_microdata(html, None);
        assert_eq!(result["Person"], json!([{"name": "A"}, {"name": "B"}]));
    }

    #[test]
    fn test_links_resolved_against_page_url() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Product">
            <img itemprop="image" src="/img/lamp.jpg">
        </div>
        "#;
        let base = Url::parse("https://shop.example/products/lamp").unwrap();
        let result = extract_microdata(html, Some(&base));
        assert_eq!(result["Product"]["image"], "https://shop.example/img/lamp.jpg");
    }

    #[test]
    fn test_type_key() {
        assert_eq!(type_key("http://schema.org/Product"), "Product");
        assert_eq!(type_key("https://schema.org/ListItem/"), "ListItem");
        assert_eq!(type_key("https://example.com/types/Widget"), "Widget");
        assert_eq!(type_key("Widget"), "Widget");
    }
}
