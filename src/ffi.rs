//! FFI interface for C/C++ hosts
//!
//! Requests and results cross the boundary as JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::extractors::{Format, SemanticData};
use crate::selectors::{discover_selector, ApplyMode, SelectorMap, SemanticSelector};

/// Result struct returned to the host.
/// Both pointers are owned by Rust and must be freed via `free_extraction_result`
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Selector request: `{"url": "...", "format": "jsonld", "selectors": {"name": "Product.name"}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub url: String,
    pub format: Format,
    pub selectors: SelectorMap,
}

/// Discovery request: `{"format": "microdata", "values": ["Tafellamp"]}`
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverRequest {
    #[serde(default)]
    pub url: String,
    pub format: Format,
    pub values: Vec<Value>,
}

/// Apply selectors to one structured data format of an HTML page.
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn semantic_select_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    request_json: *const c_char,
) -> ExtractionResultFFI {
    let html = match read_html(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(&msg),
    };
    let request: SelectRequest = match read_request(request_json) {
        Ok(r) => r,
        Err(msg) => return make_error_result(&msg),
    };

    to_result(perform_select(&html, request))
}

/// Every normalized structured data tree of an HTML page.
///
/// # Safety
/// Same as `semantic_select_ffi`
#[no_mangle]
pub unsafe extern "C" fn semantic_data_ffi(
    html_ptr: *const c_char,
    html_len: usize,
) -> ExtractionResultFFI {
    match read_html(html_ptr, html_len) {
        Ok(html) => to_result(Ok(SemanticData::from_html(&html, "").to_json())),
        Err(msg) => make_error_result(&msg),
    }
}

/// Discover selectors for known values in one structured data format.
///
/// # Safety
/// Same as `semantic_select_ffi`
#[no_mangle]
pub unsafe extern "C" fn discover_selector_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    request_json: *const c_char,
) -> ExtractionResultFFI {
    let html = match read_html(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(&msg),
    };
    let request: DiscoverRequest = match read_request(request_json) {
        Ok(r) => r,
        Err(msg) => return make_error_result(&msg),
    };

    to_result(perform_discover(&html, request))
}

/// Free an ExtractionResultFFI returned by any of the functions above
///
/// # Safety
/// - `result` must have been returned by this library
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

fn perform_select(html: &str, request: SelectRequest) -> Result<Value> {
    let data = SemanticData::with_formats(html, &request.url, &[request.format]);
    let mut selector = SemanticSelector::new(request.selectors)?;
    if let Some(tree) = data.get(request.format) {
        selector.select(tree, ApplyMode::Clean);
    }
    Ok(selector.result().to_json())
}

fn perform_discover(html: &str, request: DiscoverRequest) -> Result<Value> {
    let data = SemanticData::with_formats(html, &request.url, &[request.format]);
    let tree = data.get(request.format).cloned().unwrap_or(Value::Null);
    let found = discover_selector(&tree, &request.values)?;
    Ok(serde_json::to_value(found.selectors())?)
}

unsafe fn read_html(html_ptr: *const c_char, html_len: usize) -> std::result::Result<String, String> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok(String::new());
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice)
        .map(str::to_string)
        .map_err(|_| "Invalid UTF-8 in HTML content".to_string())
}

unsafe fn read_request<T: for<'de> Deserialize<'de>>(
    request_json: *const c_char,
) -> std::result::Result<T, String> {
    if request_json.is_null() {
        return Err("Request JSON is null".to_string());
    }
    let request_str = CStr::from_ptr(request_json)
        .to_str()
        .map_err(|_| "Invalid UTF-8 in request JSON".to_string())?;
    serde_json::from_str(request_str).map_err(|e| format!("Failed to parse request JSON: {}", e))
}

fn to_result<T: Serialize>(result: Result<T>) -> ExtractionResultFFI {
    let value = match result {
        Ok(v) => v,
        Err(e) => return make_error_result(&e.to_string()),
    };
    match serde_json::to_string(&value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "Product", "name": "Lamp",
         "offers": [{"price": 10}, {"price": 12}]}
        </script>
    "#;

    unsafe fn take_json(result: ExtractionResultFFI) -> std::result::Result<Value, String> {
        let outcome = if result.error_ptr.is_null() {
            let text = CStr::from_ptr(result.json_ptr).to_str().unwrap().to_string();
            Ok(serde_json::from_str(&text).unwrap())
        } else {
            Err(CStr::from_ptr(result.error_ptr).to_str().unwrap().to_string())
        };
        free_extraction_result(result);
        outcome
    }

    #[test]
    fn test_select_over_ffi() {
        let request = CString::new(
            r#"{"format": "jsonld", "selectors": {"name": "Product.name", "price": "Product.offers.price"}}"#,
        )
        .unwrap();
        let value = unsafe {
            take_json(semantic_select_ffi(
                PAGE.as_ptr() as *const c_char,
                PAGE.len(),
                request.as_ptr(),
            ))
        }
        .unwrap();
        assert_eq!(value, serde_json::json!({"name": "Lamp", "price": [10, 12]}));
    }

    #[test]
    fn test_discover_over_ffi() {
        let request = CString::new(r#"{"format": "jsonld", "values": [12]}"#).unwrap();
        let value = unsafe {
            take_json(discover_selector_ffi(
                PAGE.as_ptr() as *const c_char,
                PAGE.len(),
                request.as_ptr(),
            ))
        }
        .unwrap();
        assert_eq!(value, serde_json::json!(["Product.offers[1].price"]));
    }

    #[test]
    fn test_semantic_data_over_ffi() {
        let value = unsafe {
            take_json(semantic_data_ffi(PAGE.as_ptr() as *const c_char, PAGE.len()))
        }
        .unwrap();
        assert_eq!(value["jsonld"]["Product"]["name"], "Lamp");
        assert!(value["microdata"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_errors_are_reported() {
        let request =
            CString::new(r#"{"format": "jsonld", "selectors": {"bad": "Product[x]"}}"#).unwrap();
        let err = unsafe {
            take_json(semantic_select_ffi(
                PAGE.as_ptr() as *const c_char,
                PAGE.len(),
                request.as_ptr(),
            ))
        }
        .unwrap_err();
        assert!(err.contains("invalid selector"));

        let err = unsafe {
            take_json(semantic_select_ffi(PAGE.as_ptr() as *const c_char, PAGE.len(), ptr::null()))
        }
        .unwrap_err();
        assert_eq!(err, "Request JSON is null");
    }
}
