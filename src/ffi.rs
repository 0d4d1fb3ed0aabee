//! FFI interface for host applications
//!
//! Provides C-compatible functions that run the table pipeline.
//! All results are passed back as JSON for simplicity and type safety.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::Serialize;

use crate::charts::ChartPlan;
use crate::config::{AnalyzerConfig, ExtractOptions};
use crate::extractor::extract;
use crate::fetcher::Fetcher;
use crate::locator::locate;
use crate::pipeline::{fetch_tables, tables_from_html};
use crate::profiler::{profile, SchemaProfile};

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_analyzer_result
#[repr(C)]
pub struct AnalyzerResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if the call failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Profile and chart eligibility of one table
#[derive(Debug, Serialize)]
struct TableProfile<'a> {
    title: String,
    columns: &'a [String],
    profile: &'a SchemaProfile,
    charts: ChartPlan,
}

/// Extract all tables from an HTML document.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `options_json` - JSON-serialized AnalyzerConfig (null-terminated), or null for defaults
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `options_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_analyzer_result`
#[no_mangle]
pub unsafe extern "C" fn analyze_html_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    options_json: *const c_char,
) -> AnalyzerResultFFI {
    let html = match html_from_raw(html_ptr, html_len) {
        Ok(h) => h,
        Err(msg) => return make_error_result(msg),
    };
    let config = match config_from_raw(options_json) {
        Ok(c) => c,
        Err(msg) => return make_error_result(&msg),
    };

    let result = tables_from_html(html, &config.extract);
    make_json_result(&result.report())
}

/// Fetch a URL and extract its tables.
///
/// A failed fetch is not an FFI error: it is reported inside the JSON with
/// `success: false` and the cause in `error`.
///
/// # Safety
/// - `url` must be a valid null-terminated C string
/// - `config_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_analyzer_result`
#[no_mangle]
pub unsafe extern "C" fn analyze_url_ffi(
    url: *const c_char,
    config_json: *const c_char,
) -> AnalyzerResultFFI {
    let url = match c_str(url) {
        Ok(Some(u)) => u,
        Ok(None) => return make_error_result("URL is null"),
        Err(msg) => return make_error_result(msg),
    };
    let config = match config_from_raw(config_json) {
        Ok(c) => c,
        Err(msg) => return make_error_result(&msg),
    };

    let fetcher = Fetcher::new(&config.fetch);
    let result = fetch_tables(&fetcher, url, &config.extract);
    make_json_result(&result.report())
}

/// Profile one table of an HTML document.
///
/// `table_index` counts located `<table>` elements in document order.
///
/// # Safety
/// Same as analyze_html_ffi
#[no_mangle]
pub unsafe extern "C" fn profile_table_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    table_index: usize,
    options_json: *const c_char,
) -> AnalyzerResultFFI {
    let html = match html_from_raw(html_ptr, html_len) {
        Ok(h) => h,
        Err(msg) => return make_error_result(msg),
    };
    let config = match config_from_raw(options_json) {
        Ok(c) => c,
        Err(msg) => return make_error_result(&msg),
    };

    match profile_table(html, table_index, &config.extract) {
        Ok(json) => json,
        Err(msg) => make_error_result(&msg),
    }
}

/// Free an AnalyzerResultFFI returned by any of the functions above
///
/// # Safety
/// - `result` must have been returned by this library
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_analyzer_result(result: AnalyzerResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

fn profile_table(
    html: &str,
    table_index: usize,
    options: &ExtractOptions,
) -> Result<AnalyzerResultFFI, String> {
    let nodes = locate(html);
    let node = nodes.get(table_index).ok_or_else(|| {
        format!(
            "table index {} out of range ({} tables located)",
            table_index,
            nodes.len()
        )
    })?;
    let dataset = extract(node, options).map_err(|e| e.to_string())?;
    let profile = profile(&dataset);

    Ok(make_json_result(&TableProfile {
        title: dataset.title(),
        columns: dataset.columns(),
        charts: ChartPlan::from_profile(&profile),
        profile: &profile,
    }))
}

/// Borrow raw bytes as UTF-8. Empty or null input is an empty document.
unsafe fn html_from_raw<'a>(ptr: *const c_char, len: usize) -> Result<&'a str, &'static str> {
    if ptr.is_null() || len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(ptr as *const u8, len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in HTML content")
}

unsafe fn c_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, &'static str> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(Some)
        .map_err(|_| "Invalid UTF-8 in C string")
}

unsafe fn config_from_raw(ptr: *const c_char) -> Result<AnalyzerConfig, String> {
    match c_str(ptr)? {
        Some(json) => AnalyzerConfig::from_json(json).map_err(|e| e.to_string()),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn make_json_result<T: Serialize>(value: &T) -> AnalyzerResultFFI {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => AnalyzerResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> AnalyzerResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    AnalyzerResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Take ownership of the result and return (json, error).
    unsafe fn take(result: AnalyzerResultFFI) -> (Option<String>, Option<String>) {
        let read = |p: *mut c_char| {
            (!p.is_null()).then(|| CStr::from_ptr(p).to_string_lossy().into_owned())
        };
        let out = (read(result.json_ptr), read(result.error_ptr));
        free_analyzer_result(result);
        out
    }

    #[test]
    fn test_analyze_html_ffi() {
        let html = "<table><tr><th>Team</th><th>Goals</th></tr><tr><td>A</td><td>3</td></tr></table>";
        let (json, error) =
            unsafe { take(analyze_html_ffi(html.as_ptr() as *const c_char, html.len(), ptr::null())) };

        assert!(error.is_none());
        let value: serde_json::Value = serde_json::from_str(&json.unwrap()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["datasets"][0]["columns"][1], "Goals");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let bytes: &[u8] = b"<\xff\xfe";
        let (json, error) =
            unsafe { take(analyze_html_ffi(bytes.as_ptr() as *const c_char, bytes.len(), ptr::null())) };
        assert!(json.is_none());
        assert_eq!(error.as_deref(), Some("Invalid UTF-8 in HTML content"));
    }

    #[test]
    fn test_profile_table_ffi() {
        let html = "<table><tr><th>Team</th><th>Goals</th></tr><tr><td>A</td><td>3</td></tr></table>";
        let options = CString::new(r#"{"extract": {"header": "none"}}"#).unwrap();

        let (json, _) = unsafe {
            take(profile_table_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                0,
                ptr::null(),
            ))
        };
        let value: serde_json::Value = serde_json::from_str(&json.unwrap()).unwrap();
        assert_eq!(value["profile"]["columns"][1]["kind"], "numeric");
        assert_eq!(value["title"], "Table 1");

        let (json, _) = unsafe {
            take(profile_table_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                0,
                options.as_ptr(),
            ))
        };
        let value: serde_json::Value = serde_json::from_str(&json.unwrap()).unwrap();
        assert_eq!(value["columns"][0], "col_0");
        assert_eq!(value["profile"]["columns"][1]["kind"], "categorical");

        let (json, error) = unsafe {
            take(profile_table_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                5,
                ptr::null(),
            ))
        };
        assert!(json.is_none());
        assert_eq!(
            error.as_deref(),
            Some("table index 5 out of range (1 tables located)")
        );
    }
}
