//! Request body parsing and JSON/JSONP response encoding.

use serde_json::{json, Value};
use tracing::warn;

use crate::args::ArgValue;
use crate::error::ApiError;
use crate::request::Request;

/// Content type of plain JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type of JSONP responses.
pub const JSONP_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

/// Parses the request body into the `data` argument.
///
/// Form-encoded bodies become a map and everything else is read as JSON.
/// An empty or unparsable body yields `Json(null)`; the handler decides
/// whether that is an error.
pub fn parse_body(request: &Request) -> ArgValue {
    if request.body.is_empty() {
        return ArgValue::Json(Value::Null);
    }

    if request.content_type().as_deref() == Some("application/x-www-form-urlencoded") {
        let fields = url::form_urlencoded::parse(&request.body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        return ArgValue::Map(fields);
    }

    match serde_json::from_slice(&request.body) {
        Ok(value) => ArgValue::Json(value),
        Err(err) => {
            warn!(path = %request.path, error = %err, "unparsable request body");
            ArgValue::Json(Value::Null)
        }
    }
}

/// Returns true if `callback` is a usable JSONP function name.
pub fn is_valid_jsonp_callback(callback: &str) -> bool {
    !callback.is_empty()
        && callback
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Renders an error as the API's error document.
pub fn error_body(err: &ApiError) -> Value {
    json!({
        "errors": [
            { "code": err.code, "message": err.message }
        ]
    })
}

/// Encodes a body, wrapping it in `callback(...)` for JSONP.
///
/// Returns the content type and the encoded bytes.
pub fn encode(body: &Value, jsonp: Option<&str>) -> (&'static str, Vec<u8>) {
    let encoded = body.to_string();
    match jsonp {
        Some(callback) => (
            JSONP_CONTENT_TYPE,
            format!("{callback}({encoded})").into_bytes(),
        ),
        None => (JSON_CONTENT_TYPE, encoded.into_bytes()),
    }
}
