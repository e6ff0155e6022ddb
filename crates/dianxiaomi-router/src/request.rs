//! The inbound request value.

use std::collections::BTreeMap;

use crate::args::ArgValue;

/// An inbound API request.
///
/// The host builds one of these per request and hands it to the server.
/// It is never mutated during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Raw request verb, as sent by the client.
    pub method: String,
    /// Request path, relative to the API root. Possibly still percent-encoded.
    pub path: String,
    /// Query string parameters.
    pub query: BTreeMap<String, ArgValue>,
    /// Form-encoded body parameters.
    pub body_params: BTreeMap<String, ArgValue>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Uploaded files, by field name.
    pub files: BTreeMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: BTreeMap::new(),
            body_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            files: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a request from a verb and a URI such as `/orders?status=completed`.
    pub fn from_uri(method: impl Into<String>, uri: &str) -> Self {
        match uri.split_once('?') {
            Some((path, query)) => {
                let mut request = Self::new(method, path);
                request.query = Self::parse_query_string(query);
                request
            }
            None => Self::new(method, uri),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// Creates a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new("PUT", path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and its content type.
    #[must_use]
    pub fn json_body(self, body: &serde_json::Value) -> Self {
        self.header("Content-Type", "application/json")
            .body(body.to_string())
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets a form body parameter.
    #[must_use]
    pub fn body_param(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.body_params.insert(key.into(), value.into());
        self
    }

    /// Adds an uploaded file.
    #[must_use]
    pub fn file(mut self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.files.insert(field.into(), name.into());
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter as text.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(ArgValue::as_text)
    }

    /// Returns the media type of the body, without parameters.
    pub fn content_type(&self) -> Option<String> {
        self.get_header("Content-Type").map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses a query or form string.
    ///
    /// `key[]=v` pairs collect into a list and `key[sub]=v` pairs into a map.
    /// Values are decoded once, the way a host framework hands them over.
    pub fn parse_query_string(query: &str) -> BTreeMap<String, ArgValue> {
        let mut params: BTreeMap<String, ArgValue> = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match split_bracket_key(&key) {
                Some((name, "")) => match params
                    .entry(name.to_string())
                    .or_insert_with(|| ArgValue::List(Vec::new()))
                {
                    ArgValue::List(items) => items.push(value),
                    other => *other = ArgValue::List(vec![value]),
                },
                Some((name, sub)) => match params
                    .entry(name.to_string())
                    .or_insert_with(|| ArgValue::Map(BTreeMap::new()))
                {
                    ArgValue::Map(map) => {
                        map.insert(sub.to_string(), value);
                    }
                    other => {
                        *other = ArgValue::Map([(sub.to_string(), value)].into_iter().collect());
                    }
                },
                None => {
                    params.insert(key.to_string(), ArgValue::Text(value));
                }
            }
        }

        params
    }
}

/// Splits `name[sub]` into `("name", "sub")`.
fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    if open == 0 || inner.contains('[') {
        return None;
    }
    Some((&key[..open], inner))
}
