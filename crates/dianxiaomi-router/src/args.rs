//! The argument bag and name-driven parameter binding.
//!
//! A handler declares an ordered list of [`Param`]s. At dispatch time each
//! parameter is looked up by name in the merged [`ArgumentBag`], falling back
//! to its declared default. Binding is pure: the same schema and bag always
//! produce the same [`BoundArgs`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::DispatchError;

/// A value in the argument bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// No value. Used for `null` defaults and unparsable bodies.
    Null,
    /// A single string, e.g. a path capture or `?page=2`.
    Text(String),
    /// A repeated parameter, e.g. `?status[]=a&status[]=b`.
    List(Vec<String>),
    /// A keyed parameter, e.g. `?filter[limit]=5`, or the header map.
    Map(BTreeMap<String, String>),
    /// A parsed structured request body.
    Json(Value),
    /// The raw request body.
    Raw(Vec<u8>),
}

impl ArgValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for [`ArgValue::Null`] and `Json(null)`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(Value::Null))
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value into JSON. Raw bytes become a lossy UTF-8 string.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::from(items.clone()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            Self::Json(value) => value.clone(),
            Self::Raw(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Percent-decodes strings, list items and map values.
    ///
    /// Structured and raw bodies are returned unchanged.
    fn decoded(&self) -> Self {
        match self {
            Self::Text(s) => Self::Text(url_decode(s)),
            Self::List(items) => Self::List(items.iter().map(|s| url_decode(s)).collect()),
            Self::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), url_decode(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Decodes `+` as a space and `%XX` escapes. Malformed escapes are kept as-is.
pub fn url_decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// The merged map of arguments available to a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentBag {
    args: BTreeMap<String, ArgValue>,
}

impl ArgumentBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) {
        self.args.insert(key.into(), value);
    }

    /// Merges `params` into the bag. Later values win.
    pub fn merge<'a, I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (&'a String, &'a ArgValue)>,
    {
        for (key, value) in params {
            self.args.insert(key.clone(), value.clone());
        }
    }

    /// Gets a value by key.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.args.get(key)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns an iterator over the entries, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name looked up in the argument bag.
    pub name: String,
    /// Value used when the bag has no entry for `name`.
    pub default: Option<ArgValue>,
}

impl Param {
    /// A parameter that must be present in the bag.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter with a default value.
    pub fn optional(name: impl Into<String>, default: ArgValue) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
        }
    }

    /// A parameter that defaults to null.
    pub fn nullable(name: impl Into<String>) -> Self {
        Self::optional(name, ArgValue::Null)
    }
}

/// Handler arguments, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArgs {
    args: Vec<(String, ArgValue)>,
}

impl BoundArgs {
    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns the value at `index` in declaration order.
    pub fn positional(&self, index: usize) -> Option<&ArgValue> {
        self.args.get(index).map(|(_, v)| v)
    }

    /// Returns the bound text for `name`, if it is a text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_text)
    }

    /// Returns the bound map for `name`, if it is a map value.
    pub fn map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        match self.get(name) {
            Some(ArgValue::Map(map)) => Some(map),
            _ => None,
        }
    }

    /// Returns the bound structured value for `name`.
    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.get(name) {
            Some(ArgValue::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Parses the bound text for `name` as an unsigned integer.
    pub fn u64(&self, name: &str) -> Option<u64> {
        self.text(name).and_then(|s| s.trim().parse().ok())
    }

    /// Returns the parameter names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|(n, _)| n.as_str())
    }

    /// Returns the number of bound arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if no arguments are bound.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Binds a handler's declared parameters against the argument bag.
///
/// For each parameter, in order: use the bag entry of the same name
/// (percent-decoded), else the declared default, else fail with
/// [`DispatchError::MissingParameter`].
pub fn bind(params: &[Param], bag: &ArgumentBag) -> Result<BoundArgs, DispatchError> {
    let mut args = Vec::with_capacity(params.len());

    for param in params {
        let value = match (bag.get(&param.name), &param.default) {
            (Some(value), _) => value.decoded(),
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(DispatchError::MissingParameter {
                    name: param.name.clone(),
                })
            }
        };
        args.push((param.name.clone(), value));
    }

    Ok(BoundArgs { args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, ArgValue)]) -> ArgumentBag {
        let mut bag = ArgumentBag::new();
        for (k, v) in entries {
            bag.insert(*k, v.clone());
        }
        bag
    }

    #[test]
    fn test_bind_by_name_not_position() {
        let bag = bag(&[("b", "2".into()), ("a", "1".into())]);
        let bound = bind(&[Param::required("a"), Param::required("b")], &bag).unwrap();
        assert_eq!(bound.positional(0), Some(&ArgValue::text("1")));
        assert_eq!(bound.positional(1), Some(&ArgValue::text("2")));
        assert_eq!(bound.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_bind_default_null() {
        let bound = bind(&[Param::nullable("fields")], &ArgumentBag::new()).unwrap();
        assert_eq!(bound.get("fields"), Some(&ArgValue::Null));
    }

    #[test]
    fn test_bind_missing_required() {
        let err = bind(
            &[Param::nullable("fields"), Param::required("id")],
            &ArgumentBag::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingParameter {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn test_bind_decodes_strings() {
        let mut filter = BTreeMap::new();
        filter.insert("q".to_string(), "a%26b".to_string());
        let bag = bag(&[
            ("name", "John+Doe".into()),
            ("tags", ArgValue::List(vec!["x%20y".to_string()])),
            ("filter", ArgValue::Map(filter)),
            ("data", ArgValue::Json(serde_json::json!({"note": "a%20b"}))),
        ]);
        let bound = bind(
            &[
                Param::required("name"),
                Param::required("tags"),
                Param::required("filter"),
                Param::required("data"),
            ],
            &bag,
        )
        .unwrap();

        assert_eq!(bound.text("name"), Some("John Doe"));
        assert_eq!(
            bound.get("tags"),
            Some(&ArgValue::List(vec!["x y".to_string()]))
        );
        assert_eq!(bound.map("filter").unwrap()["q"], "a&b");
        assert_eq!(
            bound.json("data"),
            Some(&serde_json::json!({"note": "a%20b"}))
        );
    }

    #[test]
    fn test_defaults_are_not_decoded() {
        let bound = bind(
            &[Param::optional("page", ArgValue::text("%31"))],
            &ArgumentBag::new(),
        )
        .unwrap();
        assert_eq!(bound.text("page"), Some("%31"));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("New%20York"), "New York");
        assert_eq!(url_decode("a+b"), "a b");
        assert_eq!(url_decode("caf%C3%A9"), "café");
        assert_eq!(url_decode("100%"), "100%");
    }

    #[test]
    fn test_u64_accessor() {
        let bound = bind(&[Param::required("id")], &bag(&[("id", "42".into())])).unwrap();
        assert_eq!(bound.u64("id"), Some(42));
        assert_eq!(bound.u64("missing"), None);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut bag = bag(&[("status", "a".into())]);
        let mut later = BTreeMap::new();
        later.insert("status".to_string(), ArgValue::text("b"));
        bag.merge(&later);
        assert_eq!(bag.get("status"), Some(&ArgValue::text("b")));
        assert_eq!(bag.len(), 1);
    }
}
