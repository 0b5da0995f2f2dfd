//! Inbound conversion: JSON tree → typed value.
//!
//! [`Decodable`] is the capability; [`FieldReader`] holds the typed field
//! accessors that `Decodable` impls are written with. Every typed accessor
//! treats an absent key and a present-but-mistyped value the same way and
//! reports [`DecodeError::MissingKey`]. The exceptions are documented on
//! [`FieldReader::regex_array`] and [`FieldReader::string_map`].

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::Path;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::depth::DepthGuard;
use crate::error::DecodeError;
use crate::file;

static NULL: Value = Value::Null;

/// A type that can be reconstructed from a JSON value.
pub trait Decodable: Sized {
    fn decode(json: &Value) -> Result<Self, DecodeError>;

    /// Parse `bytes` and decode. Any JSON text is accepted at the top level,
    /// including bare scalars and arrays.
    fn decode_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let json: Value = serde_json::from_slice(bytes)?;
        Self::decode(&json)
    }

    /// Read the file at `path` (tilde-expanded) and decode its contents.
    fn decode_file<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let bytes = file::read_bytes(path.as_ref())?;
        Self::decode_bytes(&bytes)
    }
}

fn missing(key: &str) -> DecodeError {
    DecodeError::MissingKey(key.to_string())
}

fn decode_guarded<T: Decodable>(json: &Value) -> Result<T, DecodeError> {
    let _guard = DepthGuard::decode()?;
    T::decode(json)
}

// ── FieldReader ─────────────────────────────────────────────────────

/// Typed accessors for the fields of one JSON object.
///
/// A key that is absent (or a receiver that is not an object at all) reads
/// as `null`.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    json: &'a Value,
}

impl<'a> FieldReader<'a> {
    pub fn new(json: &'a Value) -> Self {
        FieldReader { json }
    }

    /// The raw node at `key`, or `null`.
    pub fn get(&self, key: &str) -> &'a Value {
        self.json.get(key).unwrap_or(&NULL)
    }

    pub fn has(&self, key: &str) -> bool {
        self.json.get(key).is_some()
    }

    /// The value at `key`, or `null` when absent. Never fails.
    pub fn value(&self, key: &str) -> Value {
        self.get(key).clone()
    }

    fn str(&self, key: &str) -> Result<&'a str, DecodeError> {
        self.get(key).as_str().ok_or_else(|| missing(key))
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>, DecodeError> {
        self.get(key).as_array().ok_or_else(|| missing(key))
    }

    fn object(&self, key: &str) -> Result<&'a serde_json::Map<String, Value>, DecodeError> {
        self.get(key).as_object().ok_or_else(|| missing(key))
    }

    pub fn string(&self, key: &str) -> Result<String, DecodeError> {
        self.str(key).map(str::to_owned)
    }

    /// An integer that fits in `i64`. Floats are rejected, even integral ones.
    pub fn int(&self, key: &str) -> Result<i64, DecodeError> {
        self.get(key).as_i64().ok_or_else(|| missing(key))
    }

    pub fn uint(&self, key: &str) -> Result<u64, DecodeError> {
        self.get(key).as_u64().ok_or_else(|| missing(key))
    }

    /// Any JSON number, widened to `f64`.
    pub fn double(&self, key: &str) -> Result<f64, DecodeError> {
        self.get(key).as_f64().ok_or_else(|| missing(key))
    }

    pub fn bool(&self, key: &str) -> Result<bool, DecodeError> {
        self.get(key).as_bool().ok_or_else(|| missing(key))
    }

    /// A string that parses as an absolute URL.
    pub fn url(&self, key: &str) -> Result<Url, DecodeError> {
        let raw = self.str(key)?;
        Url::parse(raw).map_err(|_| DecodeError::InvalidUrl(raw.to_string()))
    }

    /// A string compiled as a regular expression. Compile errors come back as
    /// [`DecodeError::Regex`].
    pub fn regex(&self, key: &str) -> Result<Regex, DecodeError> {
        Ok(Regex::new(self.str(key)?)?)
    }

    /// Decode the node at `key` (possibly `null`) with `T`'s own decoder.
    pub fn decodable<T: Decodable>(&self, key: &str) -> Result<T, DecodeError> {
        decode_guarded(self.get(key))
    }

    /// `None` when `key` is absent or `null`, otherwise `T` decoded.
    pub fn optional<T: Decodable>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.get(key) {
            Value::Null => Ok(None),
            json => decode_guarded(json).map(Some),
        }
    }

    /// Decode every element in order. Stops at the first element that fails.
    pub fn decodable_array<T: Decodable>(&self, key: &str) -> Result<Vec<T>, DecodeError> {
        let items = self.array(key)?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(decode_guarded(item)?);
        }
        Ok(out)
    }

    /// An array of strings only. Not an array, or any non-string element,
    /// is `MissingKey`.
    pub fn string_array(&self, key: &str) -> Result<Vec<String>, DecodeError> {
        self.array(key)?
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| missing(key))
    }

    /// An array of patterns. A non-string element is reported as
    /// [`DecodeError::UnexpectedArrayElement`] carrying that element.
    pub fn regex_array(&self, key: &str) -> Result<Vec<Regex>, DecodeError> {
        let items = self.array(key)?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let pattern = item
                .as_str()
                .ok_or_else(|| DecodeError::UnexpectedArrayElement(item.clone()))?;
            out.push(Regex::new(pattern)?);
        }
        Ok(out)
    }

    /// An object whose values are all strings. A non-string value is
    /// [`DecodeError::BadDictionary`].
    pub fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, DecodeError> {
        let entries = self.object(key)?;
        let mut out = BTreeMap::new();
        for (name, value) in entries {
            let value = value
                .as_str()
                .ok_or_else(|| DecodeError::BadDictionary(key.to_string()))?;
            out.insert(name.clone(), value.to_owned());
        }
        Ok(out)
    }

    /// Decode every value of the object at `key`.
    pub fn decodable_map<T: Decodable>(
        &self,
        key: &str,
    ) -> Result<BTreeMap<String, T>, DecodeError> {
        let entries = self.object(key)?;
        let mut out = BTreeMap::new();
        for (name, value) in entries {
            out.insert(name.clone(), decode_guarded(value)?);
        }
        Ok(out)
    }
}

// ── Decodable for library types ─────────────────────────────────────

fn kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, json: &Value) -> DecodeError {
    DecodeError::custom(format!("expected {}, found {}", what, kind(json)))
}

/// The raw tree; never fails.
impl Decodable for Value {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        Ok(json.clone())
    }
}

impl Decodable for String {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_str()
            .map(str::to_owned)
            .ok_or_else(|| expected("string", json))
    }
}

impl Decodable for i64 {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_i64().ok_or_else(|| expected("integer", json))
    }
}

impl Decodable for u64 {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_u64().ok_or_else(|| expected("unsigned integer", json))
    }
}

macro_rules! narrow_int_decodable {
    ($($t:ty),*) => {
        $(
            /// Checked narrowing; an integer outside the range is `Custom`.
            impl Decodable for $t {
                fn decode(json: &Value) -> Result<Self, DecodeError> {
                    let wide = json
                        .as_i64()
                        .map(i128::from)
                        .or_else(|| json.as_u64().map(i128::from))
                        .ok_or_else(|| expected("integer", json))?;
                    <$t>::try_from(wide).map_err(|_| {
                        DecodeError::custom(format!(
                            "{} out of range for {}",
                            wide,
                            stringify!($t)
                        ))
                    })
                }
            }
        )*
    };
}

narrow_int_decodable!(i8, i16, i32, isize, u8, u16, u32, usize);

impl Decodable for f32 {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let wide = json.as_f64().ok_or_else(|| expected("number", json))?;
        if wide.abs() > f64::from(f32::MAX) {
            return Err(DecodeError::custom(format!("{} out of range for f32", wide)));
        }
        Ok(wide as f32)
    }
}

impl Decodable for f64 {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_f64().ok_or_else(|| expected("number", json))
    }
}

impl Decodable for bool {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_bool().ok_or_else(|| expected("bool", json))
    }
}

impl Decodable for Url {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let raw = json.as_str().ok_or_else(|| expected("url string", json))?;
        Url::parse(raw).map_err(|_| DecodeError::InvalidUrl(raw.to_string()))
    }
}

impl Decodable for Regex {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let pattern = json.as_str().ok_or_else(|| expected("pattern string", json))?;
        Ok(Regex::new(pattern)?)
    }
}

impl<T: Decodable> Decodable for Option<T> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        match json {
            Value::Null => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let items = json.as_array().ok_or_else(|| expected("array", json))?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(decode_guarded(item)?);
        }
        Ok(out)
    }
}

impl<T: Decodable> Decodable for BTreeMap<String, T> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let entries = json.as_object().ok_or_else(|| expected("object", json))?;
        let mut out = BTreeMap::new();
        for (name, value) in entries {
            out.insert(name.clone(), decode_guarded(value)?);
        }
        Ok(out)
    }
}

impl<T: Decodable, S: BuildHasher + Default> Decodable for HashMap<String, T, S> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let entries = json.as_object().ok_or_else(|| expected("object", json))?;
        let mut out = HashMap::with_capacity_and_hasher(entries.len(), S::default());
        for (name, value) in entries {
            out.insert(name.clone(), decode_guarded(value)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Person {
        name: String,
        age: i64,
    }

    impl Decodable for Person {
        fn decode(json: &Value) -> Result<Self, DecodeError> {
            let fields = FieldReader::new(json);
            Ok(Person {
                name: fields.string("name")?,
                age: fields.int("age")?,
            })
        }
    }

    #[derive(Debug)]
    struct Contact {
        person: Person,
        email: String,
    }

    impl Decodable for Contact {
        fn decode(json: &Value) -> Result<Self, DecodeError> {
            let fields = FieldReader::new(json);
            Ok(Contact {
                person: Person::decode(json)?,
                email: fields.string("email")?,
            })
        }
    }

    fn assert_missing<T: std::fmt::Debug>(result: Result<T, DecodeError>, key: &str) {
        match result {
            Err(DecodeError::MissingKey(k)) => assert_eq!(k, key),
            other => panic!("expected MissingKey({}), got {:?}", key, other),
        }
    }

    #[test]
    fn test_decode_person() {
        let json = json!({"name": "Ada", "age": 36});
        let person = Person::decode(&json).unwrap();
        assert_eq!(
            person,
            Person {
                name: "Ada".into(),
                age: 36
            }
        );
    }

    #[test]
    fn test_decode_missing_email() {
        let json = json!({"name": "Ada", "age": 36});
        assert_missing(Contact::decode(&json), "email");
    }

    #[test]
    fn test_missing_key_every_typed_accessor() {
        let json = json!({});
        let fields = FieldReader::new(&json);
        assert_missing(fields.string("k"), "k");
        assert_missing(fields.int("k"), "k");
        assert_missing(fields.uint("k"), "k");
        assert_missing(fields.double("k"), "k");
        assert_missing(fields.bool("k"), "k");
        assert_missing(fields.url("k"), "k");
        assert_missing(fields.regex("k"), "k");
        assert_missing(fields.decodable_array::<Person>("k"), "k");
        assert_missing(fields.string_array("k"), "k");
        assert_missing(fields.regex_array("k"), "k");
        assert_missing(fields.string_map("k"), "k");
        assert_missing(fields.decodable_map::<Person>("k"), "k");
    }

    #[test]
    fn test_raw_value_never_fails() {
        let json = json!({"present": [1, 2]});
        let fields = FieldReader::new(&json);
        assert_eq!(fields.value("present"), json!([1, 2]));
        assert_eq!(fields.value("absent"), Value::Null);
        assert!(!fields.has("absent"));

        let not_object = json!(3);
        assert_eq!(FieldReader::new(&not_object).value("k"), Value::Null);
    }

    #[test]
    fn test_wrong_type_is_missing_key() {
        let json = json!({
            "s": 1,
            "i": "1",
            "f": 1.5,
            "b": "true",
            "u": 5,
            "a": {"not": "array"},
            "mixed": ["a", 1],
            "m": ["not", "object"]
        });
        let fields = FieldReader::new(&json);
        assert_missing(fields.string("s"), "s");
        assert_missing(fields.int("i"), "i");
        assert_missing(fields.int("f"), "f");
        assert_missing(fields.bool("b"), "b");
        assert_missing(fields.url("u"), "u");
        assert_missing(fields.regex("u"), "u");
        assert_missing(fields.string_array("a"), "a");
        assert_missing(fields.string_array("mixed"), "mixed");
        assert_missing(fields.decodable_array::<Person>("a"), "a");
        assert_missing(fields.regex_array("a"), "a");
        assert_missing(fields.string_map("m"), "m");
        assert_missing(fields.decodable_map::<Person>("m"), "m");
    }

    #[test]
    fn test_numbers() {
        let json = json!({"neg": -4, "big": u64::MAX, "frac": 0.5});
        let fields = FieldReader::new(&json);
        assert_eq!(fields.int("neg").unwrap(), -4);
        assert_missing(fields.int("big"), "big");
        assert_eq!(fields.uint("big").unwrap(), u64::MAX);
        assert_missing(fields.uint("neg"), "neg");
        assert_eq!(fields.double("frac").unwrap(), 0.5);
        assert_eq!(fields.double("neg").unwrap(), -4.0);
    }

    #[test]
    fn test_url() {
        let bad = json!({"url": "not a url"});
        match FieldReader::new(&bad).url("url") {
            Err(DecodeError::InvalidUrl(s)) => assert_eq!(s, "not a url"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }

        let good = json!({"url": "https://example.com"});
        let url = FieldReader::new(&good).url("url").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_regex() {
        let json = json!({"ok": "^a+b$", "broken": "(unclosed"});
        let fields = FieldReader::new(&json);
        assert!(fields.regex("ok").unwrap().is_match("aaab"));
        assert!(matches!(fields.regex("broken"), Err(DecodeError::Regex(_))));
    }

    #[test]
    fn test_regex_array() {
        let json = json!({
            "ok": ["^a$", "b+"],
            "mixed": ["^a$", 7, "b"],
            "broken": ["(x"]
        });
        let fields = FieldReader::new(&json);
        let patterns = fields.regex_array("ok").unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[1].is_match("bbb"));

        match fields.regex_array("mixed") {
            Err(DecodeError::UnexpectedArrayElement(v)) => assert_eq!(v, json!(7)),
            other => panic!("expected UnexpectedArrayElement, got {:?}", other),
        }
        assert!(matches!(
            fields.regex_array("broken"),
            Err(DecodeError::Regex(_))
        ));
    }

    #[test]
    fn test_string_collections() {
        let json = json!({
            "tags": ["a", "b"],
            "labels": {"env": "prod", "tier": "web"},
            "bad_labels": {"env": "prod", "replicas": 3}
        });
        let fields = FieldReader::new(&json);
        assert_eq!(fields.string_array("tags").unwrap(), vec!["a", "b"]);

        let labels = fields.string_map("labels").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["env"], "prod");

        match fields.string_map("bad_labels") {
            Err(DecodeError::BadDictionary(key)) => assert_eq!(key, "bad_labels"),
            other => panic!("expected BadDictionary, got {:?}", other),
        }
    }

    #[test]
    fn test_decodable_array_preserves_order() {
        let json = json!({"people": [
            {"name": "Ada", "age": 36},
            {"name": "Alan", "age": 41}
        ]});
        let people: Vec<Person> = FieldReader::new(&json).decodable_array("people").unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "Ada");
        assert_eq!(people[1].name, "Alan");
    }

    #[test]
    fn test_decodable_array_stops_at_first_failure() {
        use std::cell::Cell;

        thread_local! {
            static SEEN: Cell<usize> = const { Cell::new(0) };
        }

        #[derive(Debug)]
        struct Counted;

        impl Decodable for Counted {
            fn decode(json: &Value) -> Result<Self, DecodeError> {
                SEEN.with(|seen| seen.set(seen.get() + 1));
                FieldReader::new(json).int("n")?;
                Ok(Counted)
            }
        }

        let json = json!({"items": [{"n": 1}, {"x": 2}, {"n": 3}]});
        let result = FieldReader::new(&json).decodable_array::<Counted>("items");
        assert_missing(result, "n");
        assert_eq!(SEEN.with(Cell::get), 2);
    }

    #[test]
    fn test_decodable_map() {
        let json = json!({"by_id": {
            "a": {"name": "Ada", "age": 36},
            "b": {"name": "Alan", "age": 41}
        }});
        let people: BTreeMap<String, Person> =
            FieldReader::new(&json).decodable_map("by_id").unwrap();
        assert_eq!(people["b"].age, 41);

        let broken = json!({"by_id": {"a": {"name": "Ada"}}});
        assert_missing(
            FieldReader::new(&broken).decodable_map::<Person>("by_id"),
            "age",
        );
    }

    #[test]
    fn test_decodable_nested_missing_reports_inner_key() {
        let json = json!({"other": 1});
        assert_missing(FieldReader::new(&json).decodable::<Person>("owner"), "name");
    }

    #[test]
    fn test_optional() {
        let json = json!({"owner": {"name": "Ada", "age": 36}, "none": null});
        let fields = FieldReader::new(&json);
        assert!(fields.optional::<Person>("owner").unwrap().is_some());
        assert!(fields.optional::<Person>("none").unwrap().is_none());
        assert!(fields.optional::<Person>("absent").unwrap().is_none());
    }

    #[test]
    fn test_decode_bytes_accepts_fragments() {
        assert_eq!(i64::decode_bytes(b"42").unwrap(), 42);
        assert_eq!(String::decode_bytes(b"\"hi\"").unwrap(), "hi");
        assert_eq!(
            Vec::<bool>::decode_bytes(b"[true, false]").unwrap(),
            vec![true, false]
        );
        assert!(matches!(
            Person::decode_bytes(b"{not json"),
            Err(DecodeError::Parse(_))
        ));
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.json");
        std::fs::write(&path, br#"{"name": "Ada", "age": 36}"#).unwrap();
        assert_eq!(Person::decode_file(&path).unwrap().age, 36);

        match Person::decode_file(dir.path().join("absent.json")) {
            Err(DecodeError::FileNotFound { .. }) => {}
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_mismatch_is_custom() {
        match i64::decode(&json!("x")) {
            Err(DecodeError::Custom(msg)) => assert_eq!(msg, "expected integer, found string"),
            other => panic!("expected Custom, got {:?}", other),
        }
    }

    #[test]
    fn test_narrow_numbers() {
        assert_eq!(i32::decode(&json!(-7)).unwrap(), -7);
        assert_eq!(u8::decode(&json!(255)).unwrap(), 255);
        assert_eq!(usize::decode(&json!(3)).unwrap(), 3);
        assert_eq!(f32::decode(&json!(0.1)).unwrap(), 0.1f32);

        match u8::decode(&json!(256)) {
            Err(DecodeError::Custom(msg)) => assert_eq!(msg, "256 out of range for u8"),
            other => panic!("expected Custom, got {:?}", other),
        }
        assert!(matches!(u32::decode(&json!(-1)), Err(DecodeError::Custom(_))));
        assert!(matches!(i8::decode(&json!(1.5)), Err(DecodeError::Custom(_))));
        assert!(matches!(f32::decode(&json!(1e300)), Err(DecodeError::Custom(_))));
    }

    #[test]
    fn test_narrow_field_through_decodable() {
        let json = json!({"port": 8080, "ratio": 0.25, "big": 70000});
        let fields = FieldReader::new(&json);
        assert_eq!(fields.decodable::<u16>("port").unwrap(), 8080);
        assert_eq!(fields.decodable::<f32>("ratio").unwrap(), 0.25);
        assert!(matches!(
            fields.decodable::<u16>("big"),
            Err(DecodeError::Custom(_))
        ));
    }

    #[test]
    fn test_hash_map() {
        let json = json!({"a": 1, "b": 2});
        let counts = HashMap::<String, i64>::decode(&json).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["b"], 2);

        let broken = json!({"a": 1, "b": "two"});
        assert!(matches!(
            HashMap::<String, i64>::decode(&broken),
            Err(DecodeError::Custom(_))
        ));
    }

    struct Nest;

    impl Decodable for Nest {
        fn decode(json: &Value) -> Result<Self, DecodeError> {
            FieldReader::new(json).optional::<Nest>("child")?;
            Ok(Nest)
        }
    }

    fn nested(depth: usize) -> Value {
        let mut json = json!({});
        for _ in 0..depth {
            json = json!({ "child": json });
        }
        json
    }

    #[test]
    fn test_depth_limit() {
        CodecConfig::default().with_max_depth(5).scope(|| {
            assert!(Nest::decode(&nested(5)).is_ok());
            match Nest::decode(&nested(6)) {
                Err(DecodeError::DepthLimitExceeded { limit }) => assert_eq!(limit, 5),
                other => panic!("expected DepthLimitExceeded, got {:?}", other.err()),
            }
        });
        assert_eq!(crate::depth::current(), 0);
    }
}
