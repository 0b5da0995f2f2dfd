//! Outbound conversion: typed value → JSON tree.
//!
//! [`Encodable`] is the capability. [`encode_fields`] (and the
//! [`encodable!`](crate::encodable) macro built on it) is the default
//! encoder: given the named fields of a value, it classifies each through
//! [`Field`] and writes the result into the target object. Fields are staged
//! in a [`FieldWriter`] and only merged into the target once every field has
//! converted, so a failing field leaves the target exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::Path;

use serde_json::{Map, Number, Value};
use url::Url;

use crate::depth::DepthGuard;
use crate::error::EncodeError;
use crate::file;
use crate::shape::{Field, Shape};

/// A type that can write itself into a JSON value.
///
/// `encode` receives exclusive access to a value that starts out as an empty
/// object. Object-like types populate keys; scalar-like types replace the
/// node outright.
pub trait Encodable {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError>;

    /// Encode into a fresh empty object and return it.
    fn to_json(&self) -> Result<Value, EncodeError> {
        let mut json = Value::Object(Map::new());
        self.encode(&mut json)?;
        Ok(json)
    }

    fn encode_to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let json = self.to_json()?;
        Ok(serde_json::to_vec(&json)?)
    }

    /// Encode and write the bytes to `path` (tilde-expanded), creating or
    /// truncating the file.
    fn encode_as_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        let bytes = self.encode_to_bytes()?;
        file::write_bytes(path.as_ref(), &bytes)
    }
}

/// Encode one level down: a fresh empty object, guarded against runaway
/// nesting.
pub(crate) fn encode_nested(value: &dyn Encodable) -> Result<Value, EncodeError> {
    let _guard = DepthGuard::encode()?;
    let mut json = Value::Object(Map::new());
    value.encode(&mut json)?;
    Ok(json)
}

/// The default encoder. Writes each `(name, field)` pair in order and
/// aborts on the first field that fails, leaving `json` untouched.
pub fn encode_fields(json: &mut Value, fields: &[(&str, &dyn Field)]) -> Result<(), EncodeError> {
    let mut writer = FieldWriter::new(json);
    for (name, field) in fields {
        writer.field(name, *field)?;
    }
    writer.commit();
    Ok(())
}

// ── FieldWriter ─────────────────────────────────────────────────────

/// Staged setters for the keys of one JSON object.
///
/// Every setter replaces whatever the staged object holds at its key.
/// Nothing reaches the target until [`commit`](FieldWriter::commit); a writer
/// dropped early (for instance by `?`) discards its staged keys.
pub struct FieldWriter<'a> {
    target: &'a mut Value,
    staged: Map<String, Value>,
}

impl<'a> FieldWriter<'a> {
    pub fn new(target: &'a mut Value) -> Self {
        FieldWriter {
            target,
            staged: Map::new(),
        }
    }

    fn put(&mut self, key: &str, value: Value) -> &mut Self {
        self.staged.insert(key.to_owned(), value);
        self
    }

    pub fn null(&mut self, key: &str) -> &mut Self {
        self.put(key, Value::Null)
    }

    pub fn bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.put(key, Value::Bool(value))
    }

    pub fn int(&mut self, key: &str, value: impl Into<Number>) -> &mut Self {
        self.put(key, Value::Number(value.into()))
    }

    pub fn double(&mut self, key: &str, value: f64) -> Result<&mut Self, EncodeError> {
        let number = Number::from_f64(value).ok_or(EncodeError::NonFiniteDouble(value))?;
        Ok(self.put(key, Value::Number(number)))
    }

    pub fn string(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.put(key, Value::String(value.into()))
    }

    /// Pass an already-built JSON value through unchanged.
    pub fn json(&mut self, key: &str, value: Value) -> &mut Self {
        self.put(key, value)
    }

    pub fn url(&mut self, key: &str, value: &Url) -> &mut Self {
        self.put(key, Value::String(value.as_str().to_owned()))
    }

    pub fn strings<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        let items = values
            .iter()
            .map(|s| Value::String(s.as_ref().to_owned()))
            .collect();
        self.put(key, Value::Array(items))
    }

    pub fn encodable(
        &mut self,
        key: &str,
        value: &dyn Encodable,
    ) -> Result<&mut Self, EncodeError> {
        let json = encode_nested(value)?;
        Ok(self.put(key, json))
    }

    pub fn list<T: Encodable>(
        &mut self,
        key: &str,
        values: &[T],
    ) -> Result<&mut Self, EncodeError> {
        self.shape(key, values.shape()?)
    }

    pub fn map<T: Encodable>(
        &mut self,
        key: &str,
        values: &BTreeMap<String, T>,
    ) -> Result<&mut Self, EncodeError> {
        self.shape(key, values.shape()?)
    }

    pub fn shape(&mut self, key: &str, shape: Shape<'_>) -> Result<&mut Self, EncodeError> {
        let json = shape.to_json()?;
        Ok(self.put(key, json))
    }

    /// Classify `value` and write it.
    pub fn field<F: Field + ?Sized>(
        &mut self,
        key: &str,
        value: &F,
    ) -> Result<&mut Self, EncodeError> {
        self.shape(key, value.shape()?)
    }

    /// Merge the staged keys into the target. A target that is not an object
    /// is replaced by one.
    pub fn commit(self) {
        match self.target {
            Value::Object(map) => map.extend(self.staged),
            other => *other = Value::Object(self.staged),
        }
    }
}

// ── Encodable for library types ─────────────────────────────────────

macro_rules! scalar_encodable {
    ($($t:ty),*) => {
        $(
            impl Encodable for $t {
                fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
                    *json = self.shape()?.to_json()?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_encodable!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, str, String, Url
);

impl Encodable for Value {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        *json = self.clone();
        Ok(())
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode(json),
            None => {
                *json = Value::Null;
                Ok(())
            }
        }
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        *json = self.shape()?.to_json()?;
        Ok(())
    }
}

impl<T: Encodable> Encodable for BTreeMap<String, T> {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        *json = self.shape()?.to_json()?;
        Ok(())
    }
}

impl<T: Encodable, S: BuildHasher> Encodable for HashMap<String, T, S> {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        *json = self.shape()?.to_json()?;
        Ok(())
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn encode(&self, json: &mut Value) -> Result<(), EncodeError> {
        (**self).encode(json)
    }
}
