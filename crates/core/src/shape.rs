//! The closed set of field shapes the default encoder understands.
//!
//! Every field handed to the default encoder is first classified into a
//! [`Shape`] through the [`Field`] trait. Static types get their `Field` impl
//! at compile time, so a field of an unsupported type is a build error.
//! Only [`Dynamic`] fields are classified at runtime, and those are the only
//! source of [`EncodeError::UnencodableType`].

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::{Map, Number, Value};

use crate::encode::{encode_nested, Encodable};
use crate::error::EncodeError;

static NULL: Value = Value::Null;

/// A field value classified for encoding. Variants are listed in the
/// priority order used when classifying dynamic values.
pub enum Shape<'a> {
    Bool(bool),
    Int(Number),
    Double(f64),
    String(&'a str),
    Nested(&'a dyn Encodable),
    List(Vec<&'a dyn Encodable>),
    Map(Vec<(&'a str, &'a dyn Encodable)>),
}

impl Shape<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Bool(_) => "bool",
            Shape::Int(_) => "int",
            Shape::Double(_) => "double",
            Shape::String(_) => "string",
            Shape::Nested(_) => "nested",
            Shape::List(_) => "list",
            Shape::Map(_) => "map",
        }
    }

    /// Build the JSON node for this shape. List elements and map values are
    /// converted one by one; the first failure is returned unchanged.
    pub fn to_json(&self) -> Result<Value, EncodeError> {
        match self {
            Shape::Bool(b) => Ok(Value::Bool(*b)),
            Shape::Int(n) => Ok(Value::Number(n.clone())),
            Shape::Double(d) => Number::from_f64(*d)
                .map(Value::Number)
                .ok_or(EncodeError::NonFiniteDouble(*d)),
            Shape::String(s) => Ok(Value::String((*s).to_owned())),
            Shape::Nested(value) => encode_nested(*value),
            Shape::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(encode_nested(*item)?);
                }
                Ok(Value::Array(out))
            }
            Shape::Map(entries) => {
                let mut out = Map::new();
                for (key, value) in entries {
                    out.insert((*key).to_owned(), encode_nested(*value)?);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

/// Classifies a field value into a [`Shape`].
pub trait Field {
    fn shape(&self) -> Result<Shape<'_>, EncodeError>;
}

impl Field for bool {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::Bool(*self))
    }
}

macro_rules! int_fields {
    ($($t:ty),*) => {
        $(
            impl Field for $t {
                fn shape(&self) -> Result<Shape<'_>, EncodeError> {
                    Ok(Shape::Int(Number::from(*self)))
                }
            }
        )*
    };
}

int_fields!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Widened through the shortest decimal form, so `0.1f32` is written as
/// `0.1` rather than the exact binary expansion.
impl Field for f32 {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        let wide = self
            .to_string()
            .parse::<f64>()
            .unwrap_or_else(|_| f64::from(*self));
        Ok(Shape::Double(wide))
    }
}

impl Field for f64 {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::Double(*self))
    }
}

impl Field for str {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::String(self))
    }
}

impl Field for String {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::String(self))
    }
}

/// URLs are written as their serialized absolute form.
impl Field for url::Url {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::String(self.as_str()))
    }
}

/// An already-built JSON value passes through unchanged.
impl Field for Value {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::Nested(self))
    }
}

/// `None` is written as an explicit JSON null.
impl<T: Field> Field for Option<T> {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        match self {
            Some(value) => value.shape(),
            None => Ok(Shape::Nested(&NULL)),
        }
    }
}

impl<T: Encodable> Field for [T] {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::List(
            self.iter().map(|item| item as &dyn Encodable).collect(),
        ))
    }
}

impl<T: Encodable> Field for Vec<T> {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        self.as_slice().shape()
    }
}

impl<T: Encodable> Field for BTreeMap<String, T> {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::Map(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Encodable))
                .collect(),
        ))
    }
}

impl<T: Encodable, S: BuildHasher> Field for HashMap<String, T, S> {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        Ok(Shape::Map(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Encodable))
                .collect(),
        ))
    }
}

impl<T: Field + ?Sized> Field for &T {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        (**self).shape()
    }
}

impl<T: Field + ?Sized> Field for Box<T> {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        (**self).shape()
    }
}

// ── Dynamic fields ──────────────────────────────────────────────────

type Classify = for<'a> fn(&'a dyn Any) -> Option<Result<Shape<'a>, EncodeError>>;

/// A type-erased field value, classified when it is encoded.
///
/// [`Dynamic::new`] captures the concrete type's [`Field`] impl, so the value
/// encodes exactly like a static field of that type. [`Dynamic::opaque`]
/// accepts any `'static` value and recognizes only the library types listed
/// in [`classify_known`]; anything else fails with
/// [`EncodeError::UnencodableType`] naming the type.
pub struct Dynamic {
    value: Box<dyn Any>,
    type_name: &'static str,
    classify: Classify,
}

impl Dynamic {
    pub fn new<T: Field + Any>(value: T) -> Self {
        Dynamic {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
            classify: classify_as::<T>,
        }
    }

    pub fn opaque<T: Any>(value: T) -> Self {
        Dynamic {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
            classify: classify_known,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

fn classify_as<T: Field + Any>(any: &dyn Any) -> Option<Result<Shape<'_>, EncodeError>> {
    any.downcast_ref::<T>().map(<T as Field>::shape)
}

/// Priority order: bool, int, double, string, nested, list, map.
fn classify_known(any: &dyn Any) -> Option<Result<Shape<'_>, EncodeError>> {
    macro_rules! try_as {
        ($($t:ty),*) => {
            $(
                if let Some(value) = any.downcast_ref::<$t>() {
                    return Some(value.shape());
                }
            )*
        };
    }

    try_as!(bool);
    try_as!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
    try_as!(f32, f64);
    try_as!(String, &'static str, url::Url);
    try_as!(Value);
    try_as!(Vec<bool>, Vec<i64>, Vec<f64>, Vec<String>, Vec<Value>);
    try_as!(
        BTreeMap<String, String>,
        BTreeMap<String, Value>,
        HashMap<String, String>,
        HashMap<String, Value>
    );
    None
}

impl std::fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynamic")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Field for Dynamic {
    fn shape(&self) -> Result<Shape<'_>, EncodeError> {
        (self.classify)(self.value.as_ref())
            .unwrap_or_else(|| Err(EncodeError::UnencodableType(self.type_name.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(true.shape().unwrap().to_json().unwrap(), json!(true));
        assert_eq!(7u8.shape().unwrap().to_json().unwrap(), json!(7));
        assert_eq!((-7i64).shape().unwrap().to_json().unwrap(), json!(-7));
        assert_eq!(u64::MAX.shape().unwrap().to_json().unwrap(), json!(u64::MAX));
        assert_eq!(1.5f64.shape().unwrap().to_json().unwrap(), json!(1.5));
        assert_eq!(0.1f32.shape().unwrap().to_json().unwrap(), json!(0.1));
        assert_eq!("hi".shape().unwrap().to_json().unwrap(), json!("hi"));
    }

    #[test]
    fn test_non_finite_double() {
        match f64::NAN.shape().unwrap().to_json() {
            Err(EncodeError::NonFiniteDouble(d)) => assert!(d.is_nan()),
            other => panic!("expected NonFiniteDouble, got {:?}", other),
        }
    }

    #[test]
    fn test_list_and_map_shapes() {
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(tags.shape().unwrap().kind(), "list");
        assert_eq!(tags.shape().unwrap().to_json().unwrap(), json!(["a", "b"]));

        let mut scores = BTreeMap::new();
        scores.insert("x".to_string(), 1i64);
        scores.insert("y".to_string(), 2i64);
        assert_eq!(scores.shape().unwrap().kind(), "map");
        assert_eq!(
            scores.shape().unwrap().to_json().unwrap(),
            json!({"x": 1, "y": 2})
        );
    }

    #[test]
    fn test_list_stops_at_first_failure() {
        let values = vec![1.0, f64::INFINITY, f64::NAN];
        match values.shape().unwrap().to_json() {
            Err(EncodeError::NonFiniteDouble(d)) => assert_eq!(d, f64::INFINITY),
            other => panic!("expected NonFiniteDouble, got {:?}", other),
        }
    }

    #[test]
    fn test_option_and_value_pass_through() {
        let none: Option<i64> = None;
        assert_eq!(none.shape().unwrap().to_json().unwrap(), Value::Null);
        assert_eq!(Some(3i64).shape().unwrap().to_json().unwrap(), json!(3));

        let raw = json!({"k": [1, null]});
        assert_eq!(raw.shape().unwrap().to_json().unwrap(), raw);
    }

    #[test]
    fn test_url_shape() {
        let url = url::Url::parse("https://example.com/a?b=1").unwrap();
        assert_eq!(
            url.shape().unwrap().to_json().unwrap(),
            json!("https://example.com/a?b=1")
        );
    }

    #[test]
    fn test_dynamic_supported() {
        assert_eq!(
            Dynamic::new(42i32).shape().unwrap().to_json().unwrap(),
            json!(42)
        );
        assert_eq!(
            Dynamic::new(vec!["a".to_string()])
                .shape()
                .unwrap()
                .to_json()
                .unwrap(),
            json!(["a"])
        );
        assert_eq!(
            Dynamic::new(json!({"n": 1})).shape().unwrap().kind(),
            "nested"
        );
    }

    #[test]
    fn test_dynamic_captures_field_impl() {
        assert_eq!(
            Dynamic::new(vec![1i32, 2]).shape().unwrap().to_json().unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            Dynamic::new(Some(5i64)).shape().unwrap().to_json().unwrap(),
            json!(5)
        );
        assert_eq!(
            Dynamic::new(None::<i64>).shape().unwrap().to_json().unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_opaque_known_types() {
        assert_eq!(
            Dynamic::opaque(false).shape().unwrap().to_json().unwrap(),
            json!(false)
        );
        let mut labels = BTreeMap::new();
        labels.insert("env".to_string(), "prod".to_string());
        assert_eq!(Dynamic::opaque(labels).shape().unwrap().kind(), "map");
    }

    #[test]
    fn test_dynamic_unsupported() {
        struct Opaque;
        let field = Dynamic::opaque(Opaque);
        match field.shape() {
            Err(EncodeError::UnencodableType(name)) => assert!(name.ends_with("Opaque")),
            Ok(shape) => panic!("expected UnencodableType, got {}", shape.kind()),
            Err(other) => panic!("expected UnencodableType, got {:?}", other),
        }
    }
}
