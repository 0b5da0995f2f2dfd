//! Build-time generation of the default encoder.

/// Implement [`Encodable`](crate::Encodable) and [`Field`](crate::Field)
/// for a struct from its list of fields.
///
/// The generated `encode` hands the fields, in the order listed, to
/// [`encode_fields`](crate::encode_fields). The JSON key defaults to the
/// field name and can be overridden with `as "key"`. Fields left out of the
/// list are not encoded. The `Field` impl makes the struct usable as a
/// nested value, list element or map value inside other encodable types.
///
/// ```
/// use jsonbind_core::{encodable, Encodable};
///
/// struct Tagged {
///     id: i64,
///     tags: Vec<String>,
///     cache: std::cell::Cell<u32>,
/// }
///
/// encodable!(Tagged { id, tags as "labels" });
///
/// let value = Tagged { id: 7, tags: vec!["a".into()], cache: Default::default() };
/// assert_eq!(
///     value.to_json().unwrap(),
///     serde_json::json!({"id": 7, "labels": ["a"]})
/// );
/// ```
#[macro_export]
macro_rules! encodable {
    ($ty:ty { $($field:ident $(as $key:literal)?),* $(,)? }) => {
        impl $crate::Encodable for $ty {
            fn encode(
                &self,
                json: &mut $crate::serde_json::Value,
            ) -> ::std::result::Result<(), $crate::EncodeError> {
                $crate::encode_fields(
                    json,
                    &[$(
                        (
                            $crate::__encodable_key!($field $(, $key)?),
                            &self.$field as &dyn $crate::Field,
                        )
                    ),*],
                )
            }
        }

        $crate::nested_field!($ty);
    };
}

/// Implement [`Field`](crate::Field) as a nested value for types with a
/// hand-written [`Encodable`](crate::Encodable) impl.
#[macro_export]
macro_rules! nested_field {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Field for $ty {
                fn shape(
                    &self,
                ) -> ::std::result::Result<$crate::Shape<'_>, $crate::EncodeError> {
                    ::std::result::Result::Ok($crate::Shape::Nested(self))
                }
            }
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __encodable_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $key:literal) => {
        $key
    };
}
