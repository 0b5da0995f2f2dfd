//! jsonbind-core: typed encode/decode protocol over `serde_json::Value`.
//!
//! Application types opt in through two capabilities:
//!
//! - [`Encodable`] writes a value into a JSON tree. The default encoder
//!   ([`encode_fields`], usually reached through the [`encodable!`] macro)
//!   classifies each field into a [`Shape`] at compile time and is
//!   all-or-nothing: a failing field leaves the target untouched.
//! - [`Decodable`] rebuilds a value from a JSON tree, using the typed
//!   accessors on [`FieldReader`] which report which field failed and why.
//!
//! Both directions propagate the first error unchanged and share a nesting
//! limit configured through [`CodecConfig`].

#[macro_use]
mod macros;

pub mod config;
pub mod decode;
pub mod depth;
pub mod encode;
pub mod error;
pub mod file;
pub mod shape;

pub use config::CodecConfig;
pub use decode::{Decodable, FieldReader};
pub use encode::{encode_fields, Encodable, FieldWriter};
pub use error::{DecodeError, EncodeError};
pub use shape::{Dynamic, Field, Shape};

pub use regex;
pub use serde_json;
pub use url;
