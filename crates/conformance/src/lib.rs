//! jsonbind round-trip conformance suite.
//!
//! Provides the [`Conformant`] bound and the `codec_conformance_tests!`
//! macro, which generates one `#[test]` per codec obligation (C1-C4) for a
//! sample value of any type implementing both `Encodable` and `Decodable`.
//! [`fixtures`] holds ready-made types covering every field shape.

pub mod checks;
pub mod fixtures;
pub mod suite;
pub mod traits;

pub use traits::*;
