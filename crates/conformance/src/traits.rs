use std::fmt::Debug;

use jsonbind_core::{Decodable, Encodable};

/// Bound for types the conformance suite can exercise: both capabilities,
/// plus equality and `Debug` so a failed round-trip can be reported.
pub trait Conformant: Encodable + Decodable + PartialEq + Debug {}

impl<T: Encodable + Decodable + PartialEq + Debug> Conformant for T {}

/// Result type for a single conformance check.
pub type CheckResult = Result<(), String>;
