//! C1: Value round-trip.
//!
//! Decoding the tree produced by `to_json` MUST give back an equal value.

use crate::traits::{CheckResult, Conformant};

pub fn check_value_round_trip<T: Conformant>(sample: &T) -> CheckResult {
    let json = sample
        .to_json()
        .map_err(|e| format!("C1: encode failed: {}", e))?;
    let decoded = T::decode(&json).map_err(|e| format!("C1: decode of {} failed: {}", json, e))?;
    if &decoded != sample {
        return Err(format!(
            "C1: round-trip mismatch\n  sample:  {:?}\n  decoded: {:?}\n  json:    {}",
            sample, decoded, json
        ));
    }
    Ok(())
}
