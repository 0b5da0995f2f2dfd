//! C4: Stable encoding.
//!
//! Encoding the same value twice, or re-encoding the decoded value, MUST
//! produce the same tree. Catches encoders that depend on hidden state or
//! decoders that drop fields the encoder wrote.

use crate::traits::{CheckResult, Conformant};

pub fn check_stable_encoding<T: Conformant>(sample: &T) -> CheckResult {
    let first = sample
        .to_json()
        .map_err(|e| format!("C4: first encode failed: {}", e))?;
    let second = sample
        .to_json()
        .map_err(|e| format!("C4: second encode failed: {}", e))?;
    if first != second {
        return Err(format!("C4: encoding changed between calls: {} vs {}", first, second));
    }

    let decoded = T::decode(&first).map_err(|e| format!("C4: decode failed: {}", e))?;
    let reencoded = decoded
        .to_json()
        .map_err(|e| format!("C4: re-encode failed: {}", e))?;
    if first != reencoded {
        return Err(format!(
            "C4: re-encoded tree differs\n  first:     {}\n  reencoded: {}",
            first, reencoded
        ));
    }
    Ok(())
}
