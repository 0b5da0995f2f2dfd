//! C2: Bytes round-trip.
//!
//! The serialized bytes MUST parse back into a value equal to the sample,
//! through the same path a network or disk consumer would use.

use crate::traits::{CheckResult, Conformant};

pub fn check_bytes_round_trip<T: Conformant>(sample: &T) -> CheckResult {
    let bytes = sample
        .encode_to_bytes()
        .map_err(|e| format!("C2: encode_to_bytes failed: {}", e))?;
    let decoded = T::decode_bytes(&bytes).map_err(|e| {
        format!(
            "C2: decode_bytes of {} failed: {}",
            String::from_utf8_lossy(&bytes),
            e
        )
    })?;
    if &decoded != sample {
        return Err(format!(
            "C2: round-trip mismatch\n  sample:  {:?}\n  decoded: {:?}",
            sample, decoded
        ));
    }
    Ok(())
}
