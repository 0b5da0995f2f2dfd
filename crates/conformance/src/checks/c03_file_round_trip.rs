//! C3: File round-trip.
//!
//! `encode_as_file` followed by `decode_file` on the same path MUST give
//! back an equal value. Runs in a throwaway directory.

use crate::traits::{CheckResult, Conformant};

pub fn check_file_round_trip<T: Conformant>(sample: &T) -> CheckResult {
    let dir = tempfile::tempdir().map_err(|e| format!("C3: tempdir failed: {}", e))?;
    let path = dir.path().join("sample.json");

    sample
        .encode_as_file(&path)
        .map_err(|e| format!("C3: encode_as_file failed: {}", e))?;
    let decoded = T::decode_file(&path).map_err(|e| format!("C3: decode_file failed: {}", e))?;

    if &decoded != sample {
        return Err(format!(
            "C3: round-trip mismatch\n  sample:  {:?}\n  decoded: {:?}",
            sample, decoded
        ));
    }
    Ok(())
}
