//! The `codec_conformance_tests!` macro.
//!
//! Generates four `#[test]` functions, one per codec obligation C1 through
//! C4, for a sample value of any [`Conformant`](crate::Conformant) type.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jsonbind_conformance::codec_conformance_tests;
//!
//! mod person {
//!     use super::*;
//!     codec_conformance_tests!(Person { name: "Ada".into(), age: 36 });
//! }
//! ```
//!
//! Generated names are fixed, so invoke the macro once per module. Each
//! test evaluates `$sample` afresh.

/// Generate round-trip conformance tests for one sample value.
#[macro_export]
macro_rules! codec_conformance_tests {
    ($sample:expr) => {
        #[test]
        fn conformance_c01_value_round_trip() {
            let sample = $sample;
            $crate::checks::c01_value_round_trip::check_value_round_trip(&sample)
                .expect("C1: value round-trip conformance failed");
        }

        #[test]
        fn conformance_c02_bytes_round_trip() {
            let sample = $sample;
            $crate::checks::c02_bytes_round_trip::check_bytes_round_trip(&sample)
                .expect("C2: bytes round-trip conformance failed");
        }

        #[test]
        fn conformance_c03_file_round_trip() {
            let sample = $sample;
            $crate::checks::c03_file_round_trip::check_file_round_trip(&sample)
                .expect("C3: file round-trip conformance failed");
        }

        #[test]
        fn conformance_c04_stable_encoding() {
            let sample = $sample;
            $crate::checks::c04_stable_encoding::check_stable_encoding(&sample)
                .expect("C4: stable encoding conformance failed");
        }
    };
}
