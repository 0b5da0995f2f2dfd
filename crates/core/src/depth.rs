//! Recursion guard shared by the encoder and the decoder.

use std::cell::Cell;

use crate::config::CodecConfig;
use crate::error::{DecodeError, EncodeError};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Holds one level of nesting; the level is released on drop.
pub(crate) struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    fn enter() -> Result<DepthGuard, usize> {
        let limit = CodecConfig::active().max_depth;
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                tracing::warn!(limit, "nesting depth limit exceeded");
                return Err(limit);
            }
            depth.set(next);
            Ok(DepthGuard { _private: () })
        })
    }

    pub(crate) fn encode() -> Result<DepthGuard, EncodeError> {
        DepthGuard::enter().map_err(|limit| EncodeError::DepthLimitExceeded { limit })
    }

    pub(crate) fn decode() -> Result<DepthGuard, DecodeError> {
        DepthGuard::enter().map_err(|limit| DecodeError::DepthLimitExceeded { limit })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Current nesting depth on this thread. Zero outside of any conversion.
pub fn current() -> usize {
    DEPTH.with(Cell::get)
}
