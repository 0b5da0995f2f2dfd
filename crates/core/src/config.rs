//! Codec configuration.
//!
//! The active configuration is thread-local: conversions are synchronous and
//! run to completion on the caller's thread, so each thread carries its own
//! limits. Hosts usually deserialize a [`CodecConfig`] from their own config
//! file (it implements `serde::Deserialize`) and call [`CodecConfig::install`]
//! once, or wrap a single conversion in [`CodecConfig::scope`].

use std::cell::Cell;

use serde::Deserialize;

/// Default nesting limit. Matches serde_json's own parser recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Environment variable read by [`CodecConfig::from_env`].
pub const MAX_DEPTH_ENV: &str = "JSONBIND_MAX_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum number of nested typed values (objects, list elements, map
    /// values) a single encode or decode may descend through.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

thread_local! {
    static ACTIVE: Cell<CodecConfig> = const {
        Cell::new(CodecConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        })
    };
}

impl CodecConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Defaults, overridden by `JSONBIND_MAX_DEPTH` when it holds a valid
    /// unsigned integer. An unparseable value is ignored.
    pub fn from_env() -> Self {
        let mut config = CodecConfig::default();
        if let Ok(raw) = std::env::var(MAX_DEPTH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(max_depth) => config.max_depth = max_depth,
                Err(e) => {
                    tracing::warn!(
                        var = MAX_DEPTH_ENV,
                        value = %raw,
                        error = %e,
                        "ignoring invalid codec config override"
                    );
                }
            }
        }
        config
    }

    /// The configuration in effect on the current thread.
    pub fn active() -> CodecConfig {
        ACTIVE.with(Cell::get)
    }

    /// Make this the configuration for every later conversion on this thread.
    pub fn install(self) {
        tracing::debug!(max_depth = self.max_depth, "installing codec config");
        ACTIVE.with(|active| active.set(self));
    }

    /// Run `f` with this configuration active, restoring the previous one
    /// afterwards (also on unwind).
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        struct Restore(CodecConfig);

        impl Drop for Restore {
            fn drop(&mut self) {
                ACTIVE.with(|active| active.set(self.0));
            }
        }

        let _restore = Restore(ACTIVE.with(|active| active.replace(self)));
        f()
    }
}
