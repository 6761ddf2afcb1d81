//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Limits and options shared by the binary and textual codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    max_depth: usize,
    string_table: bool,
}

impl CodecConfig {
    /// Creates a configuration accepting at most `max_depth` nested levels.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            string_table: true,
        }
    }

    /// Sets the maximum nesting depth accepted when decoding.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables string back-references when binary encoding.
    /// Decoders always understand both forms.
    #[must_use]
    pub const fn with_string_table(mut self, enabled: bool) -> Self {
        self.string_table = enabled;
        self
    }

    /// Returns the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(self) -> usize {
        self.max_depth
    }

    /// Returns `true` when the binary encoder emits string back-references.
    #[must_use]
    pub const fn string_table(self) -> bool {
        self.string_table
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(64)
    }
}
