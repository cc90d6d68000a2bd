//! Immutable tuning-knob bundle shared by every public entry point.
//!
//! Unlike the reference implementation's mutable configuration object, a
//! [`Config`] is created once, cloned freely (it is plain data, `Copy`-sized),
//! and never mutated during a computation. Construct one with [`Config::new`]
//! or [`Config::default`] and adjust individual knobs with the `with_*`
//! builder methods.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of seconds `diff_main` is allowed to spend bisecting before it
    /// gives up and returns a non-minimal diff. `0` disables the deadline
    /// (and the half-match speedup, which only pays off when a timeout is in
    /// play).
    pub diff_timeout: f64,

    /// Cost of an empty edit operation in terms of edit characters, used by
    /// the efficiency cleanup pass to decide whether a short equality is
    /// worth keeping as its own operation.
    pub diff_edit_cost: u16,

    /// At what point a match is considered "bad enough" to be discarded,
    /// in `[0.0, 1.0]`. `0.0` requires a perfect match, `1.0` matches
    /// anything.
    pub match_threshold: f32,

    /// How far to search for a match, measured in characters. A match this
    /// many characters away from the expected location will incur a score
    /// penalty of 1.0 (the worst possible score).
    pub match_distance: u32,

    /// The number of bits in an int, used by the bitap matcher to limit how
    /// long a pattern it can operate on in one pass.
    pub match_max_bits: u16,

    /// When deleting a large block of text (over ~64 characters), how close
    /// the contents must match the expected contents, in `[0.0, 1.0]`, to
    /// avoid dropping the whole block during `Patch::apply`.
    pub patch_delete_threshold: f32,

    /// Chunk size for context length around a patch's edits.
    pub patch_margin: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diff_timeout: 1.0,
            diff_edit_cost: 4,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}

impl Config {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_diff_timeout(mut self, diff_timeout: f64) -> Self {
        self.diff_timeout = diff_timeout;
        self
    }

    #[must_use]
    pub fn with_diff_edit_cost(mut self, diff_edit_cost: u16) -> Self {
        self.diff_edit_cost = diff_edit_cost;
        self
    }

    #[must_use]
    pub fn with_match_threshold(mut self, match_threshold: f32) -> Self {
        self.match_threshold = match_threshold;
        self
    }

    #[must_use]
    pub fn with_match_distance(mut self, match_distance: u32) -> Self {
        self.match_distance = match_distance;
        self
    }

    #[must_use]
    pub fn with_match_max_bits(mut self, match_max_bits: u16) -> Self {
        self.match_max_bits = match_max_bits;
        self
    }

    #[must_use]
    pub fn with_patch_delete_threshold(mut self, patch_delete_threshold: f32) -> Self {
        self.patch_delete_threshold = patch_delete_threshold;
        self
    }

    #[must_use]
    pub fn with_patch_margin(mut self, patch_margin: u16) -> Self {
        self.patch_margin = patch_margin;
        self
    }

    /// Whether the half-match speedup and the bisection deadline are active.
    pub(crate) fn deadline_enabled(&self) -> bool { self.diff_timeout > 0.0 }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_matches_reference_defaults() {
        let config = Config::default();
        assert_eq!(config.diff_timeout, 1.0);
        assert_eq!(config.diff_edit_cost, 4);
        assert_eq!(config.match_threshold, 0.5);
        assert_eq!(config.match_distance, 1000);
        assert_eq!(config.match_max_bits, 32);
        assert_eq!(config.patch_delete_threshold, 0.5);
        assert_eq!(config.patch_margin, 4);
    }

    #[test]
    fn builder_overrides_individual_fields() {
        let config = Config::new().with_diff_timeout(0.0).with_patch_margin(8);
        assert_eq!(config.diff_timeout, 0.0);
        assert_eq!(config.patch_margin, 8);
        assert!(!config.deadline_enabled());
    }
}
