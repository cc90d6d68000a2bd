//! Code-point-safe primitives shared by both comparison engines.
//!
//! Everything here operates on `&[char]` rather than `&str` so that slicing
//! is always a code-point boundary, never a byte boundary. Callers collect a
//! `&str` into a `Vec<char>` once at the API edge and pass slices of it down
//! through the rest of the crate.

mod index_of;
mod overlap;
mod prefix_suffix;

pub use index_of::{index_of, last_index_of};
pub use overlap::common_overlap;
pub use prefix_suffix::{common_prefix_len, common_suffix_len};

/// Collects a string into its code points. The inverse of this is
/// `chars.iter().collect::<String>()`.
pub fn to_chars(text: &str) -> Vec<char> { text.chars().collect() }
