//! Character-granular diffing, fuzzy matching and patching (Myers-based),
//! plus line-granular Ratcliff/Obershelp sequence matching with
//! `patch(1)`-style unified/context diff output.

mod config;
mod diff;
mod error;
mod sequence;
mod text;

pub use config::Config;
pub use error::{DiffError, Result};

pub use diff::{
    Diff, Op, Patch, add_padding, diff_levenshtein, diff_main, diff_to_delta, diff_x_index, efficiency, from_delta,
    match_main, merge, patch_apply, patch_from_text, patch_make_diffs, patch_make_text_and_diffs, patch_make_texts,
    patch_split_max, patch_to_text, semantic, semantic_lossless, text1, text2,
};

pub use sequence::{MatchBlock, OpCode, SequenceMatcher, Tag, context_diff, split_lines, unified_diff};

pub use text::{common_overlap, common_prefix_len, common_suffix_len, index_of, last_index_of, to_chars};
