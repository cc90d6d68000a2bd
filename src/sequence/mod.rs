//! Engine R: a Ratcliff/Obershelp longest-contiguous-match sequence matcher
//! (in the style of Python's `difflib.SequenceMatcher`), its op-code and
//! grouped-op-code extraction, and `patch(1)`-style unified/context diff
//! writers built on top of them.

mod matcher;
mod opcode;
mod writer;

pub use matcher::{MatchBlock, SequenceMatcher};
pub use opcode::{OpCode, Tag};
pub use writer::{context_diff, split_lines, unified_diff};
