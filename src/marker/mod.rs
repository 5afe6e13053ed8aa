//! Page markers: numbering, discovery and placement.
//!
//! A document opts in by carrying a `<span id="pgepubid…"/>`. The first such
//! span decides what happens to the file (see [`Mode`]); [`Placer`] then adds
//! markers every [`DEFAULT_INTERVAL`] words.

mod numbering;
mod place;
mod scan;
mod words;

pub use numbering::{MARKER_PREFIX, NumberingScheme, int_to_roman, roman_to_int};
pub use place::{DEFAULT_INTERVAL, Placement, Placer};
pub use scan::{Mode, find_markers, is_marker, scan, strip_all, strip_others};
pub use words::count_words;
