//! # pagemark
//!
//! Insert or strip Kindle-compatible page markers (`<span id="pgepubid00001"/>`)
//! in the XHTML content documents of an EPUB.
//!
//! A content document opts in by carrying a marker:
//!
//! - `<span id="pgepubid"/>` first: every marker in the file is removed.
//! - `<span id="pgepubid00023"/>` or `<span id="pgepubid000xii"/>` first: that
//!   marker is kept, any other markers are removed, and new ones are inserted
//!   every 200 words continuing its numbering.
//! - No marker: the file is left alone.
//!
//! ## Quick Start
//!
//! ```
//! use pagemark::{Options, Outcome, paginate_bytes};
//!
//! let words = vec!["word"; 250].join(" ");
//! let xhtml = format!(
//!     r#"<html><body><span id="pgepubid00041"/><p>{words}</p></body></html>"#
//! );
//!
//! let (outcome, output) = paginate_bytes(xhtml.as_bytes(), &Options::default()).unwrap();
//! let Outcome::Paginated { placement, .. } = outcome else { panic!() };
//! assert_eq!(placement.next_marker_id(), "pgepubid00043");
//!
//! let output = String::from_utf8(output.unwrap()).unwrap();
//! assert!(output.contains(r#"<span id="pgepubid00042"/><p>"#));
//! ```

pub mod dom;
pub mod error;
pub mod marker;
pub mod paginate;
pub(crate) mod util;

pub use error::{Error, Result};
pub use marker::{Mode, NumberingScheme, Placement, Placer};
pub use paginate::{
    Options, Outcome, RangeReport, RangeStatus, list_ranges, marker_range, paginate_bytes,
    paginate_document, paginate_file,
};
pub use util::is_xhtml;
