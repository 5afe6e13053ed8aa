//! Per-file and per-directory processing.
//!
//! Each file is handled on its own: parse, decide, mutate in memory, and only
//! then write. A failure at any step leaves the file on disk untouched.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::dom::{self, Document};
use crate::error::{Error, Result};
use crate::marker::{self, DEFAULT_INTERVAL, Mode, Placement, Placer};
use crate::util::is_xhtml;

/// Settings for a pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Words between markers.
    pub interval: usize,
    /// Process files but never write them back.
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            dry_run: false,
        }
    }
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No marker present; nothing done.
    Skipped,
    /// Bare marker present; every marker removed.
    Stripped { removed: usize },
    /// Numbered marker present; strays removed and new markers inserted.
    Paginated {
        first_id: String,
        strays_removed: usize,
        placement: Placement,
    },
}

impl Outcome {
    /// Whether the document changed and needs writing.
    pub fn is_modified(&self) -> bool {
        !matches!(self, Outcome::Skipped)
    }
}

/// Run the marker pipeline on a parsed document.
pub fn paginate_document(doc: &mut Document, options: &Options) -> Result<Outcome> {
    match marker::scan(doc)? {
        Mode::Skip => Ok(Outcome::Skipped),
        Mode::StripOnly => {
            let removed = marker::strip_all(doc);
            Ok(Outcome::Stripped { removed })
        }
        Mode::Continue {
            first,
            scheme,
            base,
        } => {
            let first_id = doc.get_attr(first, "id").unwrap_or_default().to_string();
            let placer = Placer::new(scheme, base).with_interval(options.interval);
            // Look for the body before touching anything.
            if doc.find_by_local_name("body").is_none() {
                return Err(Error::MissingBody);
            }
            let strays_removed = marker::strip_others(doc, first);
            let placement = placer.place(doc)?;
            Ok(Outcome::Paginated {
                first_id,
                strays_removed,
                placement,
            })
        }
    }
}

/// Parse, process and serialize. The bytes are `None` when nothing changed.
pub fn paginate_bytes(bytes: &[u8], options: &Options) -> Result<(Outcome, Option<Vec<u8>>)> {
    let mut doc = dom::parse(bytes)?;
    let outcome = paginate_document(&mut doc, options)?;
    let output = outcome.is_modified().then(|| dom::serialize(&doc));
    Ok((outcome, output))
}

/// Process one file in place.
pub fn paginate_file(path: impl AsRef<Path>, options: &Options) -> Result<Outcome> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let (outcome, output) = paginate_bytes(&bytes, options)?;

    match output {
        Some(output) if !options.dry_run => {
            fs::write(path, output)?;
            info!("wrote {}", path.display());
        }
        Some(_) => debug!("dry run, not writing {}", path.display()),
        None => {}
    }
    Ok(outcome)
}

/// Marker summary for one file of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeStatus {
    NoMarkers,
    Range { first: String, last: String },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeReport {
    pub path: PathBuf,
    pub status: RangeStatus,
}

/// First and last marker ids of a document, if it has any.
pub fn marker_range(doc: &Document) -> Option<(String, String)> {
    let ids: Vec<&str> = marker::find_markers(doc)
        .into_iter()
        .filter_map(|id| doc.get_attr(id, "id"))
        .collect();
    match (ids.first(), ids.last()) {
        (Some(first), Some(last)) => Some((first.to_string(), last.to_string())),
        _ => None,
    }
}

/// Summarize the markers of every `.xhtml` file in `dir`, sorted by name.
///
/// Read-only. Per-file problems are reported in the result rather than
/// failing the whole listing; only an unreadable directory is an error.
pub fn list_ranges(dir: impl AsRef<Path>) -> Result<Vec<RangeReport>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_xhtml(path))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths
        .into_iter()
        .map(|path| {
            let status = match fs::read(&path)
                .map_err(Error::from)
                .and_then(|bytes| dom::parse(&bytes))
            {
                Ok(doc) => match marker_range(&doc) {
                    Some((first, last)) => RangeStatus::Range { first, last },
                    None => RangeStatus::NoMarkers,
                },
                Err(e) => RangeStatus::Error(e.to_string()),
            };
            RangeReport { path, status }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_leaves_bytes_alone() {
        let (outcome, output) =
            paginate_bytes(b"<html><body><p>text</p></body></html>", &Options::default()).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(output.is_none());
    }

    #[test]
    fn test_missing_body_does_not_strip() {
        let mut doc =
            dom::parse_str(r#"<html><div><span id="pgepubid00001"/><span id="pgepubid00002"/></div></html>"#)
                .unwrap();
        assert!(matches!(
            paginate_document(&mut doc, &Options::default()),
            Err(Error::MissingBody)
        ));
        assert_eq!(marker::find_markers(&doc).len(), 2);
    }

    #[test]
    fn test_marker_range() {
        let doc = dom::parse_str(
            r#"<html><body><span id="pgepubid00003"/><p>x</p><span id="other"/><span id="pgepubid00009"/></body></html>"#,
        )
        .unwrap();
        assert_eq!(
            marker_range(&doc),
            Some(("pgepubid00003".to_string(), "pgepubid00009".to_string()))
        );
    }
}
