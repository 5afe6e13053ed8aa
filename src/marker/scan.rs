//! Locate existing page markers and decide what to do with a document.

use log::debug;

use super::numbering::{MARKER_PREFIX, NumberingScheme};
use crate::dom::{Document, NodeId};
use crate::error::Result;

/// What a document's first marker asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No marker at all: leave the file alone.
    Skip,
    /// First marker is the bare prefix: remove every marker.
    StripOnly,
    /// First marker is numbered: keep it, drop the rest, and continue the
    /// numbering from `base`.
    Continue {
        first: NodeId,
        scheme: NumberingScheme,
        base: u32,
    },
}

/// Whether `id` is a `<span>` whose id carries the marker prefix.
pub fn is_marker(doc: &Document, id: NodeId) -> bool {
    doc.element(id).is_some_and(|el| {
        el.local_name() == "span"
            && el
                .attr("id")
                .is_some_and(|value| value.starts_with(MARKER_PREFIX))
    })
}

/// All markers in document order.
pub fn find_markers(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .filter(|&id| is_marker(doc, id))
        .collect()
}

/// Classify the document by its first marker.
pub fn scan(doc: &Document) -> Result<Mode> {
    let Some(first) = doc
        .descendants(doc.root())
        .find(|&id| is_marker(doc, id))
    else {
        return Ok(Mode::Skip);
    };

    let first_id = doc.get_attr(first, "id").unwrap_or_default();
    if first_id == MARKER_PREFIX {
        return Ok(Mode::StripOnly);
    }

    let (scheme, base) = NumberingScheme::parse(first_id)?;
    debug!("first marker {first_id}: {scheme:?} numbering from {base}");
    Ok(Mode::Continue {
        first,
        scheme,
        base,
    })
}

/// Remove every marker. Returns how many were removed.
pub fn strip_all(doc: &mut Document) -> usize {
    let markers = find_markers(doc);
    for &id in &markers {
        doc.detach(id);
    }
    markers.len()
}

/// Remove every marker except `keep`. Returns how many were removed.
pub fn strip_others(doc: &mut Document, keep: NodeId) -> usize {
    let strays: Vec<_> = find_markers(doc)
        .into_iter()
        .filter(|&id| id != keep)
        .collect();
    for &id in &strays {
        debug!(
            "removing stray marker {}",
            doc.get_attr(id, "id").unwrap_or_default()
        );
        doc.detach(id);
    }
    strays.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_str;
    use crate::error::Error;

    fn ids(doc: &Document) -> Vec<String> {
        find_markers(doc)
            .into_iter()
            .filter_map(|id| doc.get_attr(id, "id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_scan_skip_without_markers() {
        let doc = parse_str(r#"<html><body><p id="pgepubid00001">x</p></body></html>"#).unwrap();
        assert_eq!(scan(&doc).unwrap(), Mode::Skip);
    }

    #[test]
    fn test_scan_strip_only() {
        let mut doc = parse_str(
            r#"<html><body><span id="pgepubid"/><p>a<span id="pgepubid00007"/>b</p></body></html>"#,
        )
        .unwrap();
        assert_eq!(scan(&doc).unwrap(), Mode::StripOnly);
        assert_eq!(strip_all(&mut doc), 2);
        assert!(ids(&doc).is_empty());
    }

    #[test]
    fn test_scan_continue_and_strip_others() {
        let mut doc = parse_str(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><p>x<span id="pgepubid000iv"/></p><span id="pgepubid00002"/><span id="pgepubid00003"/></body></html>"#,
        )
        .unwrap();
        let Mode::Continue {
            first,
            scheme,
            base,
        } = scan(&doc).unwrap()
        else {
            panic!("expected continue mode");
        };
        assert_eq!(scheme, NumberingScheme::Roman);
        assert_eq!(base, 4);

        assert_eq!(strip_others(&mut doc, first), 2);
        assert_eq!(ids(&doc), vec!["pgepubid000iv".to_string()]);
    }

    #[test]
    fn test_scan_unparsable_numeral() {
        let doc = parse_str(r#"<html><body><span id="pgepubidzz"/></body></html>"#).unwrap();
        assert!(matches!(scan(&doc), Err(Error::UnparsableNumeral(s)) if s == "zz"));
    }
}
