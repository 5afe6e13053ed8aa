//! Insert new page markers every N words.
//!
//! The body is walked in document order. An element contributes the words of
//! its text run when it is entered and the words of its tail run once its
//! subtree is done; whenever the running total reaches the interval a marker
//! is inserted at that element boundary and the count starts over.
//!
//! Two places never receive a marker:
//!
//! - anything inside an `<a>`: anchors and their descendants are neither
//!   counted nor used as insertion points;
//! - a `<ul>`, `<ol>` or `<menu>` directly, after a list item's tail. The
//!   count is carried forward instead, so the next safe boundary gets the
//!   marker.

use log::{debug, trace};

use super::numbering::NumberingScheme;
use super::words::count_words;
use crate::dom::{Document, Edge, Element, NodeId};
use crate::error::{Error, Result};

/// Default number of words between markers.
pub const DEFAULT_INTERVAL: usize = 200;

/// Parents that must not get a marker as a direct child.
const LIST_CONTAINERS: [&str; 3] = ["ul", "ol", "menu"];

/// Result of a placement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub scheme: NumberingScheme,
    /// Value of the marker the numbering continued from.
    pub base: u64,
    /// Ids of the inserted markers, in document order.
    pub inserted: Vec<String>,
    /// First value not yet used.
    pub next_value: u64,
}

impl Placement {
    /// Value of the last marker in the file: the last inserted one, or the
    /// base marker when nothing was inserted.
    pub fn last_value(&self) -> u64 {
        self.next_value - 1
    }

    /// Id to seed the next file with so numbering continues seamlessly.
    pub fn next_marker_id(&self) -> String {
        self.scheme.format(self.next_value)
    }
}

/// Running state of one walk over the body.
struct Cursor {
    word_count: usize,
    next_index: u64,
}

/// Places markers for one document.
///
/// ```
/// use pagemark::dom::parse_str;
/// use pagemark::marker::{NumberingScheme, Placer};
///
/// let mut doc = parse_str("<html><body><p>one two three</p></body></html>").unwrap();
/// let placement = Placer::new(NumberingScheme::Decimal, 7)
///     .with_interval(3)
///     .place(&mut doc)
///     .unwrap();
/// assert_eq!(placement.inserted, vec!["pgepubid00008".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Placer {
    scheme: NumberingScheme,
    base: u64,
    interval: usize,
}

impl Placer {
    pub fn new(scheme: NumberingScheme, base: u32) -> Self {
        Self {
            scheme,
            base: base.into(),
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Words between markers. Zero is treated as one.
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Walk the body and insert markers.
    pub fn place(&self, doc: &mut Document) -> Result<Placement> {
        let body = doc.find_by_local_name("body").ok_or(Error::MissingBody)?;

        // Snapshot first: inserted markers must not be visited.
        let edges: Vec<Edge> = doc.traverse(body).collect();

        let mut cursor = Cursor {
            word_count: 0,
            next_index: self.base + 1,
        };
        let mut inserted = Vec::new();

        for edge in edges {
            match edge {
                Edge::Open(id) => {
                    if inside_anchor(doc, id, body) {
                        continue;
                    }
                    let Some(node) = doc.get(id) else {
                        continue;
                    };
                    cursor.word_count += count_words(&node.text.plain);

                    if cursor.word_count >= self.interval && id != body {
                        let marker_id = self.insert_marker(doc, &mut cursor, |doc, marker| {
                            doc.insert_before(id, marker)
                        });
                        trace!("{marker_id} before {}", describe(doc, id));
                        inserted.push(marker_id);
                    }
                }
                Edge::Close(id) => {
                    // The body's own tail lies outside the body.
                    if id == body || inside_anchor(doc, id, body) {
                        continue;
                    }
                    let Some(node) = doc.get(id) else {
                        continue;
                    };
                    cursor.word_count += count_words(&node.tail.plain);
                    if cursor.word_count < self.interval {
                        continue;
                    }

                    let parent = doc.parent(id);
                    if is_list_container(doc, parent) {
                        debug!(
                            "not inserting into <{}>, carrying {} words forward",
                            doc.local_name(parent).unwrap_or_default(),
                            cursor.word_count
                        );
                        continue;
                    }
                    let marker_id = self.insert_marker(doc, &mut cursor, |doc, marker| {
                        doc.insert_after(id, marker)
                    });
                    trace!("{marker_id} after {}", describe(doc, id));
                    inserted.push(marker_id);
                }
            }
        }

        Ok(Placement {
            scheme: self.scheme,
            base: self.base,
            inserted,
            next_value: cursor.next_index,
        })
    }

    /// Create the next marker, attach it with `link`, and advance the cursor.
    fn insert_marker<F>(&self, doc: &mut Document, cursor: &mut Cursor, link: F) -> String
    where
        F: FnOnce(&mut Document, NodeId),
    {
        let marker_id = self.scheme.format(cursor.next_index);
        let marker = doc.create_element(Element::new("span", &[("id", &marker_id)]));
        link(doc, marker);
        cursor.next_index += 1;
        cursor.word_count = 0;
        marker_id
    }
}

/// Whether `id` is an anchor or sits inside one, looking no further up than
/// `body`.
fn inside_anchor(doc: &Document, id: NodeId, body: NodeId) -> bool {
    std::iter::once(id)
        .chain(doc.ancestors(id))
        .take_while(|&n| n != body)
        .any(|n| {
            doc.local_name(n)
                .is_some_and(|name| name.eq_ignore_ascii_case("a"))
        })
}

fn is_list_container(doc: &Document, id: NodeId) -> bool {
    doc.local_name(id).is_some_and(|name| {
        LIST_CONTAINERS
            .iter()
            .any(|list| name.eq_ignore_ascii_case(list))
    })
}

fn describe(doc: &Document, id: NodeId) -> String {
    match doc.local_name(id) {
        Some(name) => format!("<{name}>"),
        None => "non-element node".to_string(),
    }
}
