//! Property tests for marker placement over generated chapters.

use pagemark::dom::{self, Document, NodeId};
use pagemark::marker::{Mode, find_markers, scan};
use pagemark::{Options, Outcome, paginate_document};
use proptest::prelude::*;

/// One block of generated body content.
#[derive(Debug, Clone)]
enum Block {
    Paragraph(usize),
    Linked { before: usize, inside: usize, after: usize },
    List(Vec<usize>),
    StrayMarker(u32),
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

fn render(block: &Block) -> String {
    match block {
        Block::Paragraph(n) => format!("<p>{}</p>", words(*n)),
        Block::Linked {
            before,
            inside,
            after,
        } => format!(
            "<p>{} <a href=\"#x\">{} <em>{}</em></a> {}</p>",
            words(*before),
            words(*inside),
            words(*inside),
            words(*after)
        ),
        Block::List(items) => format!(
            "<ul>{}</ul>",
            items
                .iter()
                .map(|n| format!("<li>{}</li> {}", words(*n), words(*n)))
                .collect::<String>()
        ),
        Block::StrayMarker(v) => format!("<span id=\"pgepubid{v:05}\"/>"),
    }
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (0usize..300).prop_map(Block::Paragraph),
        (0usize..60, 0usize..120, 0usize..60).prop_map(|(before, inside, after)| Block::Linked {
            before,
            inside,
            after
        }),
        prop::collection::vec(0usize..80, 1..5).prop_map(Block::List),
        (0u32..500).prop_map(Block::StrayMarker),
    ]
}

fn chapter(base: u32, blocks: &[Block]) -> String {
    let body: String = blocks.iter().map(render).collect::<Vec<_>>().join("\n");
    format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>t</title></head><body><span id=\"pgepubid{base:05}\"/>\n{body}\n</body></html>"
    )
}

fn marker_values(doc: &Document) -> Vec<u32> {
    find_markers(doc)
        .into_iter()
        .map(|id| {
            doc.get_attr(id, "id").unwrap()["pgepubid".len()..]
                .parse()
                .unwrap()
        })
        .collect()
}

fn in_anchor(doc: &Document, id: NodeId) -> bool {
    doc.ancestors(id)
        .any(|a| doc.local_name(a).is_some_and(|n| n == "a"))
}

fn without_markers(markup: &str) -> String {
    let mut doc = dom::parse_str(markup).unwrap();
    pagemark::marker::strip_all(&mut doc);
    String::from_utf8(dom::serialize(&doc)).unwrap()
}

proptest! {
    #[test]
    fn prop_markers_are_consecutive_after_base(
        base in 0u32..10_000,
        blocks in prop::collection::vec(block(), 0..25),
        interval in 1usize..300,
    ) {
        let source = chapter(base, &blocks);
        let mut doc = dom::parse_str(&source).unwrap();
        let options = Options { interval, ..Options::default() };
        let outcome = paginate_document(&mut doc, &options).unwrap();

        let Outcome::Paginated { placement, .. } = outcome else {
            panic!("expected pagination");
        };

        let values = marker_values(&doc);
        prop_assert_eq!(values[0], base);
        for (k, value) in values.iter().enumerate() {
            prop_assert_eq!(*value, base + k as u32);
        }
        prop_assert_eq!(placement.inserted.len() + 1, values.len());
        prop_assert_eq!(placement.next_value, u64::from(base) + values.len() as u64);

        for marker in find_markers(&doc) {
            prop_assert!(!in_anchor(&doc, marker));
        }
    }

    #[test]
    fn prop_only_markers_change(
        blocks in prop::collection::vec(block(), 0..15),
    ) {
        let source = chapter(1, &blocks);
        let mut doc = dom::parse_str(&source).unwrap();
        paginate_document(&mut doc, &Options { interval: 50, ..Options::default() }).unwrap();
        let output = String::from_utf8(dom::serialize(&doc)).unwrap();

        prop_assert_eq!(without_markers(&output), without_markers(&source));
    }

    #[test]
    fn prop_strip_only_is_idempotent(
        blocks in prop::collection::vec(block(), 0..15),
    ) {
        let source = chapter(0, &blocks).replacen("pgepubid00000", "pgepubid", 1);
        let mut doc = dom::parse_str(&source).unwrap();
        prop_assert_eq!(scan(&doc).unwrap(), Mode::StripOnly);
        paginate_document(&mut doc, &Options::default()).unwrap();
        let once = dom::serialize(&doc);
        prop_assert!(find_markers(&doc).is_empty());

        let mut again = dom::parse(&once).unwrap();
        let outcome = paginate_document(&mut again, &Options::default()).unwrap();
        prop_assert_eq!(outcome, Outcome::Skipped);
        prop_assert_eq!(dom::serialize(&again), once);
    }
}
