//! Serialize a [`Document`] back to bytes.
//!
//! Output always starts with a UTF-8 XML declaration and an HTML5 doctype.
//! Everything else is written from the raw source forms kept in the tree, so
//! untouched content round-trips byte for byte.

use super::arena::{Document, NodeData, NodeId};

/// XML declaration written at the top of every document.
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Doctype written after the declaration.
pub const DOCTYPE: &str = "<!DOCTYPE html>";

/// Serialize the whole document.
pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(DOCTYPE);
    out.push('\n');

    let mut past_root = false;
    for child in doc.children(doc.root()) {
        let is_element = doc.element(child).is_some();
        if past_root {
            out.push('\n');
        }
        write_node(doc, child, &mut out, false);
        if is_element {
            past_root = true;
        } else if !past_root {
            out.push('\n');
        }
    }

    out.into_bytes()
}

/// Serialize a single subtree, tail excluded. Handy for tests and logging.
pub fn node_to_string(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out, false);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String, with_tail: bool) {
    let Some(node) = doc.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Root => {}
        NodeData::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        NodeData::ProcessingInstruction(body) => {
            out.push_str("<?");
            out.push_str(body);
            out.push_str("?>");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.raw_tag);
            // A source `<x/>` that gained children must be written open/closed.
            if el.self_closing && node.first_child.is_none() && node.text.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                out.push_str(&node.text.raw);
                for child in doc.children(id) {
                    write_node(doc, child, out, true);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
        }
    }

    if with_tail {
        out.push_str(&node.tail.raw);
    }
}
