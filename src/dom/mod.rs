//! XHTML content documents as an editable tree.
//!
//! [`parse`] builds an arena [`Document`] from bytes and [`serialize`] writes
//! it back. Only marker insertion and removal touch the tree in between, so
//! everything else comes out exactly as it went in.

mod arena;
mod parser;
mod writer;

pub use arena::{
    Ancestors, Attribute, ChildrenIter, Descendants, Document, Edge, Element, Node, NodeData,
    NodeId, TextRun, Traverse, local_name,
};
pub use parser::{parse, parse_str};
pub use writer::{DOCTYPE, XML_DECLARATION, node_to_string, serialize};
