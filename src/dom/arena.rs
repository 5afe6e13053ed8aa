//! Arena-based document tree with the text/tail model.
//!
//! All nodes live in a contiguous vector and link to each other by index,
//! so removing or inserting a node only rewrites a handful of links.
//!
//! Character data is attached to element boundaries rather than stored as
//! separate nodes:
//!
//! ```text
//! <div>TEXT<span>inner</span>TAIL</div>
//! ```
//!
//! Here `TEXT` is the div's `text` run and `TAIL` is the span's `tail` run.
//! A marker inserted next to an element therefore always lands on an element
//! boundary, never inside a run of characters.

use quick_xml::escape::escape;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// A run of character data.
///
/// `raw` is the markup exactly as it appeared in the source (entity
/// references and CDATA sections included) and is what gets written back.
/// `plain` is the decoded character content used for word counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub raw: String,
    pub plain: String,
}

impl TextRun {
    /// Create a run whose raw and decoded forms are identical.
    pub fn new(s: &str) -> Self {
        Self {
            raw: s.to_string(),
            plain: s.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Append a chunk given in both raw and decoded form.
    pub fn push(&mut self, raw: &str, plain: &str) {
        self.raw.push_str(raw);
        self.plain.push_str(plain);
    }

    /// Append another run.
    pub fn append(&mut self, other: &TextRun) {
        self.push(&other.raw, &other.plain);
    }
}

/// Element attribute with its value already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element: qualified name, attributes, and the raw start tag it was
/// parsed from.
#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified tag name as written (`body`, `html:body`, ...).
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Everything between `<` and `>` (or `/>`) of the start tag.
    pub raw_tag: String,
    /// The source used `<x/>` rather than `<x></x>`.
    pub self_closing: bool,
}

impl Element {
    /// Build a fresh self-closing element with the given attributes.
    pub fn new(name: &str, attrs: &[(&str, &str)]) -> Self {
        let mut raw_tag = name.to_string();
        for (key, value) in attrs {
            raw_tag.push(' ');
            raw_tag.push_str(key);
            raw_tag.push_str("=\"");
            raw_tag.push_str(&escape(*value));
            raw_tag.push('"');
        }
        Self {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| Attribute {
                    name: k.to_string(),
                    value: v.to_string(),
                })
                .collect(),
            raw_tag,
            self_closing: true,
        }
    }

    /// Tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Strip a `prefix:` from a qualified name.
pub fn local_name(qname: &str) -> &str {
    match qname.rfind(':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root; its children are the prolog, the root element and the
    /// epilog.
    Root,
    Element(Element),
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment(String),
    /// Processing instruction body without the `<?`/`?>` delimiters.
    ProcessingInstruction(String),
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    /// Character data before the first child.
    pub text: TextRun,
    /// Character data after this node's end, before the next sibling.
    pub tail: TextRun,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            text: TextRun::default(),
            tail: TextRun::default(),
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Arena-based document tree.
///
/// Detached nodes stay allocated in the arena; they are simply unreachable
/// from the root.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId::NONE,
        };
        doc.root = doc.alloc(Node::new(NodeData::Root));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(Node::new(NodeData::Element(element)))
    }

    pub fn create_comment(&mut self, body: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(body)))
    }

    pub fn create_pi(&mut self, body: String) -> NodeId {
        self.alloc(Node::new(NodeData::ProcessingInstruction(body)))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node immediately before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node immediately after a sibling (after the sibling's tail).
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, next) = match self.get(sibling) {
            Some(n) => (n.parent, n.next_sibling),
            None => return,
        };

        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            self.append(parent, new_node);
        }
    }

    /// Unlink a node (and its subtree) from its parent.
    ///
    /// The node's tail run is not lost: it moves to the previous sibling's
    /// tail, or to the parent's text when the node was the first child.
    pub fn detach(&mut self, id: NodeId) {
        if self.parent(id).is_none() {
            return;
        }
        let (parent, prev, next, tail) = match self.get_mut(id) {
            Some(n) => (
                n.parent,
                n.prev_sibling,
                n.next_sibling,
                std::mem::take(&mut n.tail),
            ),
            None => return,
        };

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
            p.tail.append(&tail);
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = next;
            par.text.append(&tail);
        }

        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            doc: self,
            current: first,
        }
    }

    /// Pre-order traversal of `top` and everything below it.
    pub fn descendants(&self, top: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            top,
            next: top,
        }
    }

    /// Open/close edges of `top`'s subtree in document order: an element's
    /// text belongs at its `Open` edge, its tail right after its `Close` edge.
    pub fn traverse(&self, top: NodeId) -> Traverse<'_> {
        Traverse {
            doc: self,
            top,
            next: self.get(top).map(|_| Edge::Open(top)),
        }
    }

    /// Iterate from a node's parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            current: self.parent(id),
        }
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(Node::as_element)
    }

    /// Get element's local name (tag without namespace prefix).
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Find the first element in document order matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(self.root)
            .find(|&id| self.element(id).is_some_and(&predicate))
    }

    /// Find the first element with the given local name, ignoring namespaces.
    pub fn find_by_local_name(&self, name: &str) -> Option<NodeId> {
        self.find(|el| el.local_name() == name)
    }

    /// The outermost element, if any.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| self.element(id).is_some())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .doc
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Pre-order iterator bounded to a subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    top: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next;
        let node = self.doc.get(current)?;

        self.next = if node.first_child.is_some() {
            node.first_child
        } else {
            // Climb until a node with a following sibling, never leaving the subtree.
            let mut id = current;
            loop {
                if id == self.top {
                    break NodeId::NONE;
                }
                let Some(n) = self.doc.get(id) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_some() {
                    break n.next_sibling;
                }
                id = n.parent;
            }
        };
        Some(current)
    }
}

/// One step of a [`Document::traverse`] walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Open(NodeId),
    Close(NodeId),
}

/// Open/close iterator bounded to a subtree.
pub struct Traverse<'a> {
    doc: &'a Document,
    top: NodeId,
    next: Option<Edge>,
}

impl Iterator for Traverse<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = self.next?;
        self.next = match edge {
            Edge::Open(id) => match self.doc.get(id) {
                Some(n) if n.first_child.is_some() => Some(Edge::Open(n.first_child)),
                _ => Some(Edge::Close(id)),
            },
            Edge::Close(id) if id == self.top => None,
            Edge::Close(id) => self.doc.get(id).map(|n| {
                if n.next_sibling.is_some() {
                    Edge::Open(n.next_sibling)
                } else {
                    Edge::Close(n.parent)
                }
            }),
        };
        Some(edge)
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.doc.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(doc: &mut Document, name: &str) -> NodeId {
        doc.create_element(Element::new(name, &[]))
    }

    #[test]
    fn test_append_children() {
        let mut doc = Document::new();

        let parent = el(&mut doc, "div");
        let child1 = el(&mut doc, "p");
        let child2 = el(&mut doc, "p");

        doc.append(doc.root(), parent);
        doc.append(parent, child1);
        doc.append(parent, child2);

        let children: Vec<_> = doc.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
        assert_eq!(doc.parent(child2), parent);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut doc = Document::new();
        let parent = el(&mut doc, "div");
        let a = el(&mut doc, "p");
        let b = el(&mut doc, "p");
        doc.append(doc.root(), parent);
        doc.append(parent, a);
        doc.append(parent, b);

        let first = el(&mut doc, "span");
        doc.insert_before(a, first);
        let middle = el(&mut doc, "span");
        doc.insert_after(a, middle);
        let last = el(&mut doc, "span");
        doc.insert_after(b, last);

        let children: Vec<_> = doc.children(parent).collect();
        assert_eq!(children, vec![first, a, middle, b, last]);
        assert_eq!(doc.get(parent).unwrap().last_child, last);
    }

    #[test]
    fn test_detach_keeps_tail_text() {
        let mut doc = Document::new();
        let p = el(&mut doc, "p");
        let a = el(&mut doc, "span");
        let b = el(&mut doc, "span");
        doc.append(doc.root(), p);
        doc.append(p, a);
        doc.append(p, b);
        doc.get_mut(p).unwrap().text = TextRun::new("one ");
        doc.get_mut(a).unwrap().tail = TextRun::new("two ");
        doc.get_mut(b).unwrap().tail = TextRun::new("three");

        doc.detach(b);
        assert_eq!(doc.get(a).unwrap().tail.raw, "two three");
        assert_eq!(doc.get(p).unwrap().last_child, a);

        doc.detach(a);
        assert_eq!(doc.get(p).unwrap().text.raw, "one two three");
        assert!(doc.get(p).unwrap().first_child.is_none());
        assert!(doc.get(p).unwrap().last_child.is_none());
    }

    #[test]
    fn test_descendants_preorder_bounded() {
        let mut doc = Document::new();
        let body = el(&mut doc, "body");
        let p1 = el(&mut doc, "p");
        let em = el(&mut doc, "em");
        let p2 = el(&mut doc, "p");
        let after = el(&mut doc, "footer");
        doc.append(doc.root(), body);
        doc.append(doc.root(), after);
        doc.append(body, p1);
        doc.append(p1, em);
        doc.append(body, p2);

        let order: Vec<_> = doc.descendants(body).collect();
        assert_eq!(order, vec![body, p1, em, p2]);

        let ancestors: Vec<_> = doc.ancestors(em).collect();
        assert_eq!(ancestors, vec![p1, body, doc.root()]);

        let edges: Vec<_> = doc.traverse(body).collect();
        assert_eq!(
            edges,
            vec![
                Edge::Open(body),
                Edge::Open(p1),
                Edge::Open(em),
                Edge::Close(em),
                Edge::Close(p1),
                Edge::Open(p2),
                Edge::Close(p2),
                Edge::Close(body),
            ]
        );
    }

    #[test]
    fn test_local_name_ignores_prefix() {
        let mut doc = Document::new();
        let body = el(&mut doc, "html:body");
        doc.append(doc.root(), body);
        assert_eq!(doc.find_by_local_name("body"), Some(body));
        assert_eq!(doc.local_name(body), Some("body"));
    }

    #[test]
    fn test_new_element_escapes_attributes() {
        let element = Element::new("span", &[("id", "a\"b")]);
        assert_eq!(element.raw_tag, "span id=\"a&quot;b\"");
        assert_eq!(element.attr("id"), Some("a\"b"));
    }
}
