//! Build a [`Document`] from XHTML bytes with quick-xml.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use super::arena::{Attribute, Document, Element, NodeId, TextRun};
use crate::error::{Error, Result};
use crate::util::{decode_text, extract_xml_encoding};

/// Parse raw content-document bytes into a tree.
///
/// The XML declaration and doctype of the source are not kept; the writer
/// regenerates both.
pub fn parse(bytes: &[u8]) -> Result<Document> {
    let content = decode_text(bytes, extract_xml_encoding(bytes));
    parse_str(&content)
}

/// Parse an already decoded document.
pub fn parse_str(content: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let element = element_from(&e, false)?;
                builder.open(element)?;
            }
            Event::Empty(e) => {
                let element = element_from(&e, true)?;
                builder.leaf(element)?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(e) => {
                let s = utf8(&e)?;
                builder.text(s, s)?;
            }
            Event::GeneralRef(e) => {
                let name = utf8(&e)?;
                let raw = format!("&{name};");
                builder.text(&raw, &resolve_reference(name))?;
            }
            Event::CData(e) => {
                let s = utf8(&e)?;
                builder.text(&format!("<![CDATA[{s}]]>"), s)?;
            }
            Event::Comment(e) => {
                let body = utf8(&e)?.to_string();
                builder.misc(|doc| doc.create_comment(body));
            }
            Event::PI(e) => {
                let body = utf8(&e)?.to_string();
                builder.misc(|doc| doc.create_pi(body));
            }
            Event::Eof => break,
            // Declaration and doctype are regenerated on output.
            _ => {}
        }
    }

    builder.finish()
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::MalformedMarkup(e.to_string()))
}

/// Decoded text for an entity or character reference.
///
/// Named entities beyond the XML predefined set (`&nbsp;` and friends) are
/// kept verbatim in the raw run and count as a word separator.
fn resolve_reference(name: &str) -> String {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse().ok(),
        };
        return code
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
    }
    resolve_predefined_entity(name)
        .unwrap_or(" ")
        .to_string()
}

fn element_from(start: &BytesStart<'_>, self_closing: bool) -> Result<Element> {
    let raw_tag = utf8(start)?.to_string();
    let name = utf8(start.name().as_ref())?.to_string();

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::MalformedMarkup(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let raw_value = utf8(&attr.value)?;
        let value = unescape(raw_value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw_value.to_string());
        attrs.push(Attribute { name: key, value });
    }

    Ok(Element {
        name,
        attrs,
        raw_tag,
        self_closing,
    })
}

/// Incremental tree construction following the text/tail model.
struct TreeBuilder {
    doc: Document,
    /// Open elements, innermost last.
    stack: Vec<NodeId>,
    seen_root: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            stack: Vec::new(),
            seen_root: false,
        }
    }

    fn current_parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.doc.root())
    }

    fn attach(&mut self, element: Element) -> Result<NodeId> {
        if self.stack.is_empty() {
            if self.seen_root {
                return Err(Error::MalformedMarkup(format!(
                    "second root element <{}>",
                    element.name
                )));
            }
            self.seen_root = true;
        }
        let parent = self.current_parent();
        let id = self.doc.create_element(element);
        self.doc.append(parent, id);
        Ok(id)
    }

    fn open(&mut self, element: Element) -> Result<()> {
        let id = self.attach(element)?;
        self.stack.push(id);
        Ok(())
    }

    fn leaf(&mut self, element: Element) -> Result<()> {
        self.attach(element).map(|_| ())
    }

    fn close(&mut self) -> Result<()> {
        // quick-xml has already checked that the end name matches.
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::MalformedMarkup("unexpected end tag".to_string()))
    }

    /// Character data goes to the parent's text when it has no children yet,
    /// otherwise to the last child's tail.
    fn text(&mut self, raw: &str, plain: &str) -> Result<()> {
        if self.stack.is_empty() {
            if plain.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::MalformedMarkup(
                "text outside the root element".to_string(),
            ));
        }
        let parent = self.current_parent();
        let last = self
            .doc
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);
        let target = if last.is_some() { last } else { parent };
        if let Some(node) = self.doc.get_mut(target) {
            let run: &mut TextRun = if last.is_some() {
                &mut node.tail
            } else {
                &mut node.text
            };
            run.push(raw, plain);
        }
        Ok(())
    }

    /// Comments and processing instructions, in or outside the root element.
    fn misc<F>(&mut self, create: F)
    where
        F: FnOnce(&mut Document) -> NodeId,
    {
        let parent = self.current_parent();
        let id = create(&mut self.doc);
        self.doc.append(parent, id);
    }

    fn finish(self) -> Result<Document> {
        if let Some(&open) = self.stack.last() {
            let name = self
                .doc
                .element(open)
                .map(|el| el.name.clone())
                .unwrap_or_default();
            return Err(Error::MalformedMarkup(format!("unclosed element <{name}>")));
        }
        if !self.seen_root {
            return Err(Error::MalformedMarkup("no root element".to_string()));
        }
        Ok(self.doc)
    }
}
