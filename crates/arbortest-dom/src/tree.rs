//! Document tree: element and text nodes, parser, serializer.
//!
//! The supported document subset is elements (`<a>`, `<a/>`, `</a>`) and
//! text with the `lt`/`gt`/`amp` character entities. No attributes, comments
//! or processing instructions. Whitespace-only text runs between elements
//! are dropped.

use std::fmt::Write;

use crate::Error;
use crate::alloc::HeapStr;

/// Stable handle to a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    /// Element name; empty for text nodes and the root container.
    name: HeapStr,
    /// Text payload; empty for elements.
    value: HeapStr,
    children: Vec<usize>,
}

impl NodeData {
    fn container() -> Self {
        Self {
            name: HeapStr::empty(),
            value: HeapStr::empty(),
            children: Vec::new(),
        }
    }
}

/// An element/text tree whose string payloads live in hook-allocated memory.
///
/// Index 0 is the root container; it has no name and serializes as the
/// concatenation of its children, so parsed fragments round-trip.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// An empty document (just the root container). Never allocates through
    /// the hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::container()],
        }
    }

    /// Handle to the root container.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Read-only view of the root container.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node { doc: self, id: 0 }
    }

    /// Read-only view of `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node {
            doc: self,
            id: id.0,
        }
    }

    /// Append an element child under `parent`.
    pub fn append_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        let name = HeapStr::new(name)?;
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            name,
            value: HeapStr::empty(),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(NodeId(id))
    }

    /// Append a text child under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, Error> {
        let value = HeapStr::new(text)?;
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            name: HeapStr::empty(),
            value,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(NodeId(id))
    }

    /// Replace the text payload of `id`.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), Error> {
        self.nodes[id.0].value = HeapStr::new(value)?;
        Ok(())
    }

    /// Parse a document fragment in the supported subset.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut doc = Document::new();
        let bytes = text.as_bytes();
        let mut stack: Vec<usize> = vec![0];
        let mut pos = 0;

        while pos < bytes.len() {
            if bytes[pos] == b'<' {
                if bytes.get(pos + 1) == Some(&b'/') {
                    pos = doc.parse_close_tag(text, pos, &mut stack)?;
                } else {
                    pos = doc.parse_open_tag(text, pos, &mut stack)?;
                }
            } else {
                let start = pos;
                while pos < bytes.len() && bytes[pos] != b'<' {
                    pos += 1;
                }
                let raw = &text[start..pos];
                if !raw.trim().is_empty() {
                    let unescaped = unescape(raw, start)?;
                    let parent = NodeId(*stack.last().unwrap_or(&0));
                    doc.append_text(parent, &unescaped)?;
                }
            }
        }

        if stack.len() > 1 {
            return Err(Error::Parse {
                offset: bytes.len(),
                reason: "unexpected end of input inside element",
            });
        }
        Ok(doc)
    }

    fn parse_open_tag(
        &mut self,
        text: &str,
        open: usize,
        stack: &mut Vec<usize>,
    ) -> Result<usize, Error> {
        let bytes = text.as_bytes();
        let name_start = open + 1;
        let mut pos = name_start;
        while pos < bytes.len() && is_name_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            return Err(Error::Parse {
                offset: name_start,
                reason: "expected element name",
            });
        }
        let name = &text[name_start..pos];
        let parent = NodeId(*stack.last().unwrap_or(&0));

        match (bytes.get(pos), bytes.get(pos + 1)) {
            (Some(&b'/'), Some(&b'>')) => {
                self.append_child(parent, name)?;
                Ok(pos + 2)
            }
            (Some(&b'>'), _) => {
                let id = self.append_child(parent, name)?;
                stack.push(id.0);
                Ok(pos + 1)
            }
            _ => Err(Error::Parse {
                offset: pos,
                reason: "unsupported markup in element tag",
            }),
        }
    }

    fn parse_close_tag(
        &mut self,
        text: &str,
        open: usize,
        stack: &mut Vec<usize>,
    ) -> Result<usize, Error> {
        let bytes = text.as_bytes();
        let name_start = open + 2;
        let Some(rel) = bytes[name_start..].iter().position(|&b| b == b'>') else {
            return Err(Error::Parse {
                offset: open,
                reason: "unterminated close tag",
            });
        };
        let name = &text[name_start..name_start + rel];

        if stack.len() <= 1 {
            return Err(Error::Parse {
                offset: open,
                reason: "close tag without open element",
            });
        }
        let top = stack.pop().unwrap_or(0);
        if self.nodes[top].name.as_str() != name {
            return Err(Error::Parse {
                offset: name_start,
                reason: "mismatched close tag",
            });
        }
        Ok(name_start + rel + 1)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

fn unescape(raw: &str, offset: usize) -> Result<String, Error> {
    if !raw.contains('&') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let replacement = if tail.starts_with("&lt;") {
            ('<', 4)
        } else if tail.starts_with("&gt;") {
            ('>', 4)
        } else if tail.starts_with("&amp;") {
            ('&', 5)
        } else {
            return Err(Error::Parse {
                offset,
                reason: "invalid character entity",
            });
        };
        out.push(replacement.0);
        rest = &tail[replacement.1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Serialization style for [`Node::serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// No inter-element whitespace; fragments round-trip byte-for-byte.
    #[default]
    Raw,
    /// One element per line, tab-indented, trailing newline per line.
    Pretty,
}

/// Read-only view of a node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: usize,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id]
    }

    /// Handle usable with the document's mutation API.
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId(self.id)
    }

    /// Element name; empty for text nodes and the root container.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.data().name.as_str()
    }

    /// Text payload; empty for elements.
    #[must_use]
    pub fn value(&self) -> &'a str {
        self.data().value.as_str()
    }

    /// True for text nodes (non-root nodes without a name).
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.id != 0 && self.data().name.as_str().is_empty()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Node<'a>> {
        self.children().next()
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + use<'a> {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { doc, id })
    }

    /// First element child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.name() == name)
    }

    /// Value of the first text child; empty when there is none.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.children()
            .find(|c| c.is_text())
            .map_or("", |c| c.value())
    }

    /// Serialize the subtree rooted at this node.
    #[must_use]
    pub fn serialize(&self, format: Format) -> String {
        let mut out = String::new();
        match format {
            Format::Raw => self.write_raw(&mut out),
            Format::Pretty => self.write_pretty(&mut out, 0),
        }
        out
    }

    fn write_raw(&self, out: &mut String) {
        if self.id == 0 {
            for child in self.children() {
                child.write_raw(out);
            }
            return;
        }
        let data = self.data();
        if self.is_text() {
            push_escaped(out, data.value.as_str());
            return;
        }
        let name = data.name.as_str();
        if data.children.is_empty() {
            let _ = write!(out, "<{name}/>");
        } else {
            let _ = write!(out, "<{name}>");
            for child in self.children() {
                child.write_raw(out);
            }
            let _ = write!(out, "</{name}>");
        }
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        if self.id == 0 {
            for child in self.children() {
                child.write_pretty(out, depth);
            }
            return;
        }
        let indent = "\t".repeat(depth);
        if self.is_text() {
            out.push_str(&indent);
            push_escaped(out, self.value());
            out.push('\n');
            return;
        }
        let name = self.name();
        let data = self.data();
        if data.children.is_empty() {
            let _ = writeln!(out, "{indent}<{name}/>");
        } else if self.children().all(|c| c.is_text()) {
            let _ = write!(out, "{indent}<{name}>");
            for child in self.children() {
                push_escaped(out, child.value());
            }
            let _ = writeln!(out, "</{name}>");
        } else {
            let _ = writeln!(out, "{indent}<{name}>");
            for child in self.children() {
                child.write_pretty(out, depth + 1);
            }
            let _ = writeln!(out, "{indent}</{name}>");
        }
    }
}
