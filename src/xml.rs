use quick_xml::events::{BytesStart, Event};
use quick_xml::{Error as XmlError, Reader};

use crate::error::{ErrorKind, Result};
use crate::failed;

/// A single element of a normalized xml tree.
///
/// Tag and attribute names have their namespace prefix stripped and their
/// first character lower cased, so `a:ErrorCode` and `ErrorCode` are both
/// addressed as `errorCode`. Attributes are merged into the owning element
/// as leaf children.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    name: String,
    value: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub(crate) fn branch<N: Into<String>, C: IntoIterator<Item = Node>>(
        name: N,
        children: C,
    ) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: children.into_iter().collect(),
        }
    }

    pub(crate) fn leaf<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The first child with the given normalized name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Every child with the given normalized name, in document order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Walks a fixed path of child names starting at this node.
    pub fn descend(&self, path: &[&str]) -> Option<&Node> {
        let mut node = self;

        for name in path {
            node = node.child(name)?;
        }

        Some(node)
    }
}

/// Strips any namespace prefix from a raw tag or attribute name and lower
/// cases the first character of what remains. Applying it twice gives the
/// same result.
pub(crate) fn normalize_name(raw: &str) -> String {
    let bare = raw.rsplit(':').next().unwrap_or(raw);

    let mut chars = bare.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn open_node(start: &BytesStart) -> Node {
    let name = normalize_name(&String::from_utf8_lossy(start.name().as_ref()));

    let mut node = Node::branch(name, Vec::new());

    for attribute in start.attributes().flatten() {
        let name = normalize_name(&String::from_utf8_lossy(attribute.key.as_ref()));
        let value = String::from_utf8_lossy(&attribute.value).into_owned();

        node.children.push(Node::leaf(name, value));
    }

    node
}

fn close_node(node: Node, stack: &mut Vec<Node>, root: &mut Option<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// Parses raw xml text into a normalized tree and returns the root element.
pub fn parse<R: AsRef<str>>(raw: R) -> Result<Node> {
    let mut reader = Reader::from_str(raw.as_ref());
    reader.trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(open_node(&start));
            }
            Event::Empty(start) => {
                close_node(open_node(&start), &mut stack, &mut root);
            }
            Event::Text(text) => {
                let content = text.unescape()?.to_string();

                if let Some(node) = stack.last_mut() {
                    if !content.is_empty() {
                        node.value = Some(content);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.value = Some(String::from_utf8_lossy(&data).into_owned());
                }
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    close_node(node, &mut stack, &mut root);
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if !stack.is_empty() {
        failed!(
            ErrorKind::Parse(XmlError::UnexpectedEof("unclosed element".into())),
            "Response xml ended before every element was closed"
        );
    }

    match root {
        Some(root) => Ok(root),
        None => failed!(
            ErrorKind::Parse(XmlError::UnexpectedEof("no root element".into())),
            "Response xml did not contain a root element"
        ),
    }
}
