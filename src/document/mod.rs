//! In-memory page document
//!
//! A `PageDocument` owns the parsed html5ever tree for one clone. Passes get
//! `&PageDocument` and mutate nodes through the helpers here; nothing keeps a
//! node handle after its pass returns.
//!
//! The tree is reference counted without atomics, so a document stays on the
//! task that parsed it.

mod dom;

pub use dom::{
    find_nodes, get_node_attr, get_node_name, get_parent_node, is_element, remove_node_attr,
    set_node_attr, text_content,
};

use html5ever::interface::{Attribute, NodeOrText, QualName, TreeSink};
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

/// A parsed, mutable HTML document
pub struct PageDocument {
    dom: RcDom,
}

impl PageDocument {
    /// Parses an HTML string
    ///
    /// Parsing never fails: malformed markup is repaired the way browsers do,
    /// and `<html>`, `<head>` and `<body>` always exist afterwards.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// Every element with the given name, in document order
    pub fn elements(&self, name: &str) -> Vec<Handle> {
        find_nodes(&self.dom.document, name)
    }

    /// The `<head>` element
    pub fn head(&self) -> Option<Handle> {
        self.elements("head").into_iter().next()
    }

    /// Text of the first `<title>`, trimmed; `None` when missing or blank
    pub fn title(&self) -> Option<String> {
        self.elements("title")
            .first()
            .map(|title| text_content(title).trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Creates a detached element
    pub fn create_element(&self, name: &str, attrs: &[(&str, &str)]) -> Handle {
        let attrs = attrs
            .iter()
            .map(|(key, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*key)),
                value: format_tendril!("{}", value),
            })
            .collect();

        create_element(
            &self.dom,
            QualName::new(None, ns!(html), LocalName::from(name)),
            attrs,
        )
    }

    /// Creates a detached element holding a single text node
    ///
    /// Used for `<style>` and `<script>`, whose text is serialized verbatim.
    pub fn create_text_element(&self, name: &str, attrs: &[(&str, &str)], text: &str) -> Handle {
        let element = self.create_element(name, attrs);
        self.set_text(&element, text);
        element
    }

    /// Replaces all children of `node` with one text node
    pub fn set_text(&self, node: &Handle, text: &str) {
        let children: Vec<Handle> = node.children.borrow().clone();
        for child in &children {
            self.dom.remove_from_parent(child);
        }
        if !text.is_empty() {
            self.dom
                .append(node, NodeOrText::AppendText(StrTendril::from(text)));
        }
    }

    /// Inserts `node` as the first child of `<head>`
    ///
    /// Returns false when the document has no head.
    pub fn prepend_to_head(&self, node: Handle) -> bool {
        let Some(head) = self.head() else {
            return false;
        };

        let first_child = head.children.borrow().first().cloned();
        match first_child {
            Some(first) => self
                .dom
                .append_before_sibling(&first, NodeOrText::AppendNode(node)),
            None => self.dom.append(&head, NodeOrText::AppendNode(node)),
        }
        true
    }

    /// Puts `replacement` where `target` is and detaches `target`
    ///
    /// Returns false when `target` is not attached to the tree.
    pub fn replace_node(&self, target: &Handle, replacement: Handle) -> bool {
        if get_parent_node(target).is_none() {
            return false;
        }
        self.dom
            .append_before_sibling(target, NodeOrText::AppendNode(replacement));
        self.dom.remove_from_parent(target);
        true
    }

    /// Serializes the whole document back to HTML
    pub fn serialize(&self) -> std::io::Result<String> {
        let mut buf: Vec<u8> = Vec::new();
        let serializable: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut buf, &serializable, SerializeOpts::default())?;
        Ok(String::from_utf8(buf)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
