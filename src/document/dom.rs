//! Node-level helpers over the rcdom tree

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::format_tendril;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData};
use std::rc::Rc;

/// Returns the local name of an element node
pub fn get_node_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Returns true if `node` is an element with the given local name
pub fn is_element(node: &Handle, element_name: &str) -> bool {
    get_node_name(node).is_some_and(|name| name.eq_ignore_ascii_case(element_name))
}

/// Gets an attribute value
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Sets an attribute, adding it when missing; `None` removes it
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();

    match attr_value {
        Some(value) => {
            if let Some(attr) = attrs.iter_mut().find(|attr| &*attr.name.local == attr_name) {
                attr.value.clear();
                attr.value.push_slice(value);
            } else {
                attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", value),
                });
            }
        }
        None => attrs.retain(|attr| &*attr.name.local != attr_name),
    }
}

/// Removes an attribute if present
pub fn remove_node_attr(node: &Handle, attr_name: &str) {
    set_node_attr(node, attr_name, None);
}

/// Returns the parent of a node, leaving the parent link intact
pub fn get_parent_node(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Collects every element named `node_name` below `node`, in document order
pub fn find_nodes(node: &Handle, node_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_nodes(node, node_name, &mut found);
    found
}

fn collect_nodes(node: &Handle, node_name: &str, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child, node_name) {
            found.push(Rc::clone(child));
        }
        collect_nodes(child, node_name, found);
    }
}

/// Concatenated text of all descendant text nodes
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => collect_text(child, text),
            _ => {}
        }
    }
}
