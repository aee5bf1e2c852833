//! HTML fragment parsing and serialization.

use std::rc::Weak;

use html_escape::{encode_double_quoted_attribute, encode_text};
use kuchiki::{parse_html, traits::*, NodeRef};

use super::{document::DocumentInner, node::NodeKind, MemNode};
use crate::{backend::BackendNode, error::Error};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Parse `html` as the content of a body element.
pub(super) fn parse_fragment(html: &str, document: &Weak<DocumentInner>) -> Result<Vec<MemNode>, Error> {
    let parsed = parse_html().one(format!("<body>{}</body>", html));
    let body = parsed
        .select_first("body")
        .map_err(|_| Error::backend("The parsed fragment has no body"))?;
    let mut ret = vec![];
    for child in body.as_node().children() {
        if let Some(node) = convert(&child, document)? {
            ret.push(node);
        }
    }
    Ok(ret)
}

fn convert(source: &NodeRef, document: &Weak<DocumentInner>) -> Result<Option<MemNode>, Error> {
    if let Some(text) = source.as_text() {
        return Ok(Some(MemNode::new_text(&text.borrow(), document.clone())));
    }
    if let Some(comment) = source.as_comment() {
        return Ok(Some(MemNode::new_comment(&comment.borrow(), document.clone())));
    }
    let element = match source.as_element() {
        Some(x) => x,
        None => return Ok(None),
    };
    let node = MemNode::new(
        NodeKind::Element(element.name.local.to_string()),
        document.clone(),
    );
    for (name, attr) in element.attributes.borrow().map.iter() {
        node.set_parsed_attribute(&name.local, &attr.value);
    }
    let mut children = vec![];
    for child in source.children() {
        if let Some(x) = convert(&child, document)? {
            children.push(x);
        }
    }
    node.replace_children(children);
    Ok(Some(node))
}

/// Serialize the children of `node`.
pub(super) fn serialize_children(node: &MemNode) -> String {
    let mut output = String::new();
    for child in node.child_nodes() {
        serialize_node(&child, &mut output);
    }
    output
}

fn serialize_node(node: &MemNode, output: &mut String) {
    match node.kind() {
        NodeKind::Element(tag) => {
            output.push('<');
            output.push_str(tag);
            for (name, value) in node.attributes() {
                output.push(' ');
                output.push_str(&name);
                output.push_str("=\"");
                output.push_str(&encode_double_quoted_attribute(&value));
                output.push('"');
            }
            output.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                output.push_str(&node.text_content());
            } else {
                for child in node.child_nodes() {
                    serialize_node(&child, output);
                }
            }
            output.push_str("</");
            output.push_str(tag);
            output.push('>');
        }
        NodeKind::Text => {
            output.push_str(&encode_text(&node.data()));
        }
        NodeKind::Comment => {
            output.push_str("<!--");
            output.push_str(&node.data());
            output.push_str("-->");
        }
        NodeKind::Fragment => {
            for child in node.child_nodes() {
                serialize_node(&child, output);
            }
        }
    }
}
