// src/core/dom.rs
//! Thin helpers over the `markup5ever_rcdom` tree: parse, serialize, find,
//! attribute access and node construction.

use crate::error::Result;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

pub fn serialize_document(dom: &RcDom) -> Result<String> {
    let mut out = Vec::new();
    let handle: SerializableHandle = dom.document.clone().into();
    serialize(&mut out, &handle, SerializeOpts::default())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parses an HTML snippet and detaches its top-level body nodes, ready to be
/// appended elsewhere.
pub fn parse_fragment(html: &str) -> Vec<Handle> {
    let dom = parse_html(html);
    let body = document_body(&dom);
    let nodes = body.children.take();
    for node in &nodes {
        node.parent.set(None);
    }
    nodes
}

/// Lower-case local name of an element node.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// First element named `tag` in depth-first pre-order, `root` included.
pub fn find_element(root: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(root) == Some(tag) {
        return Some(root.clone());
    }
    root.children.borrow().iter().find_map(|child| find_element(child, tag))
}

/// Walk root: `<body>`, or the document itself for body-less trees.
pub fn document_body(dom: &RcDom) -> Handle {
    find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone())
}

pub fn get_attr(node: &Handle, attr: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Overwrites or adds an attribute. No-op on non-element nodes.
pub fn set_attr(node: &Handle, attr: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == attr) {
            Some(existing) => existing.value = StrTendril::from_slice(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(attr)),
                value: StrTendril::from_slice(value),
            }),
        }
    }
}

pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text { contents: RefCell::new(StrTendril::from_slice(text)) })
}

pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_finds_body_and_serializes() {
        let dom = parse_html("<p>Chaos Orb</p>");
        let body = document_body(&dom);
        assert_eq!(tag_name(&body), Some("body"));
        let html = serialize_document(&dom).unwrap();
        assert!(html.contains("<p>Chaos Orb</p>"));
    }

    #[test]
    fn set_attr_overwrites_or_appends() {
        let input = create_element("input", &[("placeholder", "Search")]);
        set_attr(&input, "placeholder", "搜索");
        set_attr(&input, "lang", "zh_cn");
        assert_eq!(get_attr(&input, "placeholder").as_deref(), Some("搜索"));
        assert_eq!(get_attr(&input, "lang").as_deref(), Some("zh_cn"));
    }

    #[test]
    fn appended_nodes_show_up_in_text() {
        let dom = parse_html("<div id=root></div>");
        let root = find_element(&dom.document, "div").unwrap();
        append_child(&root, create_text("Divine Orb"));
        assert_eq!(text_content(&root), "Divine Orb");
    }

    #[test]
    fn fragment_nodes_move_between_documents() {
        let dom = parse_html("<main></main>");
        let main = find_element(&dom.document, "main").unwrap();
        for node in parse_fragment("<li>Chaos Orb</li><li>Divine Orb</li>") {
            append_child(&main, node);
        }
        assert_eq!(main.children.borrow().len(), 2);
        assert_eq!(text_content(&main), "Chaos OrbDivine Orb");
    }
}
