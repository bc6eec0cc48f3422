// src/core/walker.rs
use crate::core::dom::{self, tag_name};
use crate::core::resolver::DictionaryResolver;
use crate::core::types::Resolution;
use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements whose text children are code, not UI.
const SKIP_PARENTS: [&str; 2] = ["script", "style"];

/// What a single pass did. Misses are in visiting order and may repeat.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkReport {
    pub visited: usize,
    pub replaced_text: usize,
    pub replaced_placeholders: usize,
    pub misses: Vec<String>,
}

impl WalkReport {
    pub fn replaced(&self) -> usize {
        self.replaced_text + self.replaced_placeholders
    }
}

pub struct DomWalker<'r, 'd> {
    resolver: &'r DictionaryResolver<'d>,
}

impl<'r, 'd> DomWalker<'r, 'd> {
    pub fn new(resolver: &'r DictionaryResolver<'d>) -> Self {
        Self { resolver }
    }

    /// One depth-first pre-order pass from `root`, rewriting in place.
    pub fn walk(&self, root: &Handle) -> WalkReport {
        let mut report = WalkReport::default();
        self.visit(root, None, &mut report);
        report
    }

    fn visit(&self, node: &Handle, parent_tag: Option<&str>, report: &mut WalkReport) {
        report.visited += 1;

        match node.data {
            NodeData::Text { ref contents } => {
                if parent_tag.is_some_and(|tag| SKIP_PARENTS.contains(&tag)) {
                    return;
                }
                let original = contents.borrow().to_string();
                if let Some(rewritten) = self.rewrite_text(&original, report) {
                    *contents.borrow_mut() = StrTendril::from_slice(&rewritten);
                    report.replaced_text += 1;
                }
                return;
            }
            NodeData::Element { ref name, .. } if &*name.local == "input" => {
                self.rewrite_placeholder(node, report);
            }
            _ => {}
        }

        // Snapshot so the pass never observes its own structural edits.
        let children: Vec<Handle> = node.children.borrow().clone();
        let tag = tag_name(node);
        for child in &children {
            self.visit(child, tag, report);
        }
    }

    /// Returns the new node text, keeping the original leading and trailing
    /// whitespace around the translated core. `None` means leave it alone.
    fn rewrite_text(&self, original: &str, report: &mut WalkReport) -> Option<String> {
        let core = original.trim();
        if core.is_empty() {
            return None;
        }
        match self.resolver.resolve(core) {
            Resolution::Translated(translated) => {
                let leading = &original[..original.len() - original.trim_start().len()];
                let trailing = &original[original.trim_end().len()..];
                let rewritten = format!("{leading}{translated}{trailing}");
                (rewritten != original).then_some(rewritten)
            }
            Resolution::Unmatched { key } => {
                report.misses.push(key);
                None
            }
        }
    }

    fn rewrite_placeholder(&self, input: &Handle, report: &mut WalkReport) {
        let Some(placeholder) = dom::get_attr(input, "placeholder") else {
            return;
        };
        let trimmed = placeholder.trim();
        if trimmed.is_empty() {
            return;
        }
        match self.resolver.resolve(trimmed) {
            Resolution::Translated(translated) => {
                if translated != placeholder {
                    dom::set_attr(input, "placeholder", &translated);
                    report.replaced_placeholders += 1;
                }
            }
            Resolution::Unmatched { key } => report.misses.push(key),
        }
    }
}

/// Tells browser-side translators to keep out and declares the page language.
pub fn mark_document(dom: &RcDom) {
    if let Some(html) = dom::find_element(&dom.document, "html") {
        dom::set_attr(&html, "translate", "no");
        dom::set_attr(&html, "lang", "zh_cn");
    }
}
