// Dweve NCL - Nested Context Language document model
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic traversal for NCL documents.
//!
//! The visitor pattern separates walking the element tree from what is done
//! at each element. Analysis passes implement [`ElementVisitor`]; the
//! [`traverse`] function handles the recursive structure.
//!
//! # Example
//!
//! ```text
//! use ncl_core::traverse::{traverse, StatsCollector};
//!
//! let mut stats = StatsCollector::default();
//! traverse(&doc, &mut stats)?;
//! println!("{} elements, depth {}", stats.element_count, stats.max_depth);
//! ```

use crate::document::{Document, NodeId};
use crate::kind::ElementKind;
use std::collections::BTreeMap;

/// Context provided to visitors during traversal.
#[derive(Debug, Clone)]
pub struct VisitorContext<'a> {
    /// Current nesting depth (0 = root element).
    pub depth: usize,
    /// Tag names from the root down to the parent of the current element.
    pub path: Vec<&'static str>,
    /// Reference to the document being traversed.
    pub document: &'a Document,
}

impl<'a> VisitorContext<'a> {
    /// Create a new context for the root level.
    pub fn new(document: &'a Document) -> Self {
        Self {
            depth: 0,
            path: Vec::new(),
            document,
        }
    }

    /// Create a child context with incremented depth.
    pub fn child(&self, tag: &'static str) -> Self {
        let mut path = self.path.clone();
        path.push(tag);
        Self {
            depth: self.depth + 1,
            path,
            document: self.document,
        }
    }

    /// Get the current path as a string (for diagnostics).
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path.join("/")
        }
    }
}

/// Trait for visiting the elements of an NCL document.
///
/// Both methods default to doing nothing.
pub trait ElementVisitor {
    /// Error type returned by visitor methods.
    type Error;

    /// Called before the children of `node` are visited.
    fn begin_element(&mut self, _node: NodeId, _ctx: &VisitorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after the children of `node` are visited.
    fn end_element(&mut self, _node: NodeId, _ctx: &VisitorContext) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Traverse the document from its root. Does nothing without a root.
pub fn traverse<V: ElementVisitor>(doc: &Document, visitor: &mut V) -> Result<(), V::Error> {
    match doc.root() {
        Some(root) => traverse_from(doc, root, visitor),
        None => Ok(()),
    }
}

/// Traverse the subtree rooted at `start`.
pub fn traverse_from<V: ElementVisitor>(
    doc: &Document,
    start: NodeId,
    visitor: &mut V,
) -> Result<(), V::Error> {
    let ctx = VisitorContext::new(doc);
    traverse_element(start, visitor, &ctx)
}

fn traverse_element<V: ElementVisitor>(
    node: NodeId,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> Result<(), V::Error> {
    visitor.begin_element(node, ctx)?;

    let element = &ctx.document[node];
    if !element.children().is_empty() {
        let child_ctx = ctx.child(element.kind().tag());
        for &child in element.children() {
            traverse_element(child, visitor, &child_ctx)?;
        }
    }

    visitor.end_element(node, ctx)
}

/// `start` and its descendants, parents before children.
pub fn pre_order(doc: &Document, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(doc[node].children().iter().rev());
    }
    out
}

/// `start` and its descendants, children before parents.
pub fn post_order(doc: &Document, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![(start, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            out.push(node);
        } else {
            stack.push((node, true));
            stack.extend(doc[node].children().iter().rev().map(|&c| (c, false)));
        }
    }
    out
}

/// Statistics collector visitor for testing and analysis.
#[derive(Debug, Default)]
pub struct StatsCollector {
    /// Number of elements visited.
    pub element_count: usize,
    /// Elements visited per kind.
    pub per_kind: BTreeMap<ElementKind, usize>,
    /// Maximum depth reached.
    pub max_depth: usize,
}

impl ElementVisitor for StatsCollector {
    type Error = std::convert::Infallible;

    fn begin_element(&mut self, node: NodeId, ctx: &VisitorContext) -> Result<(), Self::Error> {
        self.element_count += 1;
        *self.per_kind.entry(ctx.document[node].kind()).or_default() += 1;
        self.max_depth = self.max_depth.max(ctx.depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, ElementData};

    fn element(doc: &mut Document, kind: ElementKind, id: &str) -> NodeId {
        doc.insert(Element::with_id(ElementData::empty(kind), id).unwrap())
    }

    fn sample() -> (Document, [NodeId; 5]) {
        let mut doc = Document::new();
        let ncl = element(&mut doc, ElementKind::Ncl, "doc");
        let body = element(&mut doc, ElementKind::Body, "body");
        let sw = element(&mut doc, ElementKind::Switch, "sw");
        let m1 = element(&mut doc, ElementKind::Media, "m1");
        let m2 = element(&mut doc, ElementKind::Media, "m2");
        doc.set_root(ncl);
        assert!(doc.add_child(ncl, body));
        assert!(doc.add_child(body, sw));
        assert!(doc.add_child(sw, m2));
        assert!(doc.add_child(sw, m1));
        (doc, [ncl, body, sw, m1, m2])
    }

    #[test]
    fn test_traverse_empty_document() {
        let doc = Document::new();
        let mut stats = StatsCollector::default();
        traverse(&doc, &mut stats).unwrap();
        assert_eq!(stats.element_count, 0);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_traverse_counts_kinds() {
        let (doc, _) = sample();
        let mut stats = StatsCollector::default();
        traverse(&doc, &mut stats).unwrap();
        assert_eq!(stats.element_count, 5);
        assert_eq!(stats.per_kind[&ElementKind::Media], 2);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_pre_and_post_order() {
        let (doc, [ncl, body, sw, m1, m2]) = sample();
        assert_eq!(pre_order(&doc, ncl), vec![ncl, body, sw, m1, m2]);
        assert_eq!(post_order(&doc, ncl), vec![m1, m2, sw, body, ncl]);
    }

    #[test]
    fn test_context_path() {
        struct PathRecorder(Vec<String>);

        impl ElementVisitor for PathRecorder {
            type Error = ();

            fn begin_element(&mut self, _node: NodeId, ctx: &VisitorContext) -> Result<(), ()> {
                self.0.push(ctx.path_string());
                Ok(())
            }
        }

        let (doc, _) = sample();
        let mut recorder = PathRecorder(Vec::new());
        traverse(&doc, &mut recorder).unwrap();
        assert_eq!(recorder.0[0], "root");
        assert_eq!(recorder.0[3], "ncl/body/switch");
    }

    #[test]
    fn test_visitor_error_stops_traversal() {
        struct FailOnMedia(usize);

        impl ElementVisitor for FailOnMedia {
            type Error = String;

            fn begin_element(&mut self, node: NodeId, ctx: &VisitorContext) -> Result<(), String> {
                self.0 += 1;
                if ctx.document[node].kind() == ElementKind::Media {
                    return Err("media".to_string());
                }
                Ok(())
            }
        }

        let (doc, _) = sample();
        let mut visitor = FailOnMedia(0);
        assert_eq!(traverse(&doc, &mut visitor), Err("media".to_string()));
        assert_eq!(visitor.0, 4);
    }
}
