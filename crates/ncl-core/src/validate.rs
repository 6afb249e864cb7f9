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

//! Structural validation of a document tree.

use crate::document::{Document, ElementData, NodeId};
use crate::kind::{ChildGroup, ElementKind};
use crate::reference::Reference;
use crate::traverse::post_order;
use std::collections::HashMap;

/// Result of validating a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub valid: bool,
    /// Warnings of the subtree, in document order.
    pub warnings: Vec<String>,
    /// Errors of the subtree, in document order.
    pub errors: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validate `node` and everything below it.
///
/// Every element is checked, even after the first failure. Diagnostics
/// already recorded on elements are reported together with the outcome.
pub fn validate(doc: &Document, node: NodeId) -> Validation {
    let mut subtree_valid: HashMap<NodeId, bool> = HashMap::new();
    for n in post_order(doc, node) {
        let children_valid = doc[n]
            .children()
            .iter()
            .all(|c| subtree_valid.get(c).copied().unwrap_or(true));
        subtree_valid.insert(n, element_valid(doc, n) && children_valid);
    }

    Validation {
        valid: subtree_valid.get(&node).copied().unwrap_or(false),
        warnings: doc.warnings(node),
        errors: doc.errors(node),
    }
}

impl Document {
    /// Validate from the root. A document without a root is invalid.
    pub fn validate(&self) -> Validation {
        match self.root() {
            Some(root) => validate(self, root),
            None => Validation::default(),
        }
    }
}

/// Rules that concern `node` alone.
fn element_valid(doc: &Document, node: NodeId) -> bool {
    use ElementData as D;
    use ElementKind as K;

    let element = &doc[node];
    let kind = element.kind();
    let has_id = element.id().is_some();
    let count = |group: ChildGroup| doc.children_in(node, group).count();

    let id_ok = !matches!(
        kind,
        K::Ncl
            | K::Rule
            | K::Descriptor
            | K::DescriptorSwitch
            | K::CausalConnector
            | K::Context
            | K::Media
            | K::Area
            | K::Switch
            | K::SwitchPort
            | K::Port
    ) || has_id;

    let own_ok = match element.data() {
        D::Rule {
            var,
            comparator,
            value,
        } => var.is_some() && comparator.is_some() && value.is_some(),
        D::DescriptorSwitch { .. } => {
            count(ChildGroup::Descriptors) > 0 && count(ChildGroup::BindRules) > 0
        }
        D::ConnectorBase | D::RuleBase | D::DescriptorBase => !element.children().is_empty(),
        D::Switch { refer, .. } => match refer {
            Some(reference) => doc.reference_id(reference) != element.id(),
            None => true,
        },
        D::SwitchPort => count(ChildGroup::Mappings) > 0,
        D::Mapping { component, .. } | D::Port { component, .. } => component.is_some(),
        D::Bind {
            role, component, ..
        } => role.is_some() && component.is_some(),
        D::BindRule { constituent, rule } => constituent.is_some() && rule.is_some(),
        D::LinkParam { name, value } => name.is_some() && value.is_some(),
        D::Link { xconnector } => {
            matches!(xconnector, Some(Reference::Resolved(_))) && count(ChildGroup::Binds) >= 2
        }
        _ => true,
    };

    id_ok && own_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use crate::reference::{resolve_references, RefField};
    use crate::value::{Comparator, Text};

    fn add(doc: &mut Document, parent: NodeId, element: Element) -> NodeId {
        let node = doc.insert(element);
        assert!(doc.add_child(parent, node));
        node
    }

    fn el(kind: ElementKind, id: &str) -> Element {
        Element::with_id(ElementData::empty(kind), id).unwrap()
    }

    fn anon(kind: ElementKind) -> Element {
        Element::new(ElementData::empty(kind))
    }

    fn root() -> (Document, NodeId) {
        let mut doc = Document::new();
        let ncl = doc.insert(el(ElementKind::Ncl, "doc"));
        doc.set_root(ncl);
        (doc, ncl)
    }

    #[test]
    fn test_document_without_root_is_invalid() {
        let doc = Document::new();
        assert!(!doc.validate().valid);
    }

    #[test]
    fn test_minimal_document_is_valid() {
        let (mut doc, ncl) = root();
        add(&mut doc, ncl, anon(ElementKind::Body));
        assert!(doc.validate().valid);
    }

    #[test]
    fn test_missing_id_invalidates_ancestors() {
        let (mut doc, ncl) = root();
        let body = add(&mut doc, ncl, anon(ElementKind::Body));
        let ctx = add(&mut doc, body, el(ElementKind::Context, "ctx"));
        add(&mut doc, ctx, anon(ElementKind::Media));

        assert!(!validate(&doc, ctx).valid);
        assert!(!validate(&doc, body).valid);
        assert!(!doc.validate().valid);
    }

    #[test]
    fn test_empty_base_is_invalid() {
        let (mut doc, ncl) = root();
        let head = add(&mut doc, ncl, anon(ElementKind::Head));
        let base = add(&mut doc, head, anon(ElementKind::RuleBase));
        assert!(!validate(&doc, base).valid);

        let mut rule = el(ElementKind::Rule, "r1");
        if let ElementData::Rule {
            var,
            comparator,
            value,
        } = rule.data_mut()
        {
            *var = Some(Text::new("lang").unwrap());
            *comparator = Some(Comparator::Eq);
            *value = Some(Text::new("en").unwrap());
        }
        add(&mut doc, base, rule);
        assert!(validate(&doc, base).valid);
    }

    #[test]
    fn test_rule_needs_all_attributes() {
        let (mut doc, ncl) = root();
        let head = add(&mut doc, ncl, anon(ElementKind::Head));
        let base = add(&mut doc, head, anon(ElementKind::RuleBase));
        let rule = add(&mut doc, base, el(ElementKind::Rule, "r1"));
        assert!(!validate(&doc, rule).valid);
    }

    #[test]
    fn test_switch_refer_to_itself_is_invalid() {
        let (mut doc, ncl) = root();
        let body = add(&mut doc, ncl, anon(ElementKind::Body));
        let sw = add(&mut doc, body, el(ElementKind::Switch, "sw"));
        doc[sw].set_refer("sw").unwrap();
        assert!(!validate(&doc, sw).valid);

        doc[sw].set_refer("other").unwrap();
        assert!(validate(&doc, sw).valid);
    }

    #[test]
    fn test_link_requires_resolved_connector_and_two_binds() {
        let (mut doc, ncl) = root();
        let head = add(&mut doc, ncl, anon(ElementKind::Head));
        let base = add(&mut doc, head, anon(ElementKind::ConnectorBase));
        add(&mut doc, base, el(ElementKind::CausalConnector, "c1"));
        let body = add(&mut doc, ncl, anon(ElementKind::Body));
        add(&mut doc, body, el(ElementKind::Media, "m1"));
        add(&mut doc, body, el(ElementKind::Media, "m2"));

        let link = doc.insert(el(ElementKind::Link, "l1"));
        doc[link].set_xconnector("c1").unwrap();
        for (role, component) in [("onBegin", "m1"), ("start", "m2")] {
            let mut bind = anon(ElementKind::Bind);
            if let ElementData::Bind { role: r, .. } = bind.data_mut() {
                *r = Some(Text::new(role).unwrap());
            }
            bind.set_reference(RefField::Component, component).unwrap();
            add(&mut doc, link, bind);
        }
        assert!(doc.add_child(body, link));

        assert!(!validate(&doc, link).valid, "pending connector is not resolved");
        resolve_references(&mut doc);
        assert!(validate(&doc, link).valid);
        assert!(doc.validate().valid);
    }

    #[test]
    fn test_unresolved_link_collects_warning() {
        let (mut doc, ncl) = root();
        let body = add(&mut doc, ncl, anon(ElementKind::Body));
        let link = add(&mut doc, body, anon(ElementKind::Link));
        doc[link].set_xconnector("c1").unwrap();
        resolve_references(&mut doc);

        let result = doc.validate();
        assert!(!result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("c1"));
    }

    #[test]
    fn test_descriptor_switch_needs_descriptor_and_bind_rule() {
        let (mut doc, ncl) = root();
        let head = add(&mut doc, ncl, anon(ElementKind::Head));
        let base = add(&mut doc, head, anon(ElementKind::DescriptorBase));
        let ds = add(&mut doc, base, el(ElementKind::DescriptorSwitch, "ds"));
        add(&mut doc, ds, el(ElementKind::Descriptor, "d1"));
        assert!(!validate(&doc, ds).valid);

        let mut bind_rule = anon(ElementKind::BindRule);
        bind_rule.set_reference(RefField::Constituent, "d1").unwrap();
        bind_rule.set_reference(RefField::Rule, "r1").unwrap();
        add(&mut doc, ds, bind_rule);
        assert!(validate(&doc, ds).valid);
    }

    #[test]
    fn test_errors_are_aggregated() {
        let (mut doc, ncl) = root();
        let body = add(&mut doc, ncl, anon(ElementKind::Body));
        let media = add(&mut doc, body, el(ElementKind::Media, "m"));
        doc[media].add_error("Invalid src");
        let result = doc.validate();
        assert!(result.valid);
        assert_eq!(result.errors, vec!["Invalid src".to_string()]);
    }
}
