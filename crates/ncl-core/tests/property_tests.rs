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

//! Property-based tests for identifiers, child ordering and resolution.

use ncl_core::{
    resolve_references, ChildGroup, Document, Element, ElementData, ElementKind, Identifier,
    NclErrorKind, NodeId, RefField,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn element(kind: ElementKind, id: &str) -> Element {
    Element::with_id(ElementData::empty(kind), id).unwrap()
}

/// `ncl > body > switch`, returning the switch.
fn switch_in_body(doc: &mut Document) -> NodeId {
    let ncl = doc.insert(element(ElementKind::Ncl, "doc"));
    doc.set_root(ncl);
    let body = doc.insert(Element::new(ElementData::empty(ElementKind::Body)));
    assert!(doc.add_child(ncl, body));
    let sw = doc.insert(element(ElementKind::Switch, "sw"));
    assert!(doc.add_child(body, sw));
    sw
}

fn link_with(doc: &mut Document, connector: &str, binds: usize) -> NodeId {
    let link = doc.insert(Element::new(ElementData::empty(ElementKind::Link)));
    doc[link].set_xconnector(connector).unwrap();
    for i in 0..binds {
        let mut bind = Element::new(ElementData::empty(ElementKind::Bind));
        bind.set_attribute("role", &format!("role{}", i)).unwrap();
        bind.set_reference(RefField::Component, "m").unwrap();
        let bind = doc.insert(bind);
        assert!(doc.add_child(link, bind));
    }
    link
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: identifiers following the grammar are accepted unchanged.
    #[test]
    fn prop_valid_identifier_roundtrips(id in "[a-zA-Z_][a-zA-Z0-9_.-]{0,24}") {
        let parsed = Identifier::new(id.clone());
        prop_assert!(parsed.is_ok());
        let element = Element::with_id(ElementData::empty(ElementKind::Media), &id).unwrap();
        prop_assert_eq!(element.id().map(Identifier::as_str), Some(id.as_str()));
    }

    /// Property: identifiers starting with a digit are rejected.
    #[test]
    fn prop_leading_digit_rejected(id in "[0-9][a-zA-Z0-9_]{0,12}") {
        let err = Element::with_id(ElementData::empty(ElementKind::Media), &id).unwrap_err();
        prop_assert_eq!(err.kind, NclErrorKind::InvalidIdentifier);
    }

    /// Property: identifiers containing a disallowed character are rejected.
    #[test]
    fn prop_disallowed_char_rejected(
        head in "[a-z]{1,6}",
        bad in "[ #@/:;!]",
        tail in "[a-z]{0,6}"
    ) {
        let id = format!("{}{}{}", head, bad, tail);
        let err = Identifier::new(id).unwrap_err();
        prop_assert_eq!(err.kind, NclErrorKind::InvalidIdentifier);
    }

    /// Property: children come out sorted by id whatever the insertion order,
    /// and duplicates are rejected.
    #[test]
    fn prop_children_sorted_and_unique(ids in prop::collection::vec("[a-z]{1,3}", 1..20)) {
        let mut doc = Document::new();
        let sw = switch_in_body(&mut doc);
        let mut seen = BTreeSet::new();
        for id in &ids {
            let node = doc.insert(element(ElementKind::Media, id));
            prop_assert_eq!(doc.add_child(sw, node), seen.insert(id.clone()));
        }

        let stored: Vec<String> = doc
            .children_in(sw, ChildGroup::Nodes)
            .map(|c| doc[c].id().unwrap().to_string())
            .collect();
        let expected: Vec<String> = seen.into_iter().collect();
        prop_assert_eq!(stored, expected);
    }

    /// Property: links order by connector id before anything else.
    #[test]
    fn prop_link_orders_by_connector_first(
        a in "[a-z]{1,4}",
        b in "[a-z]{1,4}",
        binds_a in 0usize..4,
        binds_b in 0usize..4
    ) {
        prop_assume!(a != b);
        let mut doc = Document::new();
        let first = link_with(&mut doc, &a, binds_a);
        let second = link_with(&mut doc, &b, binds_b);
        prop_assert_eq!(doc.compare(first, second), a.cmp(&b));
        prop_assert_eq!(doc.compare(second, first), b.cmp(&a));
    }

    /// Property: with equal connectors, fewer binds sort first.
    #[test]
    fn prop_link_orders_by_bind_count(binds_a in 0usize..5, binds_b in 0usize..5) {
        let mut doc = Document::new();
        let first = link_with(&mut doc, "c", binds_a);
        let second = link_with(&mut doc, "c", binds_b);
        prop_assert_eq!(doc.compare(first, second), binds_a.cmp(&binds_b));
    }

    /// Property: resolving a second time changes nothing.
    #[test]
    fn prop_resolution_idempotent(
        present in prop::collection::btree_set("[a-z]{1,3}", 0..6),
        wanted in "[a-z]{1,3}"
    ) {
        let mut doc = Document::new();
        let sw = switch_in_body(&mut doc);
        for id in &present {
            let node = doc.insert(element(ElementKind::Media, id));
            doc.add_child(sw, node);
        }
        doc[sw].set_default_component(&wanted).unwrap();

        let first = resolve_references(&mut doc);
        prop_assert_eq!(first.resolved + first.unresolved, 1);
        prop_assert_eq!(first.resolved == 1, present.contains(&wanted));
        let snapshot = doc.clone();
        let second = resolve_references(&mut doc);
        prop_assert_eq!(second.resolved + second.unresolved, 0);
        prop_assert_eq!(doc, snapshot);
    }
}
