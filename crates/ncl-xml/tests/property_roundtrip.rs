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

//! Property-based roundtrip tests for NCL markup.
//!
//! # Properties Tested
//!
//! 1. **Idempotency**: serialize → parse → serialize is byte-identical
//! 2. **Order independence**: sibling order in the input does not change output
//! 3. **Escaping**: special characters in attribute values survive a roundtrip

use ncl_core::{ChildGroup, ParseOptions, Text};
use ncl_xml::{from_ncl_str, to_ncl};
use proptest::prelude::*;

fn switch_markup(ids: &[String], default: &str) -> String {
    let mut xml = String::from("<ncl id='doc'><body><switch id='sw'>");
    xml.push_str(&format!("<defaultComponent component='{}'/>", default));
    for id in ids {
        xml.push_str(&format!("<media id='{}'/>", id));
    }
    xml.push_str("</switch></body></ncl>");
    xml
}

fn roundtrip(xml: &str) -> String {
    to_ncl(&from_ncl_str(xml, &ParseOptions::default()).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: serialized output parses back to the same output.
    #[test]
    fn prop_serialization_idempotent(
        ids in prop::collection::vec("[a-z][a-z0-9]{0,6}", 0..8),
        default in "[a-z][a-z0-9]{0,6}"
    ) {
        let first = roundtrip(&switch_markup(&ids, &default));
        let second = roundtrip(&first);
        prop_assert_eq!(first, second);
    }

    /// Property: reversing sibling order yields identical output.
    #[test]
    fn prop_sibling_order_irrelevant(
        ids in prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..8)
    ) {
        let mut reversed = ids.clone();
        reversed.reverse();
        prop_assert_eq!(
            roundtrip(&switch_markup(&ids, &ids[0])),
            roundtrip(&switch_markup(&reversed, &ids[0]))
        );
    }

    /// Property: attribute values with markup characters survive escaping.
    #[test]
    fn prop_attribute_escaping(title in "[a-zA-Z0-9 <>&'\"]{1,24}") {
        let mut doc = from_ncl_str("<ncl id='doc'/>", &ParseOptions::default()).unwrap();
        let root = doc.root().unwrap();
        if let ncl_core::ElementData::Ncl { title: t, .. } = doc[root].data_mut() {
            *t = Some(Text::new(title.clone()).unwrap());
        }

        let reparsed = from_ncl_str(&to_ncl(&doc), &ParseOptions::default()).unwrap();
        let root = reparsed.root().unwrap();
        match reparsed[root].data() {
            ncl_core::ElementData::Ncl { title: Some(t), .. } => {
                prop_assert_eq!(t.as_str(), title.as_str());
            }
            other => {
                prop_assert!(false, "title lost: {:?}", other);
            }
        }
        prop_assert_eq!(reparsed.children_in(root, ChildGroup::Body).count(), 0);
    }
}
