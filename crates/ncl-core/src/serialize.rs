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

//! Markup serialization.
//!
//! Output is deterministic: attributes in a fixed per-kind order, children
//! in their stored order, one tab per nesting level and one element per
//! line. Attribute values are single-quoted.

use crate::document::{Document, ElementData, NodeId};
use crate::kind::{child_group, ChildGroup};
use crate::reference::{RefField, Reference};
use quick_xml::escape::escape;

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";

impl Document {
    /// Render the subtree at `node`, indented by `indent` tabs.
    ///
    /// Negative indentation is treated as zero.
    pub fn serialize(&self, node: NodeId, indent: i32) -> String {
        let mut out = String::new();
        self.write_element(&mut out, node, usize::try_from(indent).unwrap_or(0));
        out
    }

    /// Render the whole document with an XML declaration.
    pub fn to_ncl(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        if let Some(root) = self.root() {
            self.write_element(&mut out, root, 0);
        }
        out
    }

    fn write_element(&self, out: &mut String, node: NodeId, depth: usize) {
        let element = &self[node];
        let tag = element.kind().tag();

        push_indent(out, depth);
        out.push('<');
        out.push_str(tag);
        if let Some(id) = element.id() {
            push_attribute(out, "id", id.as_str());
        }
        for (name, value) in self.attributes(node) {
            push_attribute(out, name, &value);
        }

        let default = self.default_child(node);
        if element.children().is_empty() && default.is_none() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");

        let parent_kind = element.kind();
        let mut pending_default = default;
        for &child in element.children() {
            if let Some(group) = child_group(parent_kind, self[child].kind()) {
                if group > ChildGroup::BindRules {
                    if let Some(line) = pending_default.take() {
                        push_default(out, &line, depth + 1);
                    }
                }
            }
            self.write_element(out, child, depth + 1);
        }
        if let Some(line) = pending_default {
            push_default(out, &line, depth + 1);
        }

        push_indent(out, depth);
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
    }

    /// Kind-specific attributes after `id`, in output order.
    fn attributes(&self, node: NodeId) -> Vec<(&'static str, String)> {
        use ElementData as D;

        let mut attrs: Vec<(&'static str, Option<String>)> = Vec::new();
        let text = |t: &Option<crate::value::Text>| t.as_ref().map(ToString::to_string);
        let reference = |r: &Option<Reference>| self.reference_text(r.as_ref());

        match self[node].data() {
            D::Ncl { title, xmlns } => {
                attrs.push(("title", text(title)));
                attrs.push(("xmlns", text(xmlns)));
            }
            D::Rule {
                var,
                comparator,
                value,
            } => {
                attrs.push(("var", text(var)));
                attrs.push(("comparator", comparator.map(|c| c.to_string())));
                attrs.push(("value", text(value)));
            }
            D::Descriptor {
                player,
                explicit_dur,
                region,
            } => {
                attrs.push(("player", text(player)));
                attrs.push(("explicitDur", explicit_dur.map(|t| t.to_string())));
                attrs.push(("region", text(region)));
            }
            D::Media {
                src,
                mime_type,
                descriptor,
            } => {
                attrs.push(("src", text(src)));
                attrs.push(("type", text(mime_type)));
                attrs.push(("descriptor", reference(descriptor)));
            }
            D::Area(area) => {
                attrs.push(("coords", area.coords.as_ref().map(ToString::to_string)));
                attrs.push(("begin", area.begin.map(|t| t.to_string())));
                attrs.push(("end", area.end.map(|t| t.to_string())));
                attrs.push(("text", text(&area.text)));
                attrs.push(("position", area.position.map(|p| p.to_string())));
                attrs.push(("first", area.first.map(|s| s.to_string())));
                attrs.push(("last", area.last.map(|s| s.to_string())));
                attrs.push(("label", text(&area.label)));
            }
            D::Switch { refer, .. } => attrs.push(("refer", reference(refer))),
            D::Mapping {
                component,
                interface,
            }
            | D::Port {
                component,
                interface,
            } => {
                attrs.push(("component", reference(component)));
                attrs.push(("interface", reference(interface)));
            }
            D::BindRule { constituent, rule } => {
                attrs.push(("constituent", reference(constituent)));
                attrs.push(("rule", reference(rule)));
            }
            D::Link { xconnector } => attrs.push(("xconnector", reference(xconnector))),
            D::LinkParam { name, value } => {
                attrs.push(("name", text(name)));
                attrs.push(("value", text(value)));
            }
            D::Bind {
                role,
                component,
                interface,
            } => {
                attrs.push(("role", text(role)));
                attrs.push(("component", reference(component)));
                attrs.push(("interface", reference(interface)));
            }
            _ => {}
        }

        attrs
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    /// The `defaultComponent`/`defaultDescriptor` line, if the element has one.
    fn default_child(&self, node: NodeId) -> Option<String> {
        let element = &self[node];
        let (tag, attribute, field) = match element.data() {
            ElementData::Switch { .. } => ("defaultComponent", "component", RefField::DefaultComponent),
            ElementData::DescriptorSwitch { .. } => {
                ("defaultDescriptor", "descriptor", RefField::DefaultDescriptor)
            }
            _ => return None,
        };
        let value = self.reference_text(element.reference(field))?;

        let mut line = String::from("<");
        line.push_str(tag);
        push_attribute(&mut line, attribute, &value);
        line.push_str("/>\n");
        Some(line)
    }

    fn reference_text(&self, reference: Option<&Reference>) -> Option<String> {
        reference
            .and_then(|r| self.reference_id(r))
            .map(ToString::to_string)
    }
}

fn push_indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat('\t').take(depth));
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("='");
    out.push_str(&escape(value));
    out.push('\'');
}

fn push_default(out: &mut String, line: &str, depth: usize) {
    push_indent(out, depth);
    out.push_str(line);
}
