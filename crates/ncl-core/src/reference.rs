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

//! Cross-reference placeholders and the deferred resolver.
//!
//! Reference attributes may name elements that appear later in the markup
//! or live in another subtree. The builder records each one as a
//! [`Reference::Pending`] placeholder; once the whole document is known,
//! [`resolve_references`] binds every pending placeholder to an element or
//! marks it [`Reference::Unresolved`] with a warning on its owner.

use crate::document::{Document, NodeId};
use crate::error::NclResult;
use crate::kind::{ChildGroup, ElementKind};
use crate::traverse::post_order;
use crate::value::Identifier;
use tracing::debug;

/// Where the resolver looks for a reference target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The owner's own children.
    SiblingSet,
    /// Every switch reachable from the nearest `body` ancestor.
    AncestorBodySubtree,
    /// `ncl/head/connectorBase`.
    ConnectorBase,
    /// `ncl/head/descriptorBase`.
    DescriptorBase,
    /// `ncl/head/ruleBase`.
    RuleBase,
    /// Nodes of the nearest enclosing composition.
    EnclosingNode,
    /// Interfaces of the element the owner's `component` resolved to.
    ComponentInterface,
}

/// What kind of element may satisfy a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Node,
    Switch,
    Descriptor,
    Connector,
    Rule,
    Interface,
    /// A node or a descriptor.
    Constituent,
}

impl TargetKind {
    pub fn accepts(self, kind: ElementKind) -> bool {
        use ElementKind as K;

        match self {
            Self::Node => kind.is_node(),
            Self::Switch => kind == K::Switch,
            Self::Descriptor => matches!(kind, K::Descriptor | K::DescriptorSwitch),
            Self::Connector => kind == K::CausalConnector,
            Self::Rule => kind == K::Rule,
            Self::Interface => kind.is_interface(),
            Self::Constituent => {
                kind.is_node() || matches!(kind, K::Descriptor | K::DescriptorSwitch)
            }
        }
    }

    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Switch => "switch",
            Self::Descriptor => "descriptor",
            Self::Connector => "connector",
            Self::Rule => "rule",
            Self::Interface => "interface",
            Self::Constituent => "constituent",
        }
    }
}

/// An unbound reference: the literal id plus how to look it up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub target_id: Identifier,
    pub expected_kind: TargetKind,
    pub scope: ScopeKind,
}

/// State of a reference attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// Not yet looked up.
    Pending(Placeholder),
    /// Bound to an element of the same document.
    Resolved(NodeId),
    /// Looked up and not found; the literal id is kept.
    Unresolved(Placeholder),
}

impl Reference {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Resolved(target) => Some(*target),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Self::Pending(p) | Self::Unresolved(p) => Some(p),
            Self::Resolved(_) => None,
        }
    }
}

/// A reference-valued field of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefField {
    Refer,
    DefaultComponent,
    DefaultDescriptor,
    Descriptor,
    Xconnector,
    Constituent,
    Rule,
    Component,
    Interface,
}

impl RefField {
    /// Every field, in resolution order. `Interface` depends on `Component`.
    pub const ALL: [RefField; 9] = [
        Self::Refer,
        Self::DefaultComponent,
        Self::DefaultDescriptor,
        Self::Descriptor,
        Self::Xconnector,
        Self::Constituent,
        Self::Rule,
        Self::Component,
        Self::Interface,
    ];

    pub fn target_kind(self) -> TargetKind {
        match self {
            Self::Refer => TargetKind::Switch,
            Self::DefaultComponent | Self::Component => TargetKind::Node,
            Self::DefaultDescriptor | Self::Descriptor => TargetKind::Descriptor,
            Self::Xconnector => TargetKind::Connector,
            Self::Constituent => TargetKind::Constituent,
            Self::Rule => TargetKind::Rule,
            Self::Interface => TargetKind::Interface,
        }
    }

    pub fn scope(self) -> ScopeKind {
        match self {
            Self::Refer => ScopeKind::AncestorBodySubtree,
            Self::DefaultComponent | Self::DefaultDescriptor => ScopeKind::SiblingSet,
            Self::Descriptor => ScopeKind::DescriptorBase,
            Self::Xconnector => ScopeKind::ConnectorBase,
            Self::Rule => ScopeKind::RuleBase,
            Self::Constituent | Self::Component => ScopeKind::EnclosingNode,
            Self::Interface => ScopeKind::ComponentInterface,
        }
    }

    /// A pending placeholder for `target`. Fails on an invalid identifier.
    pub fn placeholder(self, target: &str) -> NclResult<Placeholder> {
        Ok(Placeholder {
            target_id: Identifier::new(target)?,
            expected_kind: self.target_kind(),
            scope: self.scope(),
        })
    }

    /// Attribute name in markup.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Refer => "refer",
            Self::DefaultComponent => "defaultComponent",
            Self::DefaultDescriptor => "defaultDescriptor",
            Self::Descriptor => "descriptor",
            Self::Xconnector => "xconnector",
            Self::Constituent => "constituent",
            Self::Rule => "rule",
            Self::Component => "component",
            Self::Interface => "interface",
        }
    }
}

/// Outcome counts of one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Bind every pending reference reachable from the root.
///
/// Children are resolved before their parents. References that are not
/// pending are left alone, so running this twice changes nothing.
pub fn resolve_references(doc: &mut Document) -> ResolveSummary {
    let mut summary = ResolveSummary::default();
    let Some(root) = doc.root() else {
        return summary;
    };

    for node in post_order(doc, root) {
        for field in RefField::ALL {
            let placeholder = match doc[node].reference(field) {
                Some(Reference::Pending(p)) => p.clone(),
                _ => continue,
            };

            let outcome = lookup(doc, node, &placeholder);
            let element = &mut doc[node];
            let Some(slot) = element.data_mut().reference_slot_mut(field) else {
                continue;
            };
            match outcome {
                Ok(target) => {
                    summary.resolved += 1;
                    *slot = Some(Reference::Resolved(target));
                }
                Err(warning) => {
                    summary.unresolved += 1;
                    *slot = Some(Reference::Unresolved(placeholder));
                    debug!(
                        "Unresolved {} reference on <{}>: {}",
                        field.attribute(),
                        element.kind(),
                        warning
                    );
                    element.add_warning(warning);
                }
            }
        }
    }

    debug!(
        "Reference resolution finished: {} resolved, {} unresolved",
        summary.resolved, summary.unresolved
    );
    summary
}

/// Find the target of `placeholder` owned by `node`, or the warning text.
fn lookup(doc: &Document, node: NodeId, placeholder: &Placeholder) -> Result<NodeId, String> {
    match placeholder.scope {
        ScopeKind::SiblingSet => find_sibling(doc, node, placeholder),
        ScopeKind::AncestorBodySubtree => find_switch_in_body(doc, node, placeholder),
        ScopeKind::ConnectorBase => find_in_base(doc, node, placeholder, ChildGroup::ConnectorBase),
        ScopeKind::DescriptorBase => {
            find_in_base(doc, node, placeholder, ChildGroup::DescriptorBase)
        }
        ScopeKind::RuleBase => find_in_base(doc, node, placeholder, ChildGroup::RuleBase),
        ScopeKind::EnclosingNode => find_in_enclosing(doc, node, placeholder),
        ScopeKind::ComponentInterface => find_interface(doc, node, placeholder),
    }
}

fn is_match(doc: &Document, candidate: NodeId, placeholder: &Placeholder) -> bool {
    let element = &doc[candidate];
    placeholder.expected_kind.accepts(element.kind())
        && element.id() == Some(&placeholder.target_id)
}

fn find_sibling(doc: &Document, owner: NodeId, placeholder: &Placeholder) -> Result<NodeId, String> {
    doc[owner]
        .children()
        .iter()
        .copied()
        .find(|&c| is_match(doc, c, placeholder))
        .ok_or_else(|| {
            format!(
                "Could not find {} in {} with id: {}",
                placeholder.expected_kind.name(),
                doc[owner].kind(),
                placeholder.target_id
            )
        })
}

fn find_switch_in_body(
    doc: &Document,
    owner: NodeId,
    placeholder: &Placeholder,
) -> Result<NodeId, String> {
    let body = doc
        .find_ancestor(owner, ElementKind::Body)
        .ok_or_else(|| "Could not find a body".to_string())?;

    search_switch(doc, body, owner, placeholder).ok_or_else(|| {
        format!(
            "Could not find switch in body with id: {}",
            placeholder.target_id
        )
    })
}

/// Depth-first search through the nodes of `container`.
fn search_switch(
    doc: &Document,
    container: NodeId,
    searcher: NodeId,
    placeholder: &Placeholder,
) -> Option<NodeId> {
    for node in doc.children_in(container, ChildGroup::Nodes) {
        match doc[node].kind() {
            ElementKind::Context => {
                if let Some(found) = search_switch(doc, node, searcher, placeholder) {
                    return Some(found);
                }
            }
            ElementKind::Switch => {
                if node != searcher && is_match(doc, node, placeholder) {
                    return Some(node);
                }
                if let Some(found) = search_switch(doc, node, searcher, placeholder) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_in_base(
    doc: &Document,
    owner: NodeId,
    placeholder: &Placeholder,
    base_group: ChildGroup,
) -> Result<NodeId, String> {
    let kind = placeholder.expected_kind.name();
    let id = &placeholder.target_id;
    let (base_tag, member_group) = match base_group {
        ChildGroup::ConnectorBase => ("connectorBase", ChildGroup::Connectors),
        ChildGroup::DescriptorBase => ("descriptorBase", ChildGroup::Descriptors),
        _ => ("ruleBase", ChildGroup::Rules),
    };

    let root = doc.find_ancestor(owner, ElementKind::Ncl).ok_or_else(|| {
        format!(
            "Could not find a root element while resolving {} with id: {}",
            kind, id
        )
    })?;
    let head = doc
        .children_in(root, ChildGroup::Head)
        .next()
        .ok_or_else(|| format!("Could not find a head while resolving {} with id: {}", kind, id))?;
    let base = doc.children_in(head, base_group).next().ok_or_else(|| {
        format!(
            "Could not find a {} while resolving {} with id: {}",
            base_tag, kind, id
        )
    })?;

    doc.children_in(base, member_group)
        .find(|&c| is_match(doc, c, placeholder))
        .ok_or_else(|| format!("Could not find {} in {} with id: {}", kind, base_tag, id))
}

fn find_in_enclosing(
    doc: &Document,
    owner: NodeId,
    placeholder: &Placeholder,
) -> Result<NodeId, String> {
    use ElementKind as K;

    let container = doc
        .ancestors(owner)
        .find(|&a| {
            matches!(
                doc[a].kind(),
                K::Body | K::Context | K::Switch | K::DescriptorSwitch
            )
        })
        .ok_or_else(|| {
            format!(
                "Could not find an enclosing element for {} with id: {}",
                placeholder.expected_kind.name(),
                placeholder.target_id
            )
        })?;

    let group = if doc[container].kind() == K::DescriptorSwitch {
        ChildGroup::Descriptors
    } else {
        ChildGroup::Nodes
    };

    doc.children_in(container, group)
        .find(|&c| is_match(doc, c, placeholder))
        .ok_or_else(|| {
            format!(
                "Could not find {} in {} with id: {}",
                placeholder.expected_kind.name(),
                doc[container].kind(),
                placeholder.target_id
            )
        })
}

fn find_interface(
    doc: &Document,
    owner: NodeId,
    placeholder: &Placeholder,
) -> Result<NodeId, String> {
    let component = doc[owner]
        .reference(RefField::Component)
        .and_then(Reference::target)
        .ok_or_else(|| {
            format!(
                "Could not find interface with id: {} because its component is not resolved",
                placeholder.target_id
            )
        })?;

    doc[component]
        .children()
        .iter()
        .copied()
        .find(|&c| is_match(doc, c, placeholder))
        .ok_or_else(|| {
            format!(
                "Could not find interface in {} with id: {}",
                doc[component].kind(),
                placeholder.target_id
            )
        })
}
