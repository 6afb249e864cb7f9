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

//! Document structure for parsed NCL.
//!
//! Elements live in a document-wide arena and refer to each other through
//! [`NodeId`] handles. Ownership edges (`children`) form a tree; `parent` is
//! the structural inverse and is only read for scope searches.

use crate::error::{NclError, NclResult};
use crate::kind::{child_group, ChildGroup, ElementKind};
use crate::reference::{RefField, Reference};
use crate::traverse::pre_order;
use crate::value::{Comparator, Coords, Identifier, SampleValue, Text, TimeValue};
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Stable handle of an element inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the element in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Attributes of a content anchor (`<area>`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Area {
    pub coords: Option<Coords>,
    pub begin: Option<TimeValue>,
    pub end: Option<TimeValue>,
    pub text: Option<Text>,
    pub position: Option<u32>,
    pub first: Option<SampleValue>,
    pub last: Option<SampleValue>,
    pub label: Option<Text>,
}

/// Kind-specific fields of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementData {
    Ncl {
        title: Option<Text>,
        xmlns: Option<Text>,
    },
    Head,
    Body,
    RuleBase,
    Rule {
        var: Option<Text>,
        comparator: Option<Comparator>,
        value: Option<Text>,
    },
    DescriptorBase,
    Descriptor {
        player: Option<Text>,
        explicit_dur: Option<TimeValue>,
        region: Option<Text>,
    },
    DescriptorSwitch {
        default_descriptor: Option<Reference>,
    },
    ConnectorBase,
    CausalConnector,
    Context,
    Media {
        src: Option<Text>,
        mime_type: Option<Text>,
        descriptor: Option<Reference>,
    },
    Area(Area),
    Switch {
        refer: Option<Reference>,
        default_component: Option<Reference>,
    },
    SwitchPort,
    Mapping {
        component: Option<Reference>,
        interface: Option<Reference>,
    },
    BindRule {
        constituent: Option<Reference>,
        rule: Option<Reference>,
    },
    Port {
        component: Option<Reference>,
        interface: Option<Reference>,
    },
    Link {
        xconnector: Option<Reference>,
    },
    LinkParam {
        name: Option<Text>,
        value: Option<Text>,
    },
    Bind {
        role: Option<Text>,
        component: Option<Reference>,
        interface: Option<Reference>,
    },
}

impl ElementData {
    /// Data with every optional field unset.
    pub fn empty(kind: ElementKind) -> Self {
        use ElementKind as K;

        match kind {
            K::Ncl => Self::Ncl {
                title: None,
                xmlns: None,
            },
            K::Head => Self::Head,
            K::Body => Self::Body,
            K::RuleBase => Self::RuleBase,
            K::Rule => Self::Rule {
                var: None,
                comparator: None,
                value: None,
            },
            K::DescriptorBase => Self::DescriptorBase,
            K::Descriptor => Self::Descriptor {
                player: None,
                explicit_dur: None,
                region: None,
            },
            K::DescriptorSwitch => Self::DescriptorSwitch {
                default_descriptor: None,
            },
            K::ConnectorBase => Self::ConnectorBase,
            K::CausalConnector => Self::CausalConnector,
            K::Context => Self::Context,
            K::Media => Self::Media {
                src: None,
                mime_type: None,
                descriptor: None,
            },
            K::Area => Self::Area(Area::default()),
            K::Switch => Self::Switch {
                refer: None,
                default_component: None,
            },
            K::SwitchPort => Self::SwitchPort,
            K::Mapping => Self::Mapping {
                component: None,
                interface: None,
            },
            K::BindRule => Self::BindRule {
                constituent: None,
                rule: None,
            },
            K::Port => Self::Port {
                component: None,
                interface: None,
            },
            K::Link => Self::Link { xconnector: None },
            K::LinkParam => Self::LinkParam {
                name: None,
                value: None,
            },
            K::Bind => Self::Bind {
                role: None,
                component: None,
                interface: None,
            },
        }
    }

    pub fn kind(&self) -> ElementKind {
        use ElementKind as K;

        match self {
            Self::Ncl { .. } => K::Ncl,
            Self::Head => K::Head,
            Self::Body => K::Body,
            Self::RuleBase => K::RuleBase,
            Self::Rule { .. } => K::Rule,
            Self::DescriptorBase => K::DescriptorBase,
            Self::Descriptor { .. } => K::Descriptor,
            Self::DescriptorSwitch { .. } => K::DescriptorSwitch,
            Self::ConnectorBase => K::ConnectorBase,
            Self::CausalConnector => K::CausalConnector,
            Self::Context => K::Context,
            Self::Media { .. } => K::Media,
            Self::Area(_) => K::Area,
            Self::Switch { .. } => K::Switch,
            Self::SwitchPort => K::SwitchPort,
            Self::Mapping { .. } => K::Mapping,
            Self::BindRule { .. } => K::BindRule,
            Self::Port { .. } => K::Port,
            Self::Link { .. } => K::Link,
            Self::LinkParam { .. } => K::LinkParam,
            Self::Bind { .. } => K::Bind,
        }
    }

    /// The slot holding `field`, if this kind has one.
    pub(crate) fn reference_slot(&self, field: RefField) -> Option<&Option<Reference>> {
        match (self, field) {
            (Self::Switch { refer, .. }, RefField::Refer) => Some(refer),
            (Self::Switch { default_component, .. }, RefField::DefaultComponent) => {
                Some(default_component)
            }
            (Self::DescriptorSwitch { default_descriptor }, RefField::DefaultDescriptor) => {
                Some(default_descriptor)
            }
            (Self::Media { descriptor, .. }, RefField::Descriptor) => Some(descriptor),
            (Self::Link { xconnector }, RefField::Xconnector) => Some(xconnector),
            (Self::BindRule { constituent, .. }, RefField::Constituent) => Some(constituent),
            (Self::BindRule { rule, .. }, RefField::Rule) => Some(rule),
            (
                Self::Mapping { component, .. }
                | Self::Port { component, .. }
                | Self::Bind { component, .. },
                RefField::Component,
            ) => Some(component),
            (
                Self::Mapping { interface, .. }
                | Self::Port { interface, .. }
                | Self::Bind { interface, .. },
                RefField::Interface,
            ) => Some(interface),
            _ => None,
        }
    }

    pub(crate) fn reference_slot_mut(&mut self, field: RefField) -> Option<&mut Option<Reference>> {
        match (self, field) {
            (Self::Switch { refer, .. }, RefField::Refer) => Some(refer),
            (Self::Switch { default_component, .. }, RefField::DefaultComponent) => {
                Some(default_component)
            }
            (Self::DescriptorSwitch { default_descriptor }, RefField::DefaultDescriptor) => {
                Some(default_descriptor)
            }
            (Self::Media { descriptor, .. }, RefField::Descriptor) => Some(descriptor),
            (Self::Link { xconnector }, RefField::Xconnector) => Some(xconnector),
            (Self::BindRule { constituent, .. }, RefField::Constituent) => Some(constituent),
            (Self::BindRule { rule, .. }, RefField::Rule) => Some(rule),
            (
                Self::Mapping { component, .. }
                | Self::Port { component, .. }
                | Self::Bind { component, .. },
                RefField::Component,
            ) => Some(component),
            (
                Self::Mapping { interface, .. }
                | Self::Port { interface, .. }
                | Self::Bind { interface, .. },
                RefField::Interface,
            ) => Some(interface),
            _ => None,
        }
    }
}

/// An element node: identity, structure and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: Option<Identifier>,
    data: ElementData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Element {
    /// Create an element without an id.
    pub fn new(data: ElementData) -> Self {
        Self {
            id: None,
            data,
            parent: None,
            children: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Create an element with a validated id.
    pub fn with_id(data: ElementData, id: &str) -> NclResult<Self> {
        let mut element = Self::new(data);
        element.set_id(id)?;
        Ok(element)
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    /// Replace the id. On error the previous id is kept.
    ///
    /// For an element already registered under a parent use
    /// [`Document::set_id`], which keeps the sibling order intact.
    pub fn set_id(&mut self, id: &str) -> NclResult<()> {
        self.id = Some(Identifier::new(id)?);
        Ok(())
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    /// Mutable access to the kind-specific fields.
    ///
    /// Changing a field that takes part in the ordering key of an element
    /// already registered under a parent leaves that parent's child order
    /// stale; remove the child first and add it again afterwards.
    pub fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in serialization order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Warnings recorded on this element only.
    pub fn own_warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Errors recorded on this element only.
    pub fn own_errors(&self) -> &[String] {
        &self.errors
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn clear_diagnostics(&mut self) {
        self.warnings.clear();
        self.errors.clear();
    }

    /// The reference stored in `field`, if set.
    pub fn reference(&self, field: RefField) -> Option<&Reference> {
        self.data.reference_slot(field).and_then(Option::as_ref)
    }

    /// Point `field` at the element with id `target`.
    ///
    /// The reference starts out pending and is bound by the resolver.
    pub fn set_reference(&mut self, field: RefField, target: &str) -> NclResult<()> {
        let placeholder = field.placeholder(target)?;
        let kind = self.kind();
        let slot = self.data.reference_slot_mut(field).ok_or_else(|| {
            NclError::structure(format!("<{}> has no '{}' reference", kind, field.attribute()))
        })?;
        *slot = Some(Reference::Pending(placeholder));
        Ok(())
    }

    /// Point `field` directly at an element of the same document.
    pub fn bind_reference(&mut self, field: RefField, target: NodeId) -> NclResult<()> {
        let kind = self.kind();
        let slot = self.data.reference_slot_mut(field).ok_or_else(|| {
            NclError::structure(format!("<{}> has no '{}' reference", kind, field.attribute()))
        })?;
        *slot = Some(Reference::Resolved(target));
        Ok(())
    }

    pub fn clear_reference(&mut self, field: RefField) {
        if let Some(slot) = self.data.reference_slot_mut(field) {
            *slot = None;
        }
    }

    pub fn refer(&self) -> Option<&Reference> {
        self.reference(RefField::Refer)
    }

    pub fn set_refer(&mut self, target: &str) -> NclResult<()> {
        self.set_reference(RefField::Refer, target)
    }

    pub fn default_component(&self) -> Option<&Reference> {
        self.reference(RefField::DefaultComponent)
    }

    pub fn set_default_component(&mut self, target: &str) -> NclResult<()> {
        self.set_reference(RefField::DefaultComponent, target)
    }

    pub fn default_descriptor(&self) -> Option<&Reference> {
        self.reference(RefField::DefaultDescriptor)
    }

    pub fn set_default_descriptor(&mut self, target: &str) -> NclResult<()> {
        self.set_reference(RefField::DefaultDescriptor, target)
    }

    pub fn xconnector(&self) -> Option<&Reference> {
        self.reference(RefField::Xconnector)
    }

    pub fn set_xconnector(&mut self, target: &str) -> NclResult<()> {
        self.set_reference(RefField::Xconnector, target)
    }
}

/// A parsed NCL document: the element arena plus its root.
///
/// Elements removed from the tree, or dropped because their ordering key
/// collided, stay in the arena detached; they are unreachable from the root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    elements: Vec<Element>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a detached element into the arena.
    pub fn insert(&mut self, mut element: Element) -> NodeId {
        element.parent = None;
        element.children.clear();
        let id = NodeId(self.elements.len());
        self.elements.push(element);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make `node` the document root, detaching it from any parent.
    pub fn set_root(&mut self, node: NodeId) {
        if let Some(parent) = self[node].parent {
            self.remove_child(parent, node);
        }
        self.root = Some(node);
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    /// Number of elements in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Register `child` under `parent`.
    ///
    /// Returns `false` without changing anything when the nesting is not
    /// allowed, when `child` already has a parent or is an ancestor of
    /// `parent`, or when a sibling with an equal ordering key exists.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self[child].parent.is_some()
            || self.root == Some(child)
            || self.is_ancestor_or_self(child, parent)
        {
            return false;
        }
        let Some(group) = child_group(self[parent].kind(), self[child].kind()) else {
            return false;
        };

        let position = self[parent]
            .children
            .binary_search_by(|&sibling| self.child_order(parent, sibling, child, group));
        match position {
            Ok(_) => false,
            Err(pos) => {
                self.elements[parent.0].children.insert(pos, child);
                self.elements[child.0].parent = Some(parent);
                self.children_changed(parent);
                true
            }
        }
    }

    /// Detach `child` from `parent`. Returns whether it was present.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let children = &mut self.elements[parent.0].children;
        match children.iter().position(|&c| c == child) {
            Some(pos) => {
                children.remove(pos);
                self.elements[child.0].parent = None;
                self.children_changed(parent);
                true
            }
            None => false,
        }
    }

    /// Replace the id of `node` and move it to its new place among its
    /// siblings.
    ///
    /// If another sibling already has that id, `node` is detached and a
    /// warning is recorded on the parent.
    pub fn set_id(&mut self, node: NodeId, id: &str) -> NclResult<()> {
        self[node].set_id(id)?;
        self.reposition(node);
        Ok(())
    }

    /// Set an attribute of `node` from its markup text, keeping the sibling
    /// order intact. Collisions are handled as in [`Document::set_id`].
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> NclResult<bool> {
        let known = self[node].set_attribute(name, value)?;
        if known {
            self.reposition(node);
        }
        Ok(known)
    }

    /// A link orders by its parameters and binds, so its own position
    /// follows every change to its children.
    fn children_changed(&mut self, parent: NodeId) {
        if self[parent].kind() == ElementKind::Link {
            self.reposition(parent);
        }
    }

    /// Re-insert `node` where its current ordering key belongs.
    fn reposition(&mut self, node: NodeId) {
        let Some(parent) = self[node].parent else {
            return;
        };
        let Some(group) = child_group(self[parent].kind(), self[node].kind()) else {
            return;
        };

        let children = &mut self.elements[parent.0].children;
        if let Some(pos) = children.iter().position(|&c| c == node) {
            children.remove(pos);
        }
        let position = self[parent]
            .children
            .binary_search_by(|&sibling| self.child_order(parent, sibling, node, group));
        match position {
            Ok(_) => {
                self.elements[node.0].parent = None;
                let warning = self.duplicate_warning(node);
                debug!("{}", warning);
                self.elements[parent.0].add_warning(warning);
            }
            Err(pos) => self.elements[parent.0].children.insert(pos, node),
        }
        self.children_changed(parent);
    }

    /// Diagnostic for a child dropped because its ordering key collides.
    pub(crate) fn duplicate_warning(&self, node: NodeId) -> String {
        let element = &self[node];
        match element.id() {
            Some(id) => format!("Duplicate {} with id: {} ignored", element.kind(), id),
            None => format!("Duplicate {} ignored", element.kind()),
        }
    }

    /// Detach the child of `group` with the given id.
    pub fn remove_child_by_id(&mut self, parent: NodeId, group: ChildGroup, id: &str) -> bool {
        match self.find_child(parent, group, id) {
            Some(child) => self.remove_child(parent, child),
            None => false,
        }
    }

    pub fn has_child(&self, parent: NodeId, group: ChildGroup, id: &str) -> bool {
        self.find_child(parent, group, id).is_some()
    }

    pub fn find_child(&self, parent: NodeId, group: ChildGroup, id: &str) -> Option<NodeId> {
        self.children_in(parent, group)
            .find(|&c| self[c].id().map(Identifier::as_str) == Some(id))
    }

    /// Children of `parent` belonging to `group`, in order.
    pub fn children_in(
        &self,
        parent: NodeId,
        group: ChildGroup,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let parent_kind = self[parent].kind();
        self[parent]
            .children
            .iter()
            .copied()
            .filter(move |&c| child_group(parent_kind, self[c].kind()) == Some(group))
    }

    /// Iterate from the parent of `node` up to the root.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self[node].parent,
        }
    }

    /// Nearest strict ancestor of the given kind.
    pub fn find_ancestor(&self, node: NodeId, kind: ElementKind) -> Option<NodeId> {
        self.ancestors(node).find(|&a| self[a].kind() == kind)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        candidate == node || self.ancestors(node).any(|a| a == candidate)
    }

    /// The id a reference currently designates: the bound element's id, or
    /// the literal id of a placeholder.
    pub fn reference_id<'a>(&'a self, reference: &'a Reference) -> Option<&'a Identifier> {
        match reference {
            Reference::Resolved(target) => self[*target].id(),
            Reference::Pending(p) | Reference::Unresolved(p) => Some(&p.target_id),
        }
    }

    fn reference_key<'a>(&'a self, reference: Option<&'a Reference>) -> Option<&'a str> {
        reference
            .and_then(|r| self.reference_id(r))
            .map(Identifier::as_str)
    }

    /// Compare two elements by their kind-specific ordering key.
    ///
    /// Links order by connector id, then parameter count, then bind count,
    /// then pairwise parameters and binds. Anonymous elements order by their
    /// attributes; everything else orders by id, with id-less elements first
    /// in arena order.
    pub fn compare(&self, a: NodeId, b: NodeId) -> Ordering {
        use ElementData as D;

        match (&self[a].data, &self[b].data) {
            (D::Link { xconnector: ca }, D::Link { xconnector: cb }) => {
                let params_a: Vec<NodeId> = self.children_in(a, ChildGroup::LinkParams).collect();
                let params_b: Vec<NodeId> = self.children_in(b, ChildGroup::LinkParams).collect();
                let binds_a: Vec<NodeId> = self.children_in(a, ChildGroup::Binds).collect();
                let binds_b: Vec<NodeId> = self.children_in(b, ChildGroup::Binds).collect();

                self.reference_key(ca.as_ref())
                    .cmp(&self.reference_key(cb.as_ref()))
                    .then_with(|| params_a.len().cmp(&params_b.len()))
                    .then_with(|| binds_a.len().cmp(&binds_b.len()))
                    .then_with(|| self.compare_pairwise(&params_a, &params_b))
                    .then_with(|| self.compare_pairwise(&binds_a, &binds_b))
            }
            (D::LinkParam { name: na, value: va }, D::LinkParam { name: nb, value: vb }) => {
                na.cmp(nb).then_with(|| va.cmp(vb))
            }
            (
                D::Bind {
                    role: ra,
                    component: ca,
                    interface: ia,
                },
                D::Bind {
                    role: rb,
                    component: cb,
                    interface: ib,
                },
            ) => ra
                .cmp(rb)
                .then_with(|| self.compare_references(ca, cb))
                .then_with(|| self.compare_references(ia, ib)),
            (
                D::BindRule {
                    constituent: ca,
                    rule: ra,
                },
                D::BindRule {
                    constituent: cb,
                    rule: rb,
                },
            ) => self
                .compare_references(ca, cb)
                .then_with(|| self.compare_references(ra, rb)),
            (
                D::Mapping {
                    component: ca,
                    interface: ia,
                },
                D::Mapping {
                    component: cb,
                    interface: ib,
                },
            ) => self
                .compare_references(ca, cb)
                .then_with(|| self.compare_references(ia, ib)),
            // Elements missing a required id stay distinct from each other.
            _ => match (&self[a].id, &self[b].id) {
                (None, None) => a.cmp(&b),
                (ida, idb) => ida.cmp(idb),
            },
        }
    }

    fn compare_references(&self, a: &Option<Reference>, b: &Option<Reference>) -> Ordering {
        self.reference_key(a.as_ref())
            .cmp(&self.reference_key(b.as_ref()))
    }

    fn compare_pairwise(&self, a: &[NodeId], b: &[NodeId]) -> Ordering {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| self.compare(x, y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn child_order(&self, parent: NodeId, sibling: NodeId, child: NodeId, group: ChildGroup) -> Ordering {
        let parent_kind = self[parent].kind();
        let sibling_group = child_group(parent_kind, self[sibling].kind());
        sibling_group.cmp(&Some(group)).then_with(|| {
            if group.is_singleton() {
                Ordering::Equal
            } else {
                self.compare(sibling, child)
            }
        })
    }

    /// Warnings of `node` and all of its descendants, in document order.
    pub fn warnings(&self, node: NodeId) -> Vec<String> {
        pre_order(self, node)
            .into_iter()
            .flat_map(|n| self[n].warnings.iter().cloned())
            .collect()
    }

    /// Errors of `node` and all of its descendants, in document order.
    pub fn errors(&self, node: NodeId) -> Vec<String> {
        pre_order(self, node)
            .into_iter()
            .flat_map(|n| self[n].errors.iter().cloned())
            .collect()
    }
}

impl Index<NodeId> for Document {
    type Output = Element;

    fn index(&self, node: NodeId) -> &Element {
        &self.elements[node.0]
    }
}

impl IndexMut<NodeId> for Document {
    fn index_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.elements[node.0]
    }
}

/// Iterator over the strict ancestors of an element.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc[current].parent;
        Some(current)
    }
}
