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

//! Element kinds and the parent/child structure of an NCL document.

use std::fmt;

/// The closed set of element kinds the document model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Ncl,
    Head,
    Body,
    RuleBase,
    Rule,
    DescriptorBase,
    Descriptor,
    DescriptorSwitch,
    ConnectorBase,
    CausalConnector,
    Context,
    Media,
    Area,
    Switch,
    SwitchPort,
    Mapping,
    BindRule,
    Port,
    Link,
    LinkParam,
    Bind,
}

impl ElementKind {
    /// The markup tag name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ncl => "ncl",
            Self::Head => "head",
            Self::Body => "body",
            Self::RuleBase => "ruleBase",
            Self::Rule => "rule",
            Self::DescriptorBase => "descriptorBase",
            Self::Descriptor => "descriptor",
            Self::DescriptorSwitch => "descriptorSwitch",
            Self::ConnectorBase => "connectorBase",
            Self::CausalConnector => "causalConnector",
            Self::Context => "context",
            Self::Media => "media",
            Self::Area => "area",
            Self::Switch => "switch",
            Self::SwitchPort => "switchPort",
            Self::Mapping => "mapping",
            Self::BindRule => "bindRule",
            Self::Port => "port",
            Self::Link => "link",
            Self::LinkParam => "linkParam",
            Self::Bind => "bind",
        }
    }

    /// Look up a kind by tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "ncl" => Self::Ncl,
            "head" => Self::Head,
            "body" => Self::Body,
            "ruleBase" => Self::RuleBase,
            "rule" => Self::Rule,
            "descriptorBase" => Self::DescriptorBase,
            "descriptor" => Self::Descriptor,
            "descriptorSwitch" => Self::DescriptorSwitch,
            "connectorBase" => Self::ConnectorBase,
            "causalConnector" => Self::CausalConnector,
            "context" => Self::Context,
            "media" => Self::Media,
            "area" => Self::Area,
            "switch" => Self::Switch,
            "switchPort" => Self::SwitchPort,
            "mapping" => Self::Mapping,
            "bindRule" => Self::BindRule,
            "port" => Self::Port,
            "link" => Self::Link,
            "linkParam" => Self::LinkParam,
            "bind" => Self::Bind,
            _ => return None,
        };
        Some(kind)
    }

    /// Presentation nodes: media objects and compositions.
    pub fn is_node(self) -> bool {
        matches!(self, Self::Media | Self::Context | Self::Switch)
    }

    /// Anchors a bind, port or mapping can point at inside a component.
    pub fn is_interface(self) -> bool {
        matches!(self, Self::Area | Self::Port | Self::SwitchPort)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A child collection of an element.
///
/// The declaration order is the serialization order: children are kept
/// sorted by group first, then by their ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildGroup {
    Head,
    Body,
    RuleBase,
    DescriptorBase,
    ConnectorBase,
    Rules,
    Ports,
    BindRules,
    Descriptors,
    Connectors,
    Nodes,
    Links,
    Areas,
    Mappings,
    LinkParams,
    Binds,
}

impl ChildGroup {
    /// Groups holding at most one element.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            Self::Head | Self::Body | Self::RuleBase | Self::DescriptorBase | Self::ConnectorBase
        )
    }
}

/// The group a `child` belongs to under `parent`, or `None` when the
/// language does not allow that nesting.
pub fn child_group(parent: ElementKind, child: ElementKind) -> Option<ChildGroup> {
    use ElementKind as K;

    let group = match (parent, child) {
        (K::Ncl, K::Head) => ChildGroup::Head,
        (K::Ncl, K::Body) => ChildGroup::Body,

        (K::Head, K::RuleBase) => ChildGroup::RuleBase,
        (K::Head, K::DescriptorBase) => ChildGroup::DescriptorBase,
        (K::Head, K::ConnectorBase) => ChildGroup::ConnectorBase,

        (K::RuleBase, K::Rule) => ChildGroup::Rules,
        (K::DescriptorBase, K::Descriptor | K::DescriptorSwitch) => ChildGroup::Descriptors,
        (K::DescriptorSwitch, K::BindRule) => ChildGroup::BindRules,
        (K::DescriptorSwitch, K::Descriptor) => ChildGroup::Descriptors,
        (K::ConnectorBase, K::CausalConnector) => ChildGroup::Connectors,

        (K::Body | K::Context, K::Port) => ChildGroup::Ports,
        (K::Body | K::Context, c) if c.is_node() => ChildGroup::Nodes,
        (K::Body | K::Context, K::Link) => ChildGroup::Links,

        (K::Media, K::Area) => ChildGroup::Areas,

        (K::Switch, K::SwitchPort) => ChildGroup::Ports,
        (K::Switch, K::BindRule) => ChildGroup::BindRules,
        (K::Switch, c) if c.is_node() => ChildGroup::Nodes,
        (K::SwitchPort, K::Mapping) => ChildGroup::Mappings,

        (K::Link, K::LinkParam) => ChildGroup::LinkParams,
        (K::Link, K::Bind) => ChildGroup::Binds,

        _ => return None,
    };
    Some(group)
}
