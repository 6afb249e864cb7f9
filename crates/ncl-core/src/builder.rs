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

//! Streaming tree builder.
//!
//! [`DocumentBuilder`] consumes markup events in a single forward pass. A
//! stack of open frames tracks the element under construction; an element
//! is attached to its parent when its end tag arrives, so ordering keys
//! that depend on descendants are final at that point. When the document
//! ends, the deferred resolver binds every reference at once.
//!
//! # Recoverable problems
//!
//! Unknown tags (with their whole subtree) and unknown attributes are
//! skipped. Attribute values that fail to parse become errors on the
//! element, and a child whose ordering key collides with a sibling is
//! dropped with a warning on the parent. None of these stop the parse.
//!
//! # Fatal errors
//!
//! A root other than `<ncl>`, mismatched end tags, events after the end of
//! the document and exceeded [`Limits`] abort with an [`NclError`].

use crate::document::{Document, Element, ElementData, NodeId};
use crate::error::{NclError, NclResult};
use crate::kind::{child_group, ElementKind};
use crate::limits::Limits;
use crate::reference::{resolve_references, RefField};
use crate::value::{parse_position, Text};
use tracing::{debug, trace};

/// Parsing options for configuring document construction.
///
/// ParseOptions provides both direct field access and a fluent builder API.
///
/// ```text
/// use ncl_core::ParseOptions;
///
/// let opts = ParseOptions::builder()
///     .max_depth(64)
///     .resolve_references(false)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Security limits.
    pub limits: Limits,
    /// Run the reference resolver when the document ends.
    pub resolve_references: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            resolve_references: true,
        }
    }
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for ergonomic construction of ParseOptions.
#[derive(Debug, Clone)]
pub struct ParseOptionsBuilder {
    limits: Limits,
    resolve_references: bool,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            resolve_references: true,
        }
    }

    /// Set the maximum element nesting depth (default: 256).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.limits.max_depth = depth;
        self
    }

    /// Set the maximum number of elements (default: 1M).
    pub fn max_elements(mut self, count: usize) -> Self {
        self.limits.max_elements = count;
        self
    }

    /// Set the maximum attribute value length in bytes (default: 64KB).
    pub fn max_attribute_length(mut self, length: usize) -> Self {
        self.limits.max_attribute_length = length;
        self
    }

    /// Replace all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether references are resolved when the document ends (default: true).
    ///
    /// When disabled, every reference stays pending until
    /// [`resolve_references`] is called explicitly.
    pub fn resolve_references(mut self, resolve: bool) -> Self {
        self.resolve_references = resolve;
        self
    }

    /// Build the ParseOptions.
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            limits: self.limits,
            resolve_references: self.resolve_references,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A possibly prefixed markup name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(prefix: Option<String>, local: impl Into<String>) -> Self {
        Self {
            prefix,
            local: local.into(),
        }
    }

    /// An unprefixed name.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }
}

/// An attribute as delivered by the tokenizer, value already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::local(name),
            value: value.into(),
        }
    }
}

/// A markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ElementStart {
        name: QName,
        attributes: Vec<Attribute>,
    },
    ElementEnd {
        name: QName,
    },
    DocumentEnd,
}

#[derive(Debug)]
enum FrameKind {
    Element(NodeId),
    /// `defaultComponent` / `defaultDescriptor`.
    Default,
    Ignored,
}

#[derive(Debug)]
struct Frame {
    name: String,
    kind: FrameKind,
}

/// Event-driven document builder.
#[derive(Debug)]
pub struct DocumentBuilder {
    options: ParseOptions,
    doc: Document,
    stack: Vec<Frame>,
    ended: bool,
}

impl DocumentBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            doc: Document::new(),
            stack: Vec::new(),
            ended: false,
        }
    }

    /// The document built so far.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Process one event.
    pub fn feed(&mut self, event: Event) -> NclResult<()> {
        match event {
            Event::ElementStart { name, attributes } => self.start_element(&name, &attributes),
            Event::ElementEnd { name } => self.end_element(&name),
            Event::DocumentEnd => self.end_document(),
        }
    }

    pub fn start_element(&mut self, name: &QName, attributes: &[Attribute]) -> NclResult<()> {
        self.ensure_open()?;
        let local = name.local.as_str();
        trace!("start <{}>", local);

        if self.stack.len() >= self.options.limits.max_depth {
            return Err(NclError::security(format!(
                "maximum nesting depth {} exceeded at <{}>",
                self.options.limits.max_depth, local
            )));
        }
        let max_len = self.options.limits.max_attribute_length;
        if let Some(attr) = attributes.iter().find(|a| a.value.len() > max_len) {
            return Err(NclError::security(format!(
                "attribute '{}' on <{}> exceeds {} bytes",
                attr.name.local, local, max_len
            )));
        }

        let kind = match self.stack.last() {
            None => {
                if self.doc.root().is_some() {
                    return Err(NclError::structure(format!(
                        "unexpected <{}> after the root element",
                        local
                    )));
                }
                if local != ElementKind::Ncl.tag() {
                    return Err(NclError::structure(format!(
                        "root element must be <ncl>, found <{}>",
                        local
                    )));
                }
                let node = self.create(ElementKind::Ncl, attributes)?;
                self.doc.set_root(node);
                FrameKind::Element(node)
            }
            Some(Frame {
                kind: FrameKind::Element(parent),
                ..
            }) => {
                let parent = *parent;
                self.open_child(parent, local, attributes)?
            }
            Some(_) => FrameKind::Ignored,
        };

        self.stack.push(Frame {
            name: local.to_string(),
            kind,
        });
        Ok(())
    }

    fn open_child(
        &mut self,
        parent: NodeId,
        local: &str,
        attributes: &[Attribute],
    ) -> NclResult<FrameKind> {
        let parent_kind = self.doc[parent].kind();

        let default = match (parent_kind, local) {
            (ElementKind::Switch, "defaultComponent") => {
                Some((RefField::DefaultComponent, "component"))
            }
            (ElementKind::DescriptorSwitch, "defaultDescriptor") => {
                Some((RefField::DefaultDescriptor, "descriptor"))
            }
            _ => None,
        };
        if let Some((field, attribute)) = default {
            if let Some(attr) = attributes.iter().find(|a| a.name.local == attribute) {
                let element = &mut self.doc[parent];
                if let Err(err) = element.set_reference(field, &attr.value) {
                    element.add_error(format!("Invalid {} attribute: {}", local, err));
                }
            }
            return Ok(FrameKind::Default);
        }

        match ElementKind::from_tag(local) {
            Some(kind) if child_group(parent_kind, kind).is_some() => {
                let node = self.create(kind, attributes)?;
                Ok(FrameKind::Element(node))
            }
            _ => {
                trace!("ignoring <{}> inside <{}>", local, parent_kind);
                Ok(FrameKind::Ignored)
            }
        }
    }

    fn create(&mut self, kind: ElementKind, attributes: &[Attribute]) -> NclResult<NodeId> {
        if self.doc.len() >= self.options.limits.max_elements {
            return Err(NclError::security(format!(
                "maximum element count {} exceeded",
                self.options.limits.max_elements
            )));
        }

        let mut element = Element::new(ElementData::empty(kind));
        for attr in attributes {
            match element.set_attribute(&attr.name.local, &attr.value) {
                Ok(true) => {}
                Ok(false) => trace!("ignoring attribute '{}' on <{}>", attr.name.local, kind),
                Err(err) => {
                    element.add_error(format!("Invalid {} attribute: {}", attr.name.local, err))
                }
            }
        }
        Ok(self.doc.insert(element))
    }

    pub fn end_element(&mut self, name: &QName) -> NclResult<()> {
        self.ensure_open()?;
        let local = name.local.as_str();
        trace!("end <{}>", local);

        let frame = self.stack.pop().ok_or_else(|| {
            NclError::structure(format!("unexpected end tag </{}>", local))
        })?;
        if frame.name != local {
            return Err(NclError::structure(format!(
                "mismatched end tag: expected </{}>, found </{}>",
                frame.name, local
            )));
        }

        let FrameKind::Element(node) = frame.kind else {
            return Ok(());
        };
        let Some(Frame {
            kind: FrameKind::Element(parent),
            ..
        }) = self.stack.last()
        else {
            return Ok(());
        };
        let parent = *parent;

        if !self.doc.add_child(parent, node) {
            let warning = self.doc.duplicate_warning(node);
            debug!("{}", warning);
            self.doc[parent].add_warning(warning);
        }
        Ok(())
    }

    /// Close the document and resolve references.
    pub fn end_document(&mut self) -> NclResult<()> {
        self.ensure_open()?;
        if let Some(frame) = self.stack.last() {
            return Err(NclError::structure(format!(
                "document ended inside <{}>",
                frame.name
            )));
        }
        self.ended = true;

        if self.options.resolve_references {
            resolve_references(&mut self.doc);
        }
        Ok(())
    }

    /// Hand over the finished document.
    pub fn finish(self) -> NclResult<Document> {
        if !self.ended {
            return Err(NclError::structure("document is not finished"));
        }
        if self.doc.root().is_none() {
            return Err(NclError::structure("document has no root element"));
        }
        Ok(self.doc)
    }

    fn ensure_open(&self) -> NclResult<()> {
        if self.ended {
            Err(NclError::structure("event after the end of the document"))
        } else {
            Ok(())
        }
    }
}

/// Build a document from a complete event sequence.
pub fn build_document<I>(events: I, options: ParseOptions) -> NclResult<Document>
where
    I: IntoIterator<Item = Event>,
{
    let mut builder = DocumentBuilder::new(options);
    for event in events {
        builder.feed(event)?;
    }
    builder.finish()
}

fn has_id_attribute(kind: ElementKind) -> bool {
    !matches!(
        kind,
        ElementKind::Mapping | ElementKind::BindRule | ElementKind::LinkParam | ElementKind::Bind
    )
}

fn reference_attribute(kind: ElementKind, name: &str) -> Option<RefField> {
    use ElementKind as K;

    match (kind, name) {
        (K::Switch, "refer") => Some(RefField::Refer),
        (K::Media, "descriptor") => Some(RefField::Descriptor),
        (K::Link, "xconnector") => Some(RefField::Xconnector),
        (K::BindRule, "constituent") => Some(RefField::Constituent),
        (K::BindRule, "rule") => Some(RefField::Rule),
        (K::Mapping | K::Port | K::Bind, "component") => Some(RefField::Component),
        (K::Mapping | K::Port | K::Bind, "interface") => Some(RefField::Interface),
        _ => None,
    }
}

impl Element {
    /// Set an attribute from its markup text.
    ///
    /// Returns `Ok(false)` when the element has no attribute of that name.
    /// On error the previous value is kept.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> NclResult<bool> {
        use ElementData as D;

        if name == "id" && has_id_attribute(self.kind()) {
            self.set_id(value)?;
            return Ok(true);
        }
        if let Some(field) = reference_attribute(self.kind(), name) {
            self.set_reference(field, value)?;
            return Ok(true);
        }

        match (self.data_mut(), name) {
            (D::Ncl { title, .. }, "title") => *title = Some(Text::new(value)?),
            (D::Ncl { xmlns, .. }, "xmlns") => *xmlns = Some(Text::new(value)?),
            (D::Rule { var, .. }, "var") => *var = Some(Text::new(value)?),
            (D::Rule { comparator, .. }, "comparator") => *comparator = Some(value.parse()?),
            (D::Rule { value: v, .. }, "value") => *v = Some(Text::new(value)?),
            (D::Descriptor { player, .. }, "player") => *player = Some(Text::new(value)?),
            (D::Descriptor { explicit_dur, .. }, "explicitDur") => {
                *explicit_dur = Some(value.parse()?)
            }
            (D::Descriptor { region, .. }, "region") => *region = Some(Text::new(value)?),
            (D::Media { src, .. }, "src") => *src = Some(Text::new(value)?),
            (D::Media { mime_type, .. }, "type") => *mime_type = Some(Text::new(value)?),
            (D::Area(area), "coords") => area.coords = Some(value.parse()?),
            (D::Area(area), "begin") => area.begin = Some(value.parse()?),
            (D::Area(area), "end") => area.end = Some(value.parse()?),
            (D::Area(area), "text") => area.text = Some(Text::new(value)?),
            (D::Area(area), "position") => area.position = Some(parse_position(value)?),
            (D::Area(area), "first") => area.first = Some(value.parse()?),
            (D::Area(area), "last") => area.last = Some(value.parse()?),
            (D::Area(area), "label") => area.label = Some(Text::new(value)?),
            (D::LinkParam { name: n, .. }, "name") => *n = Some(Text::new(value)?),
            (D::LinkParam { value: v, .. }, "value") => *v = Some(Text::new(value)?),
            (D::Bind { role, .. }, "role") => *role = Some(Text::new(value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}
