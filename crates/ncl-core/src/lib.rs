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

//! Core document model for NCL (Nested Context Language).
//!
//! This crate builds a typed element tree from a stream of markup events,
//! binds the cross-references between elements once the whole document is
//! known, validates the result and writes it back out as markup.
//!
//! # Pipeline
//!
//! 1. [`DocumentBuilder`] consumes [`Event`]s and grows a [`Document`] arena.
//!    Reference attributes are recorded as [`Reference::Pending`].
//! 2. [`resolve_references`] runs at the end of the document and turns each
//!    pending reference into [`Reference::Resolved`] or, with a warning on
//!    its owner, [`Reference::Unresolved`].
//! 3. [`validate`] folds the per-kind rules over a subtree.
//! 4. [`Document::to_ncl`] and [`Document::serialize`] render markup.
//!
//! The tokenizer is not part of this crate; `ncl-xml` feeds it from
//! `quick-xml`.

mod builder;
mod document;
mod error;
mod kind;
mod limits;
mod reference;
mod serialize;
pub mod traverse;
mod validate;
mod value;

pub use builder::{
    build_document, Attribute, DocumentBuilder, Event, ParseOptions, ParseOptionsBuilder, QName,
};
pub use document::{Ancestors, Area, Document, Element, ElementData, NodeId};
pub use error::{NclError, NclErrorKind, NclResult};
pub use kind::{child_group, ChildGroup, ElementKind};
pub use limits::Limits;
pub use reference::{
    resolve_references, Placeholder, RefField, Reference, ResolveSummary, ScopeKind, TargetKind,
};
pub use traverse::{traverse, ElementVisitor, StatsCollector, VisitorContext};
pub use validate::{validate, Validation};
pub use value::{
    parse_position, Comparator, Coord, Coords, Identifier, SampleValue, Text, TimeValue,
};
