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

//! Streaming event source over `quick-xml`.
//!
//! [`XmlEventSource`] pulls raw events from a [`quick_xml::Reader`] and
//! hands the builder only what it needs: element starts with their
//! unescaped attributes, element ends, and a final document end. Text,
//! comments, processing instructions and declarations are dropped.

use crate::error::XmlError;
use ncl_core::{Attribute, Event, QName};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use std::io::BufRead;
use tracing::trace;

/// Iterator of builder events read from XML.
///
/// The iterator ends after [`Event::DocumentEnd`] or after the first error.
pub struct XmlEventSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// End event owed for a self-closing element.
    pending_end: Option<QName>,
    done: bool,
}

impl<R: BufRead> XmlEventSource<R> {
    pub fn new(reader: R) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            pending_end: None,
            done: false,
        }
    }

    /// Byte offset of the reader in the input.
    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    fn next_event(&mut self) -> Result<Option<Event>, XmlError> {
        loop {
            self.buf.clear();
            let pos = self.reader.buffer_position();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| XmlError::parse(pos, e.to_string()))?;

            match event {
                XmlEvent::Start(e) => return start_event(&e, pos).map(Some),
                XmlEvent::Empty(e) => {
                    let event = start_event(&e, pos)?;
                    if let Event::ElementStart { name, .. } = &event {
                        self.pending_end = Some(name.clone());
                    }
                    return Ok(Some(event));
                }
                XmlEvent::End(e) => {
                    let name = qname(e.name(), pos)?;
                    return Ok(Some(Event::ElementEnd { name }));
                }
                XmlEvent::Eof => {
                    trace!("end of XML input at byte {}", pos);
                    return Ok(Some(Event::DocumentEnd));
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for XmlEventSource<R> {
    type Item = Result<Event, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_end.take() {
            return Some(Ok(Event::ElementEnd { name }));
        }
        if self.done {
            return None;
        }

        let result = self.next_event();
        match &result {
            Ok(Some(Event::DocumentEnd)) | Err(_) => self.done = true,
            _ => {}
        }
        result.transpose()
    }
}

fn start_event(e: &BytesStart<'_>, pos: usize) -> Result<Event, XmlError> {
    let name = qname(e.name(), pos)?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::parse(pos, err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::parse(pos, err.to_string()))?;
        attributes.push(Attribute {
            name: qname(attr.key, pos)?,
            value: value.into_owned(),
        });
    }
    Ok(Event::ElementStart { name, attributes })
}

fn qname(name: quick_xml::name::QName<'_>, pos: usize) -> Result<QName, XmlError> {
    let prefix = name.prefix().map(|p| utf8(p.as_ref(), pos)).transpose()?;
    let local = utf8(name.local_name().as_ref(), pos)?;
    Ok(QName::new(prefix, local))
}

fn utf8(bytes: &[u8], pos: usize) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::parse(pos, format!("invalid UTF-8 in name: {}", e)))
}
