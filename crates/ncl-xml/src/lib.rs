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

//! NCL XML front end.
//!
//! Reads NCL markup with `quick-xml` and builds an [`ncl_core::Document`],
//! and writes documents back out.
//!
//! # Examples
//!
//! ```rust
//! use ncl_core::ParseOptions;
//! use ncl_xml::{from_ncl_str, to_ncl};
//!
//! let xml = "<ncl id='hello'><body><media id='video' src='video.mp4'/></body></ncl>";
//! let doc = from_ncl_str(xml, &ParseOptions::default()).unwrap();
//! assert!(doc.validate().valid);
//! assert!(to_ncl(&doc).contains("<media id='video' src='video.mp4'/>"));
//! ```

mod error;
pub mod reader;

pub use error::XmlError;
pub use reader::XmlEventSource;

use ncl_core::{Document, DocumentBuilder, ParseOptions};
use std::io::BufRead;
use tracing::debug;

/// Parse NCL markup from a string.
pub fn from_ncl_str(xml: &str, options: &ParseOptions) -> Result<Document, XmlError> {
    from_ncl_reader(xml.as_bytes(), options)
}

/// Parse NCL markup from any buffered reader.
pub fn from_ncl_reader<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Document, XmlError> {
    let mut builder = DocumentBuilder::new(options.clone());
    let mut source = XmlEventSource::new(reader);
    while let Some(event) = source.next() {
        let pos = source.position();
        builder.feed(event?).map_err(|err| {
            debug!("NCL build failed near byte {}: {}", pos, err);
            err.with_context(format!("near byte {}", pos))
        })?;
    }
    let doc = builder.finish()?;
    debug!("Parsed NCL document with {} elements", doc.len());
    Ok(doc)
}

/// Render a document as NCL markup with an XML declaration.
pub fn to_ncl(doc: &Document) -> String {
    doc.to_ncl()
}
