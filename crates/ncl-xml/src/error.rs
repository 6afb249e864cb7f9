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

//! Error types for the XML front end.

use ncl_core::NclError;
use thiserror::Error;

/// Errors that can occur while reading NCL markup.
#[derive(Debug, Clone, Error)]
pub enum XmlError {
    /// The input is not well-formed XML.
    ///
    /// ```text
    /// XML parse error at position 42: unexpected end of file
    /// ```
    #[error("XML parse error at position {pos}: {message}")]
    Parse {
        /// Byte offset in the input where the error was detected.
        pos: usize,
        /// Description of the parsing error.
        message: String,
    },

    /// The markup is well-formed but does not build a document.
    #[error(transparent)]
    Model(#[from] NclError),
}

impl XmlError {
    pub(crate) fn parse(pos: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            pos,
            message: message.into(),
        }
    }
}
