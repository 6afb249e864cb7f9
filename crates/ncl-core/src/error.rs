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

//! Error types for NCL document construction.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred while building a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NclErrorKind {
    /// Identifier does not follow the NCL name grammar.
    InvalidIdentifier,
    /// Malformed numeric literal.
    InvalidNumber,
    /// Negative value where a position is expected.
    NegativePosition,
    /// Empty value for a required string.
    EmptyString,
    /// Malformed time literal.
    InvalidTime,
    /// Malformed sample literal.
    InvalidSample,
    /// Malformed coordinate list.
    InvalidCoords,
    /// Unknown rule comparator.
    InvalidComparator,
    /// Event stream does not describe a well-formed NCL tree.
    Structure,
    /// Security limit exceeded.
    Security,
}

impl fmt::Display for NclErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier => write!(f, "InvalidIdentifier"),
            Self::InvalidNumber => write!(f, "InvalidNumber"),
            Self::NegativePosition => write!(f, "NegativePosition"),
            Self::EmptyString => write!(f, "EmptyString"),
            Self::InvalidTime => write!(f, "InvalidTime"),
            Self::InvalidSample => write!(f, "InvalidSample"),
            Self::InvalidCoords => write!(f, "InvalidCoords"),
            Self::InvalidComparator => write!(f, "InvalidComparator"),
            Self::Structure => write!(f, "StructureError"),
            Self::Security => write!(f, "SecurityError"),
        }
    }
}

/// An error raised while constructing NCL values or elements.
///
/// Construction errors are fatal for the value being built. The streaming
/// builder converts attribute-level errors into element diagnostics, so
/// only structural and security errors escape a parse.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}{}", context_suffix(.context))]
pub struct NclError {
    /// The kind of error.
    pub kind: NclErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Additional context (e.g., "in <switch>").
    pub context: Option<String>,
}

impl NclError {
    /// Create a new error.
    pub fn new(kind: NclErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors for each error kind
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidIdentifier, message)
    }

    pub fn invalid_number(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidNumber, message)
    }

    pub fn negative_position(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::NegativePosition, message)
    }

    pub fn empty_string(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::EmptyString, message)
    }

    pub fn invalid_time(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidTime, message)
    }

    pub fn invalid_sample(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidSample, message)
    }

    pub fn invalid_coords(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidCoords, message)
    }

    pub fn invalid_comparator(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::InvalidComparator, message)
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::Structure, message)
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new(NclErrorKind::Security, message)
    }
}

/// Result type for NCL operations.
pub type NclResult<T> = Result<T, NclError>;

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" ({})", context),
        None => String::new(),
    }
}
