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

//! Security limits for NCL parsing.

/// Configurable limits for parser security.
///
/// These limits bound the resources consumed while building a document
/// from an untrusted event stream.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth (default: 256).
    pub max_depth: usize,
    /// Maximum number of elements in the arena (default: 1M).
    pub max_elements: usize,
    /// Maximum attribute value length in bytes (default: 64KB).
    pub max_attribute_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_elements: 1_000_000,
            max_attribute_length: 64 * 1024, // 64KB
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_elements: usize::MAX,
            max_attribute_length: usize::MAX,
        }
    }
}
