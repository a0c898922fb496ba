// Dweve NEF - NMR Exchange Format reader
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

//! Resource limits for NEF parsing.

/// Configurable limits bounding the resources a single parse may consume.
///
/// Exceeding any limit is a [`LimitExceeded`](crate::NefErrorKind::LimitExceeded)
/// error in both strict and lenient mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes (default: 1GB).
    pub max_input_size: usize,
    /// Maximum length of a single token in bytes, including semicolon blocks (default: 16MB).
    pub max_token_length: usize,
    /// Maximum number of saveframes in a document (default: 100k).
    pub max_saveframes: usize,
    /// Maximum columns in a single loop (default: 1000).
    pub max_loop_columns: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 1024 * 1024 * 1024,   // 1GB
            max_token_length: 16 * 1024 * 1024,   // 16MB
            max_saveframes: 100_000,
            max_loop_columns: 1_000,
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_input_size: usize::MAX,
            max_token_length: usize::MAX,
            max_saveframes: usize::MAX,
            max_loop_columns: usize::MAX,
        }
    }
}
