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

//! Lexical analysis for NEF.
//!
//! # Module Structure
//!
//! - [`token`] - Token type and role classification
//! - [`tokenizer`] - Character-level state machine producing tokens
//!
//! # Examples
//!
//! ```
//! use nef_core::lex::{tokenize, TokenKind};
//!
//! let tokens = tokenize("save_meta\n_nef_nmr_meta_data.format_name 'Nmr_Exchange_Format'\n");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::SaveframeOpen,
//!         TokenKind::Newline,
//!         TokenKind::DataName,
//!         TokenKind::Value,
//!         TokenKind::Newline,
//!     ]
//! );
//! ```

pub mod token;
pub mod tokenizer;

pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;
