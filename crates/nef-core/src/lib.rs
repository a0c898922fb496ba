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

//! Core reader and data model for the NMR Exchange Format (NEF).
//!
//! NEF is a STAR-family text format: one datablock holding named saveframes,
//! each of which holds scalar fields and tabular loops. Reading happens in
//! two stages:
//!
//! 1. [`lex::tokenize`] turns text into tokens, resolving STAR's ambiguous
//!    quoting and semicolon blocks. It never fails.
//! 2. [`Parser`] drives a state machine over the tokens to build a
//!    [`Document`], either strictly or leniently (see [`ParseOptions`]).
//!
//! All values are kept as the exact strings found in the input; no numeric
//! interpretation is attempted.
//!
//! # Examples
//!
//! ```
//! use nef_core::parse;
//!
//! let text = "\
//! data_example
//! save_nef_molecular_system
//!    _nef_molecular_system.sf_category   nef_molecular_system
//!    _nef_molecular_system.sf_framecode  nef_molecular_system
//!    loop_
//!       _nef_sequence.chain_code
//!       _nef_sequence.residue_name
//!       A  ALA
//!       A  GLY
//!    stop_
//! save_
//! ";
//! let doc = parse(text).unwrap();
//! assert_eq!(doc.datablock(), Some("example"));
//! let sequence = doc
//!     .get("nef_molecular_system")
//!     .and_then(|sf| sf.get_loop("nef_sequence"))
//!     .unwrap();
//! assert_eq!(sequence.row_count(), 2);
//! assert_eq!(sequence.cell(1, "residue_name"), Some("GLY"));
//! ```

mod document;
mod error;
pub mod lex;
mod limits;
mod parser;

pub use document::{Document, Entry, Loop, Saveframe, NULL_VALUE};
pub use error::{NefError, NefErrorKind, NefResult, ParseWarning};
pub use lex::{tokenize, Token, TokenKind};
pub use limits::Limits;
pub use parser::{
    parse, parse_tokens, parse_with_options, ParseOptions, ParseOptionsBuilder, ParseOutput,
    ParseReport, Parser, DEFAULT_DATABLOCK,
};

/// NEF format version this reader targets.
pub const SUPPORTED_FORMAT_VERSION: &str = "0.8";
