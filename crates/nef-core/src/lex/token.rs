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

//! Tokens and their grammatical roles.

use std::fmt;

/// A lexed text span.
///
/// Tokens only carry text; the role a token plays in the grammar is derived
/// from its shape by [`Token::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The token text, with quote and semicolon delimiters removed.
    pub text: String,
    /// 1-based line the token started on, 0 for hand-built tokens.
    pub line: usize,
    /// Whether the text came from a quoted string or a semicolon block.
    pub delimited: bool,
}

impl Token {
    /// Create a bare token with no source position.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: 0,
            delimited: false,
        }
    }

    /// Create a delimited token with no source position.
    ///
    /// Delimited tokens are always data values.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: 0,
            delimited: true,
        }
    }

    /// Set the source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Classify the token.
    pub fn kind(&self) -> TokenKind {
        TokenKind::classify(&self.text, self.delimited)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Token::new(text)
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Token::new(text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text == "\n" && !self.delimited {
            f.write_str("\\n")
        } else {
            f.write_str(&self.text)
        }
    }
}

/// The grammatical role of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A line break.
    Newline,
    /// `#` to end of line.
    Comment,
    /// `data_<name>`.
    Datablock,
    /// `global_...`.
    Global,
    /// `save_<name>` with a non-empty name.
    SaveframeOpen,
    /// Bare `save_`.
    SaveframeClose,
    /// `loop_`.
    LoopOpen,
    /// `stop_`.
    LoopClose,
    /// `_category.field`.
    DataName,
    /// Anything else, and every delimited token.
    Value,
}

impl TokenKind {
    /// Classify token text. Keywords match case-insensitively.
    pub fn classify(text: &str, delimited: bool) -> Self {
        if delimited {
            return Self::Value;
        }
        if text == "\n" {
            Self::Newline
        } else if text.starts_with('#') {
            Self::Comment
        } else if has_prefix(text, "data_") {
            Self::Datablock
        } else if has_prefix(text, "global_") {
            Self::Global
        } else if has_prefix(text, "save_") {
            if text.len() == "save_".len() {
                Self::SaveframeClose
            } else {
                Self::SaveframeOpen
            }
        } else if text.eq_ignore_ascii_case("loop_") {
            Self::LoopOpen
        } else if text.eq_ignore_ascii_case("stop_") {
            Self::LoopClose
        } else if text.starts_with('_') {
            Self::DataName
        } else {
            Self::Value
        }
    }
}

fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

/// The part of a keyword token after its prefix, e.g. the name in `save_<name>`.
pub(crate) fn keyword_suffix<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.get(prefix.len()..).unwrap_or("")
}
