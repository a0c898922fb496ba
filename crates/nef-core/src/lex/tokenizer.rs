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

//! Character-level tokenizer.
//!
//! The tokenizer is total: every input produces a token stream. Ambiguous
//! quoting is resolved with the STAR rule, where a quote character only
//! closes a quoted value when the next character is whitespace, a newline or
//! the end of input.

use super::token::Token;

/// Tokenizer state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Bare,
    Quoted(char),
    /// A matching quote was seen; the buffer ends with it.
    PotentialUnquote(char),
    Comment,
    SemicolonBlock,
}

struct Tokenizer {
    tokens: Vec<Token>,
    buffer: String,
    state: State,
    at_line_start: bool,
    line: usize,
    token_line: usize,
}

impl Tokenizer {
    fn new(capacity: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(capacity),
            buffer: String::new(),
            state: State::Idle,
            at_line_start: true,
            line: 1,
            token_line: 1,
        }
    }

    fn start(&mut self, state: State) {
        self.state = state;
        self.token_line = self.line;
    }

    /// Emit the pending token, if any, and return to idle.
    fn flush(&mut self) {
        let delimited = match self.state {
            State::Idle => return,
            State::Bare => false,
            State::Comment => {
                if self.buffer.ends_with('\r') {
                    self.buffer.pop();
                }
                false
            }
            State::PotentialUnquote(_) => {
                self.buffer.pop();
                true
            }
            State::Quoted(_) | State::SemicolonBlock => true,
        };
        self.tokens.push(Token {
            text: std::mem::take(&mut self.buffer),
            line: self.token_line,
            delimited,
        });
        self.state = State::Idle;
    }

    fn newline(&mut self) {
        if self.state == State::SemicolonBlock {
            self.buffer.push('\n');
        } else {
            self.flush();
            self.tokens.push(Token::new("\n").at_line(self.line));
        }
        self.line += 1;
        self.at_line_start = true;
    }

    fn whitespace(&mut self, c: char) {
        match self.state {
            State::Quoted(_) => self.buffer.push(c),
            _ => self.flush(),
        }
    }

    fn quote(&mut self, c: char) {
        match self.state {
            State::Idle => self.start(State::Quoted(c)),
            State::Quoted(d) if d == c => {
                self.buffer.push(c);
                self.state = State::PotentialUnquote(d);
            }
            // The earlier quote was literal; this one may close.
            State::PotentialUnquote(d) if d == c => self.buffer.push(c),
            State::PotentialUnquote(d) => {
                self.buffer.push(c);
                self.state = State::Quoted(d);
            }
            _ => self.buffer.push(c),
        }
    }

    fn comment(&mut self) {
        self.flush();
        self.start(State::Comment);
        self.buffer.push('#');
    }

    fn character(&mut self, c: char) {
        match self.state {
            State::Idle => self.start(State::Bare),
            State::PotentialUnquote(d) => self.state = State::Quoted(d),
            _ => {}
        }
        self.buffer.push(c);
    }

    fn feed(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }

        let at_line_start = std::mem::replace(&mut self.at_line_start, false);
        if c == ';' && at_line_start {
            match self.state {
                State::SemicolonBlock => {
                    self.flush();
                    return;
                }
                State::Idle => {
                    self.start(State::SemicolonBlock);
                    return;
                }
                _ => {}
            }
        }

        match self.state {
            State::SemicolonBlock | State::Comment => self.buffer.push(c),
            _ => match c {
                '#' if matches!(self.state, State::Idle | State::Bare) => self.comment(),
                '\'' | '"' => self.quote(c),
                ' ' | '\t' | '\r' => self.whitespace(c),
                _ => self.character(c),
            },
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens
    }
}

/// Split text into tokens.
///
/// Newlines outside semicolon blocks become explicit `"\n"` tokens. Comments
/// are kept as single tokens starting with `#`. Quote and semicolon
/// delimiters are stripped and the resulting tokens are marked
/// [`delimited`](Token::delimited).
///
/// # Examples
///
/// ```
/// use nef_core::lex::tokenize;
///
/// let tokens = tokenize("'classed as 'unknown'");
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(tokens[0].text, "classed as 'unknown");
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text.len() / 4);
    for c in text.chars() {
        tokenizer.feed(c);
    }
    tokenizer.finish()
}
