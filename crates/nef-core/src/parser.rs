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

//! Token-stream parser for NEF.
//!
//! The parser makes a single forward pass over the tokens, driving a small
//! state machine that builds the [`Document`]. It runs in one of two modes:
//!
//! - **Strict** (the default): any grammar violation fails the parse.
//! - **Lenient**: violations that have a deterministic recovery are repaired
//!   inline and reported as [`ParseWarning`]s. Violations that leave the
//!   document uninterpretable (a second datablock, nested saveframes, `global_`
//!   and a few others, see [`NefErrorKind::is_fatal`]) fail in both modes.
//!
//! # Recoveries
//!
//! | Kind | Lenient recovery |
//! |------|------------------|
//! | `MissingDatablock` | datablock named [`DEFAULT_DATABLOCK`] is synthesized |
//! | `DuplicateSaveframe` | earlier saveframe contents are replaced in place |
//! | `NestedLoop` | open loop is closed before the new one starts |
//! | `StopWithoutLoop` | ignored |
//! | `LoopColumnCategoryMismatch` | column accepted |
//! | `FieldCategoryMismatch` | value stored |
//! | `RaggedLoop` | data padded with `"."` to the next full row |
//! | `DataOutsideSaveframe` | data name dropped, loop parsed and discarded |
//! | `UnexpectedValue` | value dropped |
//! | `MissingValue` | data name dropped |
//! | `UnterminatedLoop` / `UnterminatedSaveframe` | closed at end of input |

use crate::document::{Document, Entry, Loop, Saveframe};
use crate::error::{NefError, NefErrorKind, NefResult, ParseWarning};
use crate::lex::token::keyword_suffix;
use crate::lex::{tokenize, Token, TokenKind};
use crate::limits::Limits;
use tracing::{debug, warn};

/// Datablock name synthesized in lenient mode when the input has none.
pub const DEFAULT_DATABLOCK: &str = "nef_default";

/// Parsing options.
///
/// # Examples
///
/// ```
/// use nef_core::ParseOptions;
///
/// let opts = ParseOptions::builder()
///     .strict(false)
///     .max_saveframes(500)
///     .build();
/// assert!(!opts.strict);
/// assert_eq!(opts.limits.max_saveframes, 500);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Resource limits.
    pub limits: Limits,
    /// Fail on every grammar violation instead of recovering.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            strict: true,
        }
    }
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    /// Default options in lenient mode.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }
}

/// Builder for ergonomic construction of ParseOptions.
#[derive(Debug, Clone)]
pub struct ParseOptionsBuilder {
    limits: Limits,
    strict: bool,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            strict: true,
        }
    }

    /// Set strict mode (default: true).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum input size in bytes (default: 1GB).
    pub fn max_input_size(mut self, size: usize) -> Self {
        self.limits.max_input_size = size;
        self
    }

    /// Set the maximum token length in bytes (default: 16MB).
    pub fn max_token_length(mut self, length: usize) -> Self {
        self.limits.max_token_length = length;
        self
    }

    /// Set the maximum number of saveframes (default: 100k).
    pub fn max_saveframes(mut self, count: usize) -> Self {
        self.limits.max_saveframes = count;
        self
    }

    /// Set the maximum number of columns per loop (default: 1000).
    pub fn max_loop_columns(mut self, count: usize) -> Self {
        self.limits.max_loop_columns = count;
        self
    }

    /// Build the ParseOptions.
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            limits: self.limits,
            strict: self.strict,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Side-channel results of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Recoveries applied in lenient mode, in input order.
    pub warnings: Vec<ParseWarning>,
    /// The last comment containing `key:` (case-insensitive), if any.
    pub key_hint: Option<String>,
}

impl ParseReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A parsed document together with its report.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub document: Document,
    pub report: ParseReport,
}

/// Parse NEF text in strict mode.
pub fn parse(input: &str) -> NefResult<Document> {
    parse_with_options(input, ParseOptions::default()).map(|output| output.document)
}

/// Parse NEF text with custom options.
pub fn parse_with_options(input: &str, options: ParseOptions) -> NefResult<ParseOutput> {
    if input.len() > options.limits.max_input_size {
        return Err(NefError::limit(
            format!(
                "input size {} bytes exceeds limit {}",
                input.len(),
                options.limits.max_input_size
            ),
            0,
        ));
    }

    let tokens = tokenize(input);
    let mut document = Document::new();
    let report = Parser::new(options).parse(&tokens, &mut document)?;
    Ok(ParseOutput { document, report })
}

/// Parse a token stream into `target`.
///
/// `target` is expected to be fresh; a target that already has a datablock
/// fails with `DuplicateDatablock` on the first `data_` token.
pub fn parse_tokens(tokens: &[Token], strict: bool, target: &mut Document) -> NefResult<ParseReport> {
    let options = ParseOptions::builder().strict(strict).build();
    Parser::new(options).parse(tokens, target)
}

/// The NEF structural parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Run one forward pass over `tokens`, populating `target`.
    ///
    /// On error `target` holds whatever was built before the failure.
    pub fn parse(&self, tokens: &[Token], target: &mut Document) -> NefResult<ParseReport> {
        let mut machine = Machine::new(&self.options, target);
        for (index, token) in tokens.iter().enumerate() {
            machine.step(index, token)?;
        }
        machine.finish(tokens.last().map_or(0, |t| t.line))
    }
}

/// Parser state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingDatablock,
    TopLevel,
    InSaveframe,
    InLoopColumns,
    InLoopData,
}

#[derive(Debug)]
struct OpenSaveframe {
    index: usize,
    name: String,
    /// The `sf_category` value, once assigned.
    category: Option<String>,
    /// Scalars stored before `sf_category` was known: (data-name category, line).
    unchecked: Vec<(String, usize)>,
}

#[derive(Debug)]
struct OpenLoop {
    category: Option<String>,
    columns: Vec<String>,
    data: Vec<String>,
    line: usize,
    /// Loops outside any saveframe are parsed but never committed.
    discard: bool,
}

#[derive(Debug)]
struct PendingName {
    category: String,
    field: String,
    line: usize,
}

struct Machine<'a> {
    options: &'a ParseOptions,
    target: &'a mut Document,
    state: State,
    saveframe: Option<OpenSaveframe>,
    open_loop: Option<OpenLoop>,
    pending: Option<PendingName>,
    report: ParseReport,
}

impl<'a> Machine<'a> {
    fn new(options: &'a ParseOptions, target: &'a mut Document) -> Self {
        let state = if target.datablock.is_some() {
            State::TopLevel
        } else {
            State::AwaitingDatablock
        };
        Self {
            options,
            target,
            state,
            saveframe: None,
            open_loop: None,
            pending: None,
            report: ParseReport::default(),
        }
    }

    fn error(&self, kind: NefErrorKind, message: impl Into<String>, line: usize) -> NefError {
        let err = NefError::new(kind, message, line);
        match &self.saveframe {
            Some(sf) => err.with_context(format!("in saveframe {}", sf.name)),
            None => err,
        }
    }

    /// Fail in strict mode or for fatal kinds, otherwise record a warning.
    fn recover(&mut self, err: NefError) -> NefResult<()> {
        if self.options.strict || err.is_fatal() {
            return Err(err);
        }
        warn!("{}", err);
        self.report.warnings.push(ParseWarning::from(err));
        Ok(())
    }

    fn step(&mut self, index: usize, token: &Token) -> NefResult<()> {
        let limit = self.options.limits.max_token_length;
        if token.text.len() > limit {
            return Err(NefError::limit(
                format!("token of {} bytes exceeds limit {}", token.text.len(), limit),
                token.line,
            )
            .with_token(index));
        }

        let kind = token.kind();
        match kind {
            TokenKind::Newline => return Ok(()),
            TokenKind::Comment => {
                if token.text.to_ascii_lowercase().contains("key:") {
                    self.report.key_hint = Some(token.text.clone());
                }
                return Ok(());
            }
            TokenKind::Datablock => return self.datablock(index, token),
            _ => {}
        }

        if self.state == State::AwaitingDatablock {
            self.recover(
                self.error(
                    NefErrorKind::MissingDatablock,
                    format!("'{}' before any data_ declaration", token),
                    token.line,
                )
                .with_token(index),
            )?;
            debug!("Synthesizing datablock {}", DEFAULT_DATABLOCK);
            self.target.datablock = Some(DEFAULT_DATABLOCK.to_string());
            self.state = State::TopLevel;
        }

        if kind != TokenKind::Value {
            self.drop_pending(token.line)?;
        }

        match kind {
            TokenKind::Global => Err(self
                .error(
                    NefErrorKind::UnsupportedConstruct,
                    format!("'{}' is not supported", token.text),
                    token.line,
                )
                .with_token(index)),
            TokenKind::SaveframeOpen => self.open_saveframe(index, token),
            TokenKind::SaveframeClose => self.close_saveframe(index, token),
            TokenKind::LoopOpen => self.open_loop(index, token),
            TokenKind::LoopClose => self.stop(index, token),
            TokenKind::DataName => self.data_name(index, token),
            TokenKind::Value => self.value(index, token),
            TokenKind::Newline | TokenKind::Comment | TokenKind::Datablock => Ok(()),
        }
    }

    fn datablock(&mut self, index: usize, token: &Token) -> NefResult<()> {
        if let Some(existing) = &self.target.datablock {
            return Err(self
                .error(
                    NefErrorKind::DuplicateDatablock,
                    format!("'{}' after datablock {} was declared", token.text, existing),
                    token.line,
                )
                .with_token(index));
        }
        let name = keyword_suffix(&token.text, "data_");
        debug!("Datablock {}", name);
        self.target.datablock = Some(name.to_string());
        self.state = State::TopLevel;
        Ok(())
    }

    fn open_saveframe(&mut self, index: usize, token: &Token) -> NefResult<()> {
        let name = keyword_suffix(&token.text, "save_").to_string();
        if let Some(open) = &self.saveframe {
            return Err(self
                .error(
                    NefErrorKind::NestedSaveframe,
                    format!("save_{} opened while save_{} is open", name, open.name),
                    token.line,
                )
                .with_token(index));
        }
        if self.open_loop.is_some() {
            self.close_loop(token.line)?;
        }

        let exists = self.target.contains(&name);
        if !exists && self.target.len() >= self.options.limits.max_saveframes {
            return Err(NefError::limit(
                format!(
                    "saveframe count exceeds limit {}",
                    self.options.limits.max_saveframes
                ),
                token.line,
            )
            .with_token(index));
        }
        if exists {
            self.recover(
                self.error(
                    NefErrorKind::DuplicateSaveframe,
                    format!("saveframe {} declared twice", name),
                    token.line,
                )
                .with_token(index),
            )?;
        }

        debug!("Opening saveframe {} at line {}", name, token.line);
        let (index, _) = self.target.insert(Saveframe::new(name.clone()));
        self.saveframe = Some(OpenSaveframe {
            index,
            name,
            category: None,
            unchecked: Vec::new(),
        });
        self.state = State::InSaveframe;
        Ok(())
    }

    fn close_saveframe(&mut self, index: usize, token: &Token) -> NefResult<()> {
        if self.open_loop.is_some() {
            self.close_loop(token.line)?;
        }
        match self.saveframe.take() {
            Some(sf) => {
                debug!("Closed saveframe {}", sf.name);
                self.state = State::TopLevel;
                Ok(())
            }
            None => Err(self
                .error(
                    NefErrorKind::UnnamedOrUnopenedSaveframe,
                    "save_ without an open saveframe",
                    token.line,
                )
                .with_token(index)),
        }
    }

    fn open_loop(&mut self, index: usize, token: &Token) -> NefResult<()> {
        if self.open_loop.is_some() {
            self.recover(
                self.error(
                    NefErrorKind::NestedLoop,
                    "loop_ while another loop is open; closing it",
                    token.line,
                )
                .with_token(index),
            )?;
            self.close_loop(token.line)?;
        }
        let discard = self.saveframe.is_none();
        if discard {
            self.recover(
                self.error(
                    NefErrorKind::DataOutsideSaveframe,
                    "loop_ outside of a saveframe; discarding it",
                    token.line,
                )
                .with_token(index),
            )?;
        }
        self.open_loop = Some(OpenLoop {
            category: None,
            columns: Vec::new(),
            data: Vec::new(),
            line: token.line,
            discard,
        });
        self.state = State::InLoopColumns;
        Ok(())
    }

    fn stop(&mut self, index: usize, token: &Token) -> NefResult<()> {
        if self.open_loop.is_some() {
            return self.close_loop(token.line);
        }
        self.recover(
            self.error(
                NefErrorKind::StopWithoutLoop,
                "stop_ without an open loop; ignored",
                token.line,
            )
            .with_token(index),
        )
    }

    fn data_name(&mut self, index: usize, token: &Token) -> NefResult<()> {
        let (category, field) = split_data_name(&token.text).ok_or_else(|| {
            self.error(
                NefErrorKind::MalformedDataName,
                format!("'{}' is not of the form _category.field", token.text),
                token.line,
            )
            .with_token(index)
        })?;

        if self.state == State::InLoopData {
            self.close_loop(token.line)?;
        }

        match self.state {
            State::InLoopColumns => self.add_column(index, token, category, field),
            State::InSaveframe => {
                self.pending = Some(PendingName {
                    category: category.to_string(),
                    field: field.to_string(),
                    line: token.line,
                });
                Ok(())
            }
            _ => self.recover(
                self.error(
                    NefErrorKind::DataOutsideSaveframe,
                    format!("'{}' outside of a saveframe; dropped", token.text),
                    token.line,
                )
                .with_token(index),
            ),
        }
    }

    fn add_column(&mut self, index: usize, token: &Token, category: &str, field: &str) -> NefResult<()> {
        let max_columns = self.options.limits.max_loop_columns;
        let (expected, count) = match &self.open_loop {
            Some(lp) => (lp.category.clone(), lp.columns.len()),
            None => return Ok(()),
        };
        if count >= max_columns {
            return Err(NefError::limit(
                format!("loop column count exceeds limit {}", max_columns),
                token.line,
            )
            .with_token(index));
        }
        if let Some(expected) = &expected {
            if expected != category {
                self.recover(
                    self.error(
                        NefErrorKind::LoopColumnCategoryMismatch,
                        format!(
                            "column '{}' does not belong to loop category {}",
                            token.text, expected
                        ),
                        token.line,
                    )
                    .with_token(index),
                )?;
            }
        }
        if let Some(lp) = self.open_loop.as_mut() {
            lp.category.get_or_insert_with(|| category.to_string());
            lp.columns.push(field.to_string());
        }
        Ok(())
    }

    fn value(&mut self, index: usize, token: &Token) -> NefResult<()> {
        if self.state == State::InLoopColumns {
            self.state = State::InLoopData;
        }
        if self.state == State::InLoopData {
            if let Some(lp) = self.open_loop.as_mut() {
                lp.data.push(token.text.clone());
            }
            return Ok(());
        }

        match self.pending.take() {
            Some(name) if self.state == State::InSaveframe => self.assign(name, token),
            _ => self.recover(
                self.error(
                    NefErrorKind::UnexpectedValue,
                    format!("value '{}' has no data name; dropped", token),
                    token.line,
                )
                .with_token(index),
            ),
        }
    }

    /// Store a scalar, checking its category against `sf_category`.
    fn assign(&mut self, name: PendingName, token: &Token) -> NefResult<()> {
        let Some(sf) = self.saveframe.as_mut() else {
            return Ok(());
        };

        // A reassigned sf_category is checked against the value it replaces.
        let mut to_check: Vec<(String, usize)> = Vec::new();
        let expected = match sf.category.clone() {
            Some(current) => {
                to_check.push((name.category.clone(), name.line));
                current
            }
            None if name.field == "sf_category" => {
                to_check.append(&mut sf.unchecked);
                to_check.push((name.category.clone(), name.line));
                token.text.clone()
            }
            None => {
                sf.unchecked.push((name.category.clone(), name.line));
                String::new()
            }
        };
        if name.field == "sf_category" {
            sf.category = Some(token.text.clone());
        }

        let sf_index = sf.index;
        for (category, line) in to_check {
            if category != expected {
                self.recover(self.error(
                    NefErrorKind::FieldCategoryMismatch,
                    format!(
                        "field category {} does not match sf_category {}",
                        category, expected
                    ),
                    line,
                ))?;
            }
        }

        if let Some(saveframe) = self.target.saveframe_at_mut(sf_index) {
            saveframe.insert_scalar(name.field, token.text.clone());
        }
        Ok(())
    }

    fn drop_pending(&mut self, line: usize) -> NefResult<()> {
        match self.pending.take() {
            Some(name) => self.recover(self.error(
                NefErrorKind::MissingValue,
                format!(
                    "_{}.{} (line {}) has no value; dropped",
                    name.category, name.field, name.line
                ),
                line,
            )),
            None => Ok(()),
        }
    }

    /// Validate and commit the open loop, then return to the enclosing state.
    fn close_loop(&mut self, line: usize) -> NefResult<()> {
        let Some(mut lp) = self.open_loop.take() else {
            return Ok(());
        };
        self.state = if self.saveframe.is_some() {
            State::InSaveframe
        } else {
            State::TopLevel
        };

        let key = lp.category.take().unwrap_or_default();
        let mut committed = Loop::with_data(lp.columns, lp.data);
        if committed.column_count() == 0 {
            committed.data.clear();
        } else if committed.is_ragged() {
            self.recover(self.error(
                NefErrorKind::RaggedLoop,
                format!(
                    "loop _{} (line {}) has {} values for {} columns; padding with '.'",
                    key,
                    lp.line,
                    committed.data.len(),
                    committed.column_count()
                ),
                line,
            ))?;
        }

        if lp.discard {
            debug!("Discarding loop from line {}", lp.line);
            return Ok(());
        }

        committed.pad_to_complete_rows();
        debug!(
            "Committing loop {} with {} columns and {} rows",
            key,
            committed.column_count(),
            committed.row_count()
        );
        if let Some(index) = self.saveframe.as_ref().map(|sf| sf.index) {
            if let Some(saveframe) = self.target.saveframe_at_mut(index) {
                saveframe.insert(key, Entry::Loop(committed));
            }
        }
        Ok(())
    }

    fn finish(mut self, line: usize) -> NefResult<ParseReport> {
        self.drop_pending(line)?;
        if let Some(lp) = &self.open_loop {
            let err = self.error(
                NefErrorKind::UnterminatedLoop,
                format!("loop from line {} still open at end of input", lp.line),
                line,
            );
            self.recover(err)?;
            self.close_loop(line)?;
        }
        if let Some(sf) = &self.saveframe {
            let err = self.error(
                NefErrorKind::UnterminatedSaveframe,
                format!("save_{} still open at end of input", sf.name),
                line,
            );
            self.recover(err)?;
            self.saveframe = None;
        }
        Ok(self.report)
    }
}

/// Split `_category.field` into its parts.
fn split_data_name(text: &str) -> Option<(&str, &str)> {
    let (category, field) = text.strip_prefix('_')?.split_once('.')?;
    if category.is_empty() || field.is_empty() {
        return None;
    }
    Some((category, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(texts: &[&str]) -> Vec<Token> {
        texts.iter().map(|t| Token::new(*t)).collect()
    }

    fn run(texts: &[&str], strict: bool) -> NefResult<(Document, ParseReport)> {
        let mut doc = Document::new();
        let report = parse_tokens(&tokens(texts), strict, &mut doc)?;
        Ok((doc, report))
    }

    fn kind_of(texts: &[&str], strict: bool) -> NefErrorKind {
        run(texts, strict).unwrap_err().kind
    }

    // ==================== ParseOptions ====================

    #[test]
    fn test_default_options_are_strict() {
        let opts = ParseOptions::default();
        assert!(opts.strict);
        assert_eq!(opts.limits, Limits::default());
        assert!(!ParseOptions::lenient().strict);
    }

    #[test]
    fn test_builder_sets_limits() {
        let opts = ParseOptions::builder()
            .strict(false)
            .max_input_size(10)
            .max_token_length(20)
            .max_saveframes(30)
            .max_loop_columns(40)
            .build();
        assert!(!opts.strict);
        assert_eq!(opts.limits.max_input_size, 10);
        assert_eq!(opts.limits.max_token_length, 20);
        assert_eq!(opts.limits.max_saveframes, 30);
        assert_eq!(opts.limits.max_loop_columns, 40);
    }

    #[test]
    fn test_builder_default_matches_new() {
        let a = ParseOptionsBuilder::default().build();
        let b = ParseOptionsBuilder::new().build();
        assert_eq!(a.strict, b.strict);
        assert_eq!(a.limits, b.limits);
    }

    // ==================== Datablock ====================

    #[test]
    fn test_datablock_declaration() {
        let (doc, _) = run(&["data_nef_my_nmr_project"], true).unwrap();
        assert_eq!(doc.datablock(), Some("nef_my_nmr_project"));
    }

    #[test]
    fn test_duplicate_datablock_fails_in_both_modes() {
        let input = ["data_a", "data_b"];
        assert_eq!(kind_of(&input, true), NefErrorKind::DuplicateDatablock);
        assert_eq!(kind_of(&input, false), NefErrorKind::DuplicateDatablock);
    }

    #[test]
    fn test_missing_datablock_strict() {
        assert_eq!(kind_of(&["save_a", "save_"], true), NefErrorKind::MissingDatablock);
    }

    #[test]
    fn test_missing_datablock_lenient_synthesizes_once() {
        let (doc, report) = run(&["save_a", "save_", "save_b", "save_"], false).unwrap();
        assert_eq!(doc.datablock(), Some(DEFAULT_DATABLOCK));
        assert_eq!(doc.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, NefErrorKind::MissingDatablock);
    }

    #[test]
    fn test_newlines_and_comments_before_datablock() {
        let (doc, _) = run(&["# header", "\n", "data_x"], true).unwrap();
        assert_eq!(doc.datablock(), Some("x"));
    }

    #[test]
    fn test_empty_stream_yields_empty_document() {
        for strict in [true, false] {
            let (doc, report) = run(&["\n", "# c"], strict).unwrap();
            assert!(doc.datablock().is_none());
            assert!(doc.is_empty());
            assert!(report.warnings.is_empty());
        }
    }

    #[test]
    fn test_global_is_unsupported() {
        assert_eq!(kind_of(&["data_x", "global_"], false), NefErrorKind::UnsupportedConstruct);
    }

    // ==================== Saveframes ====================

    #[test]
    fn test_saveframes_in_order() {
        let (doc, _) = run(
            &["data_x", "save_nef_nmr_meta_data", "save_", "save_cyana_additional_data_1", "save_"],
            true,
        )
        .unwrap();
        let names: Vec<_> = doc.saveframe_names().collect();
        assert_eq!(names, vec!["nef_nmr_meta_data", "cyana_additional_data_1"]);
    }

    #[test]
    fn test_nested_saveframe_fails_in_both_modes() {
        let input = ["data_x", "save_a", "save_b", "save_", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::NestedSaveframe);
        assert_eq!(kind_of(&input, false), NefErrorKind::NestedSaveframe);
    }

    #[test]
    fn test_close_without_open_fails() {
        assert_eq!(
            kind_of(&["data_x", "save_"], false),
            NefErrorKind::UnnamedOrUnopenedSaveframe
        );
    }

    #[test]
    fn test_duplicate_saveframe() {
        let input = ["data_x", "save_a", "_c.x", "1", "save_", "save_b", "save_", "save_a", "_c.y", "2", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::DuplicateSaveframe);

        let (doc, report) = run(&input, false).unwrap();
        assert_eq!(doc.saveframe_names().collect::<Vec<_>>(), vec!["a", "b"]);
        let a = doc.get("a").unwrap();
        assert_eq!(a.scalar("y"), Some("2"));
        assert!(a.scalar("x").is_none());
        assert_eq!(report.warnings[0].kind, NefErrorKind::DuplicateSaveframe);
    }

    // ==================== Scalars ====================

    #[test]
    fn test_scalar_assignment() {
        let (doc, _) = run(
            &["data_x", "save_m", "_nef_nmr_meta_data.sf_category", "nef_nmr_meta_data", "_nef_nmr_meta_data.format_version", "0.8", "save_"],
            true,
        )
        .unwrap();
        let sf = doc.get("m").unwrap();
        assert_eq!(sf.category(), Some("nef_nmr_meta_data"));
        assert_eq!(sf.scalar("format_version"), Some("0.8"));
    }

    #[test]
    fn test_field_category_mismatch() {
        let input = ["data_x", "save_m", "_meta.sf_category", "meta", "_other.x", "1", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::FieldCategoryMismatch);

        let (doc, report) = run(&input, false).unwrap();
        assert_eq!(doc.get("m").unwrap().scalar("x"), Some("1"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_field_before_sf_category_is_checked() {
        let input = ["data_x", "save_m", "_other.x", "1", "_meta.sf_category", "meta", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::FieldCategoryMismatch);
    }

    #[test]
    fn test_sf_category_name_itself_is_checked() {
        let input = ["data_x", "save_m", "_wrong.sf_category", "meta", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::FieldCategoryMismatch);
    }

    #[test]
    fn test_sf_category_reassignment_checks_against_current_value() {
        let input = ["data_x", "save_m", "_a.sf_category", "a", "_b.sf_category", "b", "_b.x", "1", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::FieldCategoryMismatch);

        let (doc, report) = run(&input, false).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, NefErrorKind::FieldCategoryMismatch);
        assert!(report.warnings[0].message.contains("field category b does not match sf_category a"));
        let sf = doc.get("m").unwrap();
        assert_eq!(sf.category(), Some("b"));
        assert_eq!(sf.scalar("x"), Some("1"));
    }

    #[test]
    fn test_matching_fields_in_any_order() {
        let input = ["data_x", "save_m", "_meta.sf_framecode", "m", "_meta.sf_category", "meta", "_meta.y", "2", "save_"];
        let (doc, report) = run(&input, true).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(doc.get("m").unwrap().keys().collect::<Vec<_>>(), vec!["sf_framecode", "sf_category", "y"]);
    }

    #[test]
    fn test_missing_value() {
        let input = ["data_x", "save_m", "_c.a", "_c.b", "2", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::MissingValue);

        let (doc, report) = run(&input, false).unwrap();
        let sf = doc.get("m").unwrap();
        assert!(sf.get("a").is_none());
        assert_eq!(sf.scalar("b"), Some("2"));
        assert_eq!(report.warnings[0].kind, NefErrorKind::MissingValue);
    }

    #[test]
    fn test_unexpected_value() {
        let input = ["data_x", "save_m", "stray", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::UnexpectedValue);
        let (doc, _) = run(&input, false).unwrap();
        assert!(doc.get("m").unwrap().is_empty());
    }

    #[test]
    fn test_data_name_outside_saveframe() {
        let input = ["data_x", "_c.a", "1"];
        assert_eq!(kind_of(&input, true), NefErrorKind::DataOutsideSaveframe);
        let (_, report) = run(&input, false).unwrap();
        let kinds: Vec<_> = report.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![NefErrorKind::DataOutsideSaveframe, NefErrorKind::UnexpectedValue]);
    }

    #[test]
    fn test_malformed_data_name_is_fatal() {
        for bad in ["_nodot", "_.field", "_cat."] {
            assert_eq!(
                kind_of(&["data_x", "save_m", bad, "1", "save_"], false),
                NefErrorKind::MalformedDataName,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_split_data_name() {
        assert_eq!(split_data_name("_nef_sequence.chain_code"), Some(("nef_sequence", "chain_code")));
        assert_eq!(split_data_name("_a.b.c"), Some(("a", "b.c")));
        assert_eq!(split_data_name("a.b"), None);
    }

    // ==================== Loops ====================

    #[test]
    fn test_loop_with_stop() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "_l.b", "1", "2", "3", "4", "stop_", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        let lp = doc.get("m").unwrap().get_loop("l").unwrap();
        assert_eq!(lp.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(lp.row_count(), 2);
    }

    #[test]
    fn test_loop_closed_by_data_name() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "1", "2", "_m.x", "v", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        let sf = doc.get("m").unwrap();
        assert_eq!(sf.get_loop("l").unwrap().row_count(), 2);
        assert_eq!(sf.scalar("x"), Some("v"));
    }

    #[test]
    fn test_loop_closed_by_saveframe_close() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "1", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        assert!(doc.get("m").unwrap().get_loop("l").is_some());
    }

    #[test]
    fn test_two_loops_in_one_saveframe() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "1", "stop_", "loop_", "_k.b", "2", "stop_", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        let keys: Vec<_> = doc.get("m").unwrap().keys().collect();
        assert_eq!(keys, vec!["l", "k"]);
    }

    #[test]
    fn test_ragged_loop() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "_l.b", "1", "2", "3", "4", "5", "stop_", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::RaggedLoop);

        let (doc, report) = run(&input, false).unwrap();
        let lp = doc.get("m").unwrap().get_loop("l").unwrap();
        assert_eq!(lp.row_count(), 3);
        assert_eq!(lp.cell(2, "b"), Some("."));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_nested_loop() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "1", "loop_", "_k.b", "2", "stop_", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::NestedLoop);

        let (doc, report) = run(&input, false).unwrap();
        let sf = doc.get("m").unwrap();
        assert!(sf.get_loop("l").is_some());
        assert!(sf.get_loop("k").is_some());
        assert_eq!(report.warnings[0].kind, NefErrorKind::NestedLoop);
    }

    #[test]
    fn test_stop_without_loop() {
        let input = ["data_x", "save_m", "stop_", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::StopWithoutLoop);
        let (doc, report) = run(&input, false).unwrap();
        assert!(doc.get("m").unwrap().is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_loop_column_category_mismatch() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "_k.b", "1", "2", "stop_", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::LoopColumnCategoryMismatch);

        let (doc, _) = run(&input, false).unwrap();
        let lp = doc.get("m").unwrap().get_loop("l").unwrap();
        assert_eq!(lp.column_count(), 2);
    }

    #[test]
    fn test_empty_loop_uses_empty_key() {
        let input = ["data_x", "save_m", "loop_", "stop_", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        let lp = doc.get("m").unwrap().get_loop("").unwrap();
        assert_eq!(lp.column_count(), 0);
        assert!(lp.data().is_empty());
    }

    #[test]
    fn test_loop_with_columns_and_no_rows() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "_l.b", "stop_", "save_"];
        let (doc, _) = run(&input, true).unwrap();
        let lp = doc.get("m").unwrap().get_loop("l").unwrap();
        assert_eq!(lp.column_count(), 2);
        assert_eq!(lp.row_count(), 0);
    }

    #[test]
    fn test_top_level_loop_is_discarded() {
        let input = ["data_x", "loop_", "_l.a", "1", "stop_", "save_m", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::DataOutsideSaveframe);
        let (doc, report) = run(&input, false).unwrap();
        assert_eq!(doc.len(), 1);
        assert!(doc.get("m").unwrap().is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    // ==================== End of input ====================

    #[test]
    fn test_unterminated_loop() {
        let input = ["data_x", "save_m", "loop_", "_l.a", "1"];
        assert_eq!(kind_of(&input, true), NefErrorKind::UnterminatedLoop);

        let (doc, report) = run(&input, false).unwrap();
        assert!(doc.get("m").unwrap().get_loop("l").is_some());
        let kinds: Vec<_> = report.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![NefErrorKind::UnterminatedLoop, NefErrorKind::UnterminatedSaveframe]);
    }

    #[test]
    fn test_unterminated_saveframe() {
        let input = ["data_x", "save_m", "_c.a", "1"];
        assert_eq!(kind_of(&input, true), NefErrorKind::UnterminatedSaveframe);
        let (doc, _) = run(&input, false).unwrap();
        assert_eq!(doc.get("m").unwrap().scalar("a"), Some("1"));
    }

    #[test]
    fn test_pending_name_at_end_of_input() {
        let input = ["data_x", "save_m", "_c.a", "save_"];
        assert_eq!(kind_of(&input, true), NefErrorKind::MissingValue);
    }

    // ==================== Comments and hints ====================

    #[test]
    fn test_key_hint_is_recorded() {
        let (_, report) = run(&["data_x", "# Key: chain_code", "save_m", "save_"], true).unwrap();
        assert_eq!(report.key_hint.as_deref(), Some("# Key: chain_code"));
    }

    #[test]
    fn test_comment_without_key_is_ignored() {
        let (_, report) = run(&["data_x", "# just a note"], true).unwrap();
        assert!(report.key_hint.is_none());
    }

    // ==================== Delimited tokens ====================

    #[test]
    fn test_delimited_keyword_is_a_value() {
        let input = vec![
            Token::new("data_x"),
            Token::new("save_m"),
            Token::new("_c.a"),
            Token::quoted("loop_"),
            Token::new("save_"),
        ];
        let mut doc = Document::new();
        parse_tokens(&input, true, &mut doc).unwrap();
        assert_eq!(doc.get("m").unwrap().scalar("a"), Some("loop_"));
    }

    // ==================== Limits ====================

    #[test]
    fn test_input_size_limit() {
        let opts = ParseOptions::builder().max_input_size(4).build();
        let err = parse_with_options("data_x", opts).unwrap_err();
        assert_eq!(err.kind, NefErrorKind::LimitExceeded);
    }

    #[test]
    fn test_token_length_limit() {
        let opts = ParseOptions::builder().strict(false).max_token_length(6).build();
        let err = parse_with_options("data_x\nsave_long_name\nsave_\n", opts).unwrap_err();
        assert_eq!(err.kind, NefErrorKind::LimitExceeded);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_saveframe_limit() {
        let opts = ParseOptions::builder().max_saveframes(1).build();
        let err = parse_with_options("data_x save_a save_ save_b save_", opts).unwrap_err();
        assert_eq!(err.kind, NefErrorKind::LimitExceeded);
    }

    #[test]
    fn test_loop_column_limit() {
        let opts = ParseOptions::builder().strict(false).max_loop_columns(1).build();
        let err = parse_with_options("data_x save_a loop_ _l.a _l.b stop_ save_", opts).unwrap_err();
        assert_eq!(err.kind, NefErrorKind::LimitExceeded);
    }

    // ==================== Text entry points ====================

    #[test]
    fn test_parse_text() {
        let doc = parse("data_x\nsave_m\n_m.sf_category m\nsave_\n").unwrap();
        assert_eq!(doc.get("m").unwrap().category(), Some("m"));
    }

    #[test]
    fn test_errors_carry_lines_and_context() {
        let err = parse("data_x\nsave_m\nstop_\nsave_\n").unwrap_err();
        assert_eq!(err.kind, NefErrorKind::StopWithoutLoop);
        assert_eq!(err.line, 3);
        assert_eq!(err.token, Some(4));
        assert_eq!(err.context.as_deref(), Some("in saveframe m"));
    }
}
