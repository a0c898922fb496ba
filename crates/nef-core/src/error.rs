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

//! Error and warning types for NEF parsing.

use std::fmt;
use thiserror::Error;

/// The kind of structural problem found while parsing.
///
/// Every kind is either always fatal, or fatal only in strict mode. In lenient
/// mode the parser applies a fixed recovery for the latter and records a
/// [`ParseWarning`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NefErrorKind {
    /// A second `data_` declaration.
    DuplicateDatablock,
    /// A non-comment token before any `data_` declaration.
    MissingDatablock,
    /// A construct the format reserves but this reader does not handle (`global_`).
    UnsupportedConstruct,
    /// `save_<name>` while another saveframe is open.
    NestedSaveframe,
    /// Bare `save_` with no open saveframe.
    UnnamedOrUnopenedSaveframe,
    /// A saveframe name declared twice.
    DuplicateSaveframe,
    /// `loop_` while another loop is open.
    NestedLoop,
    /// `stop_` with no open loop.
    StopWithoutLoop,
    /// Loop column whose category differs from the first column's.
    LoopColumnCategoryMismatch,
    /// Scalar field whose category differs from the saveframe's `sf_category`.
    FieldCategoryMismatch,
    /// Loop data count not a multiple of its column count.
    RaggedLoop,
    /// Data name or loop outside of any saveframe.
    DataOutsideSaveframe,
    /// Data value with nothing to assign it to.
    UnexpectedValue,
    /// Data name that never received its value.
    MissingValue,
    /// Data name without a `category.field` shape.
    MalformedDataName,
    /// Input ended inside a saveframe.
    UnterminatedSaveframe,
    /// Input ended inside a loop.
    UnterminatedLoop,
    /// A configured resource limit was exceeded.
    LimitExceeded,
}

impl NefErrorKind {
    /// Whether this kind aborts parsing regardless of mode.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::DuplicateDatablock
                | Self::UnsupportedConstruct
                | Self::NestedSaveframe
                | Self::UnnamedOrUnopenedSaveframe
                | Self::MalformedDataName
                | Self::LimitExceeded
        )
    }

    /// Whether lenient mode has a recovery for this kind.
    pub fn is_recoverable(self) -> bool {
        !self.is_fatal()
    }
}

impl fmt::Display for NefErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DuplicateDatablock => "DuplicateDatablock",
            Self::MissingDatablock => "MissingDatablock",
            Self::UnsupportedConstruct => "UnsupportedConstruct",
            Self::NestedSaveframe => "NestedSaveframe",
            Self::UnnamedOrUnopenedSaveframe => "UnnamedOrUnopenedSaveframe",
            Self::DuplicateSaveframe => "DuplicateSaveframe",
            Self::NestedLoop => "NestedLoop",
            Self::StopWithoutLoop => "StopWithoutLoop",
            Self::LoopColumnCategoryMismatch => "LoopColumnCategoryMismatch",
            Self::FieldCategoryMismatch => "FieldCategoryMismatch",
            Self::RaggedLoop => "RaggedLoop",
            Self::DataOutsideSaveframe => "DataOutsideSaveframe",
            Self::UnexpectedValue => "UnexpectedValue",
            Self::MissingValue => "MissingValue",
            Self::MalformedDataName => "MalformedDataName",
            Self::UnterminatedSaveframe => "UnterminatedSaveframe",
            Self::UnterminatedLoop => "UnterminatedLoop",
            Self::LimitExceeded => "LimitExceeded",
        };
        f.write_str(name)
    }
}

/// An error that stopped a NEF parse.
#[derive(Debug, Clone, Error)]
#[error("{kind} at line {line}: {message}")]
pub struct NefError {
    /// The kind of error.
    pub kind: NefErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Line number (1-based, 0 when the token carries no position).
    pub line: usize,
    /// Index of the offending token in the token stream.
    pub token: Option<usize>,
    /// Additional context (e.g., "in saveframe nef_molecular_system").
    pub context: Option<String>,
}

impl NefError {
    /// Create a new error.
    pub fn new(kind: NefErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            token: None,
            context: None,
        }
    }

    /// Add the index of the offending token.
    pub fn with_token(mut self, index: usize) -> Self {
        self.token = Some(index);
        self
    }

    /// Add context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether this error aborts parsing regardless of mode.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn limit(message: impl Into<String>, line: usize) -> Self {
        Self::new(NefErrorKind::LimitExceeded, message, line)
    }
}

/// Result type for NEF operations.
pub type NefResult<T> = Result<T, NefError>;

/// A recoverable problem that lenient mode worked around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// What went wrong.
    pub kind: NefErrorKind,
    /// Human-readable message, including the recovery taken.
    pub message: String,
    /// Line number (1-based, 0 when unknown).
    pub line: usize,
}

impl From<NefError> for ParseWarning {
    fn from(err: NefError) -> Self {
        let message = match err.context {
            Some(context) => format!("{} ({})", err.message, context),
            None => err.message,
        };
        Self {
            kind: err.kind,
            message,
            line: err.line,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.kind, self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [NefErrorKind; 18] = [
        NefErrorKind::DuplicateDatablock,
        NefErrorKind::MissingDatablock,
        NefErrorKind::UnsupportedConstruct,
        NefErrorKind::NestedSaveframe,
        NefErrorKind::UnnamedOrUnopenedSaveframe,
        NefErrorKind::DuplicateSaveframe,
        NefErrorKind::NestedLoop,
        NefErrorKind::StopWithoutLoop,
        NefErrorKind::LoopColumnCategoryMismatch,
        NefErrorKind::FieldCategoryMismatch,
        NefErrorKind::RaggedLoop,
        NefErrorKind::DataOutsideSaveframe,
        NefErrorKind::UnexpectedValue,
        NefErrorKind::MissingValue,
        NefErrorKind::MalformedDataName,
        NefErrorKind::UnterminatedSaveframe,
        NefErrorKind::UnterminatedLoop,
        NefErrorKind::LimitExceeded,
    ];

    // ==================== Classification ====================

    #[test]
    fn test_always_fatal_kinds() {
        assert!(NefErrorKind::DuplicateDatablock.is_fatal());
        assert!(NefErrorKind::UnsupportedConstruct.is_fatal());
        assert!(NefErrorKind::NestedSaveframe.is_fatal());
        assert!(NefErrorKind::UnnamedOrUnopenedSaveframe.is_fatal());
        assert!(NefErrorKind::MalformedDataName.is_fatal());
        assert!(NefErrorKind::LimitExceeded.is_fatal());
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(NefErrorKind::MissingDatablock.is_recoverable());
        assert!(NefErrorKind::NestedLoop.is_recoverable());
        assert!(NefErrorKind::StopWithoutLoop.is_recoverable());
        assert!(NefErrorKind::LoopColumnCategoryMismatch.is_recoverable());
        assert!(NefErrorKind::FieldCategoryMismatch.is_recoverable());
        assert!(NefErrorKind::RaggedLoop.is_recoverable());
        assert!(NefErrorKind::UnterminatedLoop.is_recoverable());
    }

    #[test]
    fn test_fatal_and_recoverable_are_exclusive() {
        for kind in ALL_KINDS {
            assert_ne!(kind.is_fatal(), kind.is_recoverable(), "{kind}");
        }
    }

    #[test]
    fn test_kind_display_matches_variant_name() {
        for kind in ALL_KINDS {
            assert_eq!(kind.to_string(), format!("{:?}", kind));
        }
    }

    // ==================== NefError ====================

    #[test]
    fn test_error_display() {
        let err = NefError::new(NefErrorKind::RaggedLoop, "5 values for 2 columns", 42);
        let msg = err.to_string();
        assert!(msg.contains("RaggedLoop"));
        assert!(msg.contains("line 42"));
        assert!(msg.contains("5 values for 2 columns"));
    }

    #[test]
    fn test_error_builders() {
        let err = NefError::new(NefErrorKind::NestedLoop, "nested", 3)
            .with_token(7)
            .with_context("in saveframe meta");
        assert_eq!(err.token, Some(7));
        assert_eq!(err.context.as_deref(), Some("in saveframe meta"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_limit_constructor() {
        let err = NefError::limit("too big", 0);
        assert_eq!(err.kind, NefErrorKind::LimitExceeded);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_is_std_error() {
        fn accepts_error<E: std::error::Error>(_: E) {}
        accepts_error(NefError::new(NefErrorKind::MissingValue, "x", 1));
    }

    // ==================== ParseWarning ====================

    #[test]
    fn test_warning_from_error_keeps_context() {
        let err = NefError::new(NefErrorKind::StopWithoutLoop, "stop_ outside loop", 9)
            .with_context("in saveframe a");
        let warning = ParseWarning::from(err);
        assert_eq!(warning.kind, NefErrorKind::StopWithoutLoop);
        assert_eq!(warning.line, 9);
        assert_eq!(warning.message, "stop_ outside loop (in saveframe a)");
    }

    #[test]
    fn test_warning_display() {
        let warning = ParseWarning {
            kind: NefErrorKind::RaggedLoop,
            message: "padded".to_string(),
            line: 12,
        };
        assert_eq!(warning.to_string(), "RaggedLoop at line 12: padded");
    }
}
