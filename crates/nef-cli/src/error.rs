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

//! Structured error types for the NEF CLI.
//!
//! All commands return `Result<(), CliError>`; `main` prints the error and
//! exits with a failure status.

use nef_core::NefError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for NEF CLI operations.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// I/O operation failed (file read or metadata access).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// File size exceeds the configured maximum.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
        max_mb: u64,
    },

    /// The parser rejected the input.
    #[error("Parse error: {0}")]
    Parse(#[from] NefError),

    /// Validation found errors, or warnings under `--warn-error`.
    #[error("Lint failed: {errors} error(s), {warnings} warning(s)")]
    LintErrors { errors: usize, warnings: usize },

    /// JSON serialization error.
    #[error("JSON format error: {message}")]
    JsonFormat { message: String },
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonFormat {
            message: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nef_core::NefErrorKind;

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "entry.nef",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("entry.nef"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = CliError::file_too_large("big.nef", 200_000_000, 100 * 1024 * 1024);
        let msg = err.to_string();
        assert!(msg.contains("big.nef"));
        assert!(msg.contains("200000000 bytes"));
        assert!(msg.contains("100 MB"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: CliError = NefError::new(NefErrorKind::NestedSaveframe, "save_b inside save_a", 3).into();
        assert_eq!(
            err.to_string(),
            "Parse error: NestedSaveframe at line 3: save_b inside save_a"
        );
    }

    #[test]
    fn test_lint_errors_display() {
        let err = CliError::LintErrors { errors: 2, warnings: 1 };
        assert_eq!(err.to_string(), "Lint failed: 2 error(s), 1 warning(s)");
    }

    #[test]
    fn test_json_format_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let cli_err: CliError = json_err.into();
        assert!(matches!(cli_err, CliError::JsonFormat { .. }));
    }
}
