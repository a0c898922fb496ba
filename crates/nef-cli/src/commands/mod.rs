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

//! CLI command implementations

mod inspect;
mod lint;
mod validate;

pub use inspect::inspect;
pub use lint::lint;
pub use validate::validate;

use crate::error::CliError;
use clap::ValueEnum;
use nef_core::{parse_with_options, ParseOptions, ParseOutput};
use std::fs;
use tracing::{debug, warn};

/// Default maximum file size (1 GB).
/// Can be overridden via the `NEF_MAX_FILE_SIZE` environment variable.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

fn get_max_file_size() -> u64 {
    std::env::var("NEF_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file from disk with size validation.
///
/// Files larger than `NEF_MAX_FILE_SIZE` bytes (default 1 GB) are rejected
/// before any content is read. Invalid UTF-8 sequences are replaced with
/// U+FFFD and logged as a warning.
///
/// # Examples
///
/// ```no_run
/// use nef_cli::commands::read_file;
///
/// # fn main() -> Result<(), nef_cli::error::CliError> {
/// let content = read_file("entry.nef")?;
/// assert!(content.starts_with("data_"));
/// # Ok(())
/// # }
/// ```
pub fn read_file(path: &str) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    let bytes = fs::read(path).map_err(|e| CliError::io_error(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path);
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            warn!("{} is not valid UTF-8; invalid bytes replaced", path);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(content)
}

/// Read and parse a file, strict unless `lenient` is set.
pub fn parse_file(path: &str, lenient: bool) -> Result<ParseOutput, CliError> {
    let content = read_file(path)?;
    let options = ParseOptions::builder().strict(!lenient).build();
    Ok(parse_with_options(&content, options)?)
}
