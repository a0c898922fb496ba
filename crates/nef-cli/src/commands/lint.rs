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

//! Lint command - NEF schema validation

use super::{parse_file, OutputFormat};
use crate::error::CliError;
use colored::Colorize;
use nef_lint::{group_by_category, lint_with_config, LintConfig, Severity};
use tracing::debug;

/// Validate a NEF file against the saveframe schemas.
///
/// Text output lists each diagnostic with its severity and category. JSON
/// output carries the diagnostics and the messages grouped by category.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or parsed, if any error-level
/// diagnostic is reported, or if a warning is reported with `warn_error`.
pub fn lint(file: &str, lenient: bool, format: OutputFormat, warn_error: bool) -> Result<(), CliError> {
    let output = parse_file(file, lenient)?;

    let config = LintConfig::default();
    let diagnostics = lint_with_config(&output.document, config);
    debug!("{} diagnostic(s) for {}", diagnostics.len(), file);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": file,
                "diagnostics": diagnostics.iter().map(|d| {
                    serde_json::json!({
                        "severity": d.severity().to_string(),
                        "category": d.category().as_str(),
                        "rule": d.rule_id(),
                        "message": d.message(),
                    })
                }).collect::<Vec<_>>(),
                "issues": group_by_category(&diagnostics),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if diagnostics.is_empty() {
                println!("{} {} - no issues found", "✓".green().bold(), file);
            } else {
                println!(
                    "{} {} - {} issue(s) found:",
                    "!".yellow().bold(),
                    file,
                    diagnostics.len()
                );
                for diag in &diagnostics {
                    let severity_str = match diag.severity() {
                        Severity::Error => "error".red(),
                        Severity::Warning => "warning".yellow(),
                        Severity::Hint => "hint".blue(),
                    };
                    println!(
                        "  {}: {} [{}]: {}",
                        file,
                        severity_str,
                        diag.category(),
                        diag.message()
                    );
                }
            }
        }
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Warning)
        .count();

    if errors > 0 || (warn_error && warnings > 0) {
        Err(CliError::LintErrors { errors, warnings })
    } else {
        Ok(())
    }
}
