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

//! Validate command - NEF syntax and structure checking

use super::parse_file;
use crate::error::CliError;
use colored::Colorize;

/// Parse a NEF file and report whether it is structurally valid.
///
/// Prints the datablock name and the saveframes found. In lenient mode every
/// recovery applied by the parser is listed as a warning; the command still
/// succeeds.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or the parser fails.
pub fn validate(file: &str, lenient: bool) -> Result<(), CliError> {
    let output = match parse_file(file, lenient) {
        Ok(output) => output,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), file);
            return Err(e);
        }
    };
    let doc = &output.document;

    println!("{} {}", "✓".green().bold(), file);
    println!("  Datablock: {}", doc.datablock().unwrap_or("-"));
    println!("  Saveframes: {}", doc.len());
    for sf in doc.saveframes() {
        println!(
            "    {} ({})",
            sf.name(),
            sf.category().unwrap_or("no sf_category")
        );
    }
    if lenient {
        println!("  Mode: lenient");
    }

    if output.report.has_warnings() {
        println!(
            "  {} {} recovered problem(s):",
            "!".yellow().bold(),
            output.report.warnings.len()
        );
        for warning in &output.report.warnings {
            println!("    {}", warning.to_string().yellow());
        }
    }
    Ok(())
}
