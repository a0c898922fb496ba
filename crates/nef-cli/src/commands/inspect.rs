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

//! Inspect command - NEF structure visualization

use super::{parse_file, OutputFormat};
use crate::error::CliError;
use colored::Colorize;
use nef_core::{Entry, Loop, NULL_VALUE};

/// Print the parsed structure of a NEF file.
///
/// Text output is a tree of saveframes with their scalars and loops; with
/// `verbose`, loop rows are printed as well. JSON output is the serialized
/// document.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or parsed.
pub fn inspect(file: &str, lenient: bool, format: OutputFormat, verbose: bool) -> Result<(), CliError> {
    let output = parse_file(file, lenient)?;
    let doc = &output.document;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(doc)?);
        return Ok(());
    }

    println!("{}", "NEF Document".bold().underline());
    println!();
    println!("{}  {}", "Datablock:".cyan(), doc.datablock().unwrap_or("-"));
    if let Some(hint) = &output.report.key_hint {
        println!("{}  {}", "Key:".cyan(), hint.trim_start_matches('#').trim());
    }

    for sf in doc.saveframes() {
        println!();
        println!("{}{}", "save_".dimmed(), sf.name().green().bold());
        for (key, entry) in sf.iter() {
            match entry {
                Entry::Scalar(value) => {
                    println!("  {}: {}", key.yellow(), format_value(value));
                }
                Entry::Loop(lp) => print_loop(key, lp, verbose),
            }
        }
    }

    Ok(())
}

fn print_loop(key: &str, lp: &Loop, verbose: bool) {
    println!(
        "  {}: loop ({} columns, {} rows)",
        key.yellow(),
        lp.column_count(),
        lp.row_count()
    );
    println!("    [{}]", lp.columns().join(", "));
    if verbose {
        for (i, row) in lp.rows().enumerate() {
            let cells: Vec<String> = row.iter().map(|v| format_value(v)).collect();
            println!("    {:>4}  {}", i + 1, cells.join("  "));
        }
    }
}

fn format_value(value: &str) -> String {
    if value == NULL_VALUE {
        value.dimmed().to_string()
    } else if value.contains(char::is_whitespace) || value.is_empty() {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}
