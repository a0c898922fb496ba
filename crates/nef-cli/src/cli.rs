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

//! CLI command definitions and argument parsing.

use crate::commands::{self, OutputFormat};
use crate::error::CliError;
use clap::Subcommand;

/// NEF commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a NEF file and check its structure
    ///
    /// Reports the datablock and saveframes found. With --lenient, recoverable
    /// problems are repaired and listed instead of failing the parse.
    Validate {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Recover from non-fatal problems instead of failing
        #[arg(short, long)]
        lenient: bool,
    },

    /// Check a NEF file against the saveframe schemas
    ///
    /// Fails when an error is found, or a warning with --warn-error. Hints
    /// never fail the command.
    Lint {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Recover from non-fatal parse problems instead of failing
        #[arg(short, long)]
        lenient: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Treat warnings as errors
        #[arg(short = 'W', long)]
        warn_error: bool,
    },

    /// Print the parsed document structure
    Inspect {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Recover from non-fatal parse problems instead of failing
        #[arg(short, long)]
        lenient: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print loop rows
        #[arg(short, long)]
        rows: bool,
    },
}

impl Commands {
    /// Execute the command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Validate { file, lenient } => commands::validate(&file, lenient),
            Commands::Lint {
                file,
                lenient,
                format,
                warn_error,
            } => commands::lint(&file, lenient, format, warn_error),
            Commands::Inspect {
                file,
                lenient,
                format,
                rows,
            } => commands::inspect(&file, lenient, format, rows),
        }
    }
}
