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

//! NEF command-line toolkit.
//!
//! - `nef validate FILE` parses a file and summarizes its structure
//! - `nef lint FILE` checks a parsed file against the saveframe schemas
//! - `nef inspect FILE` prints the document tree or its JSON form
//!
//! Every command accepts `--lenient` to recover from non-fatal parse problems.

pub mod cli;
pub mod commands;
pub mod error;
