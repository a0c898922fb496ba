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

//! Lint rules

use crate::diagnostic::{Category, Diagnostic, Severity};
use crate::schema::{self, LoopSchema, SaveframeSchema};
use nef_core::{Document, Loop, Saveframe, NULL_VALUE, SUPPORTED_FORMAT_VERSION};

/// Configuration for a single rule
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Whether the rule is enabled
    pub enabled: bool,
    /// Whether to treat warnings as errors
    pub error: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            error: false,
        }
    }
}

/// Trait for lint rules
pub trait LintRule: Send + Sync {
    /// Rule identifier
    fn id(&self) -> &str;

    /// Category the rule reports under
    fn category(&self) -> Category;

    /// Rule description
    fn description(&self) -> &str;

    /// Run the rule on a document
    fn check(&self, doc: &Document) -> Vec<Diagnostic>;
}

/// Collects diagnostics for one rule.
struct Findings<'a> {
    rule_id: &'a str,
    category: Category,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Findings<'a> {
    fn new(rule_id: &'a str, category: Category) -> Self {
        Self {
            rule_id,
            category,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.diagnostics
            .push(Diagnostic::new(severity, self.category, message, self.rule_id));
    }

    fn error(&mut self, message: String) {
        self.push(Severity::Error, message);
    }

    fn warning(&mut self, message: String) {
        self.push(Severity::Warning, message);
    }

    fn hint(&mut self, message: String) {
        self.push(Severity::Hint, message);
    }
}

/// Check a saveframe against its category schema, loops included.
fn check_saveframe(sf: &Saveframe, schema: &SaveframeSchema, out: &mut Findings<'_>) {
    let label = sf.name();

    for key in schema.required_keys() {
        if !sf.contains_key(key) {
            out.error(format!("{}: missing {} label.", label, key));
        }
    }
    if let Some(framecode) = sf.framecode() {
        if framecode != label {
            out.error(format!("sf_framecode {} must match key {}.", framecode, label));
        }
    }
    if let Some(category) = sf.category() {
        if category != schema.category {
            out.error(format!("sf_category {} must be {}.", category, schema.category));
        }
    }
    for key in sf.keys() {
        if !schema.allows(key) {
            out.warning(format!("Field '{}' not allowed in {}.", key, label));
        }
    }

    let dimensions = sf
        .scalar("num_dimensions")
        .and_then(|v| v.trim().parse::<usize>().ok());
    for (name, lp) in sf.loops() {
        if let Some(loop_schema) = schema.loop_schema(name) {
            let loop_label = format!("{}:{}", label, name);
            check_loop(lp, loop_schema, &loop_label, dimensions, out);
        }
    }
}

fn check_loop(
    lp: &Loop,
    schema: &LoopSchema,
    label: &str,
    dimensions: Option<usize>,
    out: &mut Findings<'_>,
) {
    for column in schema.required_columns(dimensions) {
        if lp.column_index(&column).is_none() {
            out.error(format!("{}: missing {} label.", label, column));
        }
    }
    for group in schema.alternates {
        if !group.iter().any(|c| lp.column_index(c).is_some()) {
            out.error(format!("{}: missing {} label.", label, group.join(" or ")));
        }
    }
    for column in lp.columns() {
        if !schema.allows(column, dimensions) {
            out.warning(format!("Field '{}' not allowed in {}.", column, label));
        }
    }
}

/// Rule: every saveframe carries `sf_category` and a matching `sf_framecode`.
pub struct SaveframeFieldsRule;

impl LintRule for SaveframeFieldsRule {
    fn id(&self) -> &str {
        "saveframe-fields"
    }

    fn category(&self) -> Category {
        Category::Saveframes
    }

    fn description(&self) -> &str {
        "Every saveframe needs sf_category and an sf_framecode equal to its name"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id(), self.category());
        for sf in doc.saveframes() {
            for key in schema::ALL_SAVEFRAME_FIELDS {
                if !sf.contains_key(key) {
                    out.error(format!("{}: missing {} label.", sf.name(), key));
                }
            }
            if let Some(framecode) = sf.framecode() {
                if framecode != sf.name() {
                    out.error(format!(
                        "sf_framecode {} must match key {}.",
                        framecode,
                        sf.name()
                    ));
                }
            }
        }
        out.diagnostics
    }
}

/// Rule: the mandatory saveframes are present.
pub struct RequiredSaveframesRule;

impl LintRule for RequiredSaveframesRule {
    fn id(&self) -> &str {
        "required-saveframes"
    }

    fn category(&self) -> Category {
        Category::RequiredSaveframes
    }

    fn description(&self) -> &str {
        "Metadata, molecular system and a chemical shift list must be present"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id(), self.category());
        for name in schema::REQUIRED_BY_NAME {
            if doc.get(name).is_none() {
                out.error(format!("Missing {} label.", name));
            }
        }
        for category in schema::REQUIRED_BY_CATEGORY {
            if doc.saveframes_by_category(category).next().is_none() {
                out.error(format!("No saveframes with sf_category: {}.", category));
            }
        }
        out.diagnostics
    }
}

/// Rule: the `nef_nmr_meta_data` saveframe.
pub struct MetadataRule;

impl LintRule for MetadataRule {
    fn id(&self) -> &str {
        "metadata"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn description(&self) -> &str {
        "Metadata saveframe fields, format name and format version"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id(), self.category());
        let Some(md) = doc.get(schema::META_DATA) else {
            out.error(format!("No {} saveframe.", schema::META_DATA));
            return out.diagnostics;
        };

        check_saveframe(md, &schema::META_DATA_SCHEMA, &mut out);

        if let Some(name) = md.scalar("format_name") {
            if name != schema::FORMAT_NAME {
                out.error(format!("format_name must be '{}'.", schema::FORMAT_NAME));
            }
        }
        if let Some(version) = md.scalar("format_version") {
            let major = major_version(version);
            if major != major_version(SUPPORTED_FORMAT_VERSION) {
                out.error(format!(
                    "This reader does not support format version {}.",
                    major
                ));
            }
        }
        out.diagnostics
    }
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Rule: the `nef_molecular_system` saveframe.
pub struct MolecularSystemRule;

impl LintRule for MolecularSystemRule {
    fn id(&self) -> &str {
        "molecular-system"
    }

    fn category(&self) -> Category {
        Category::MolecularSystem
    }

    fn description(&self) -> &str {
        "Molecular system saveframe with a non-empty sequence"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id(), self.category());
        let Some(ms) = doc.get(schema::MOLECULAR_SYSTEM) else {
            out.error(format!("No {} saveframe.", schema::MOLECULAR_SYSTEM));
            return out.diagnostics;
        };

        check_saveframe(ms, &schema::MOLECULAR_SYSTEM_SCHEMA, &mut out);

        if let Some(sequence) = ms.get_loop("nef_sequence") {
            if sequence.row_count() == 0 {
                out.error("Empty nef_sequence.".to_string());
            }
        }
        out.diagnostics
    }
}

/// Rule: every saveframe of one category matches that category's schema.
pub struct SaveframeListRule {
    id: &'static str,
    category: Category,
    description: &'static str,
    schema: &'static SaveframeSchema,
    /// Report when no saveframe of the category exists.
    required: bool,
}

impl SaveframeListRule {
    pub fn chemical_shift_lists() -> Self {
        Self {
            id: "chemical-shift-lists",
            category: Category::ChemicalShiftLists,
            description: "Chemical shift list saveframes",
            schema: &schema::CHEMICAL_SHIFT_LIST_SCHEMA,
            required: true,
        }
    }

    pub fn distance_restraint_lists() -> Self {
        Self {
            id: "distance-restraint-lists",
            category: Category::DistanceRestraintLists,
            description: "Distance restraint list saveframes",
            schema: &schema::DISTANCE_RESTRAINT_LIST_SCHEMA,
            required: false,
        }
    }

    pub fn dihedral_restraint_lists() -> Self {
        Self {
            id: "dihedral-restraint-lists",
            category: Category::DihedralRestraintLists,
            description: "Dihedral restraint list saveframes",
            schema: &schema::DIHEDRAL_RESTRAINT_LIST_SCHEMA,
            required: false,
        }
    }

    pub fn rdc_restraint_lists() -> Self {
        Self {
            id: "rdc-restraint-lists",
            category: Category::RdcRestraintLists,
            description: "RDC restraint list saveframes",
            schema: &schema::RDC_RESTRAINT_LIST_SCHEMA,
            required: false,
        }
    }

    pub fn peak_lists() -> Self {
        Self {
            id: "peak-lists",
            category: Category::PeakLists,
            description: "Spectrum and peak list saveframes",
            schema: &schema::PEAK_LIST_SCHEMA,
            required: false,
        }
    }
}

impl LintRule for SaveframeListRule {
    fn id(&self) -> &str {
        self.id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn description(&self) -> &str {
        self.description
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id, self.category);
        let mut found = false;
        for sf in doc.saveframes_by_category(self.schema.category) {
            found = true;
            check_saveframe(sf, self.schema, &mut out);
        }
        if self.required && !found {
            out.error(format!("No {} saveframes found.", self.schema.category));
        }
        out.diagnostics
    }
}

/// Rule: rows of a loop use the same set of columns.
///
/// A `.` cell counts as an absent column for its row. Every row is compared
/// against the union of columns used by any row of the same loop.
pub struct LoopConsistencyRule;

impl LintRule for LoopConsistencyRule {
    fn id(&self) -> &str {
        "loop-consistency"
    }

    fn category(&self) -> Category {
        Category::LoopConsistency
    }

    fn description(&self) -> &str {
        "Loop rows should all fill in the same columns"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut out = Findings::new(self.id(), self.category());
        for sf in doc.saveframes() {
            let Some(sf_schema) = sf.category().and_then(schema::schema_for) else {
                continue;
            };
            for (name, lp) in sf.loops() {
                let checked = sf_schema
                    .loop_schema(name)
                    .map_or(false, |l| l.consistency);
                if !checked {
                    continue;
                }
                for (row, column) in missing_cells(lp) {
                    out.hint(format!(
                        "{}:{} entry {}: missing {} label.",
                        sf.name(),
                        name,
                        row + 1,
                        column
                    ));
                }
            }
        }
        out.diagnostics
    }
}

/// Cells that are null in a row but filled in some other row.
fn missing_cells(lp: &Loop) -> Vec<(usize, &str)> {
    let mut used = vec![false; lp.column_count()];
    for row in lp.rows() {
        for (j, value) in row.iter().enumerate() {
            if value != NULL_VALUE {
                used[j] = true;
            }
        }
    }

    let mut missing = Vec::new();
    for (i, row) in lp.rows().enumerate() {
        for (j, value) in row.iter().enumerate() {
            if used[j] && value == NULL_VALUE {
                missing.push((i, lp.columns()[j].as_str()));
            }
        }
    }
    missing
}

/// The default rule set, in reporting order.
pub fn default_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(SaveframeFieldsRule),
        Box::new(RequiredSaveframesRule),
        Box::new(MetadataRule),
        Box::new(MolecularSystemRule),
        Box::new(SaveframeListRule::chemical_shift_lists()),
        Box::new(SaveframeListRule::distance_restraint_lists()),
        Box::new(SaveframeListRule::dihedral_restraint_lists()),
        Box::new(SaveframeListRule::rdc_restraint_lists()),
        Box::new(SaveframeListRule::peak_lists()),
        Box::new(LoopConsistencyRule),
    ]
}
