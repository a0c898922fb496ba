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

//! Schema validation for parsed NEF documents.
//!
//! Validation never fails: problems come back as [`Diagnostic`]s grouped
//! into [`Category`]s, for the caller to report or act on.
//!
//! ```
//! use nef_core::parse;
//!
//! let doc = parse("data_x\nsave_a\n_a.sf_category a\n_a.sf_framecode b\nsave_\n").unwrap();
//! let issues = nef_lint::validate(&doc);
//! assert_eq!(issues["SAVEFRAMES"], vec!["sf_framecode b must match key a."]);
//! assert!(issues["LOOP_CONSISTENCY"].is_empty());
//! ```

mod diagnostic;
mod rules;
mod runner;
pub mod schema;

pub use diagnostic::{Category, Diagnostic, Severity};
pub use rules::{
    default_rules, LintRule, LoopConsistencyRule, MetadataRule, MolecularSystemRule,
    RequiredSaveframesRule, RuleConfig, SaveframeFieldsRule, SaveframeListRule,
};
pub use runner::{LintConfig, LintConfigError, LintRunner};

use nef_core::Document;
use std::collections::BTreeMap;

pub fn lint(doc: &Document) -> Vec<Diagnostic> {
    let runner = LintRunner::new(LintConfig::default());
    runner.run(doc)
}

pub fn lint_with_config(doc: &Document, config: LintConfig) -> Vec<Diagnostic> {
    let runner = LintRunner::new(config);
    runner.run(doc)
}

/// Validate a document, returning issue messages by category name.
///
/// Every category is present as a key, with an empty list when it has no
/// issues. Nothing is capped or filtered.
pub fn validate(doc: &Document) -> BTreeMap<String, Vec<String>> {
    let config = LintConfig {
        max_diagnostics: usize::MAX,
        ..LintConfig::default()
    };
    group_by_category(&lint_with_config(doc, config))
}

/// Group diagnostic messages by category name, with every category present.
pub fn group_by_category(diagnostics: &[Diagnostic]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), Vec::new()))
        .collect();
    for diag in diagnostics {
        grouped
            .entry(diag.category().as_str().to_string())
            .or_default()
            .push(diag.message().to_string());
    }
    grouped
}

/// Whether a document has no warnings or errors.
///
/// Hints, such as sparse optional loop columns, do not affect validity.
pub fn is_valid(doc: &Document) -> bool {
    let config = LintConfig {
        min_severity: Severity::Warning,
        ..LintConfig::default()
    };
    lint_with_config(doc, config).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nef_core::Saveframe;

    #[test]
    fn test_validate_has_every_category() {
        let issues = validate(&Document::new());
        for category in Category::ALL {
            assert!(issues.contains_key(category.as_str()), "{category}");
        }
        assert_eq!(issues.len(), Category::ALL.len());
    }

    #[test]
    fn test_validate_empty_document() {
        let issues = validate(&Document::new());
        assert_eq!(
            issues["REQUIRED_SAVEFRAMES"],
            vec![
                "Missing nef_nmr_meta_data label.",
                "Missing nef_molecular_system label.",
                "No saveframes with sf_category: nef_chemical_shift_list.",
            ]
        );
        assert_eq!(issues["METADATA"], vec!["No nef_nmr_meta_data saveframe."]);
        assert_eq!(issues["MOLECULAR_SYSTEM"], vec!["No nef_molecular_system saveframe."]);
        assert_eq!(
            issues["CHEMICAL_SHIFT_LISTS"],
            vec!["No nef_chemical_shift_list saveframes found."]
        );
        assert!(issues["SAVEFRAMES"].is_empty());
        assert!(!is_valid(&Document::new()));
    }

    #[test]
    fn test_lint_disable_rule() {
        let mut doc = Document::new();
        doc.insert(Saveframe::new("bare"));

        let mut config = LintConfig::default();
        config.disable_rule("saveframe-fields");
        let diagnostics = lint_with_config(&doc, config);
        assert!(diagnostics.iter().all(|d| d.rule_id() != "saveframe-fields"));
        assert!(lint(&doc).iter().any(|d| d.rule_id() == "saveframe-fields"));
    }

    #[test]
    fn test_group_by_category_preserves_order() {
        let diags = vec![
            Diagnostic::error(Category::Metadata, "first", "metadata"),
            Diagnostic::hint(Category::LoopConsistency, "hint", "loop-consistency"),
            Diagnostic::warning(Category::Metadata, "second", "metadata"),
        ];
        let grouped = group_by_category(&diags);
        assert_eq!(grouped["METADATA"], vec!["first", "second"]);
        assert_eq!(grouped["LOOP_CONSISTENCY"], vec!["hint"]);
    }
}
