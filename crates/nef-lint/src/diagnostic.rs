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

//! Lint diagnostic types

use std::fmt;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational hint
    Hint,
    /// Warning - might be an issue
    Warning,
    /// Error - definitely an issue
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hint => write!(f, "hint"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Validation category a diagnostic is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Saveframes,
    RequiredSaveframes,
    Metadata,
    MolecularSystem,
    ChemicalShiftLists,
    DistanceRestraintLists,
    DihedralRestraintLists,
    RdcRestraintLists,
    PeakLists,
    LoopConsistency,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; 10] = [
        Self::Saveframes,
        Self::RequiredSaveframes,
        Self::Metadata,
        Self::MolecularSystem,
        Self::ChemicalShiftLists,
        Self::DistanceRestraintLists,
        Self::DihedralRestraintLists,
        Self::RdcRestraintLists,
        Self::PeakLists,
        Self::LoopConsistency,
    ];

    /// The category name used as a key in validation results.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saveframes => "SAVEFRAMES",
            Self::RequiredSaveframes => "REQUIRED_SAVEFRAMES",
            Self::Metadata => "METADATA",
            Self::MolecularSystem => "MOLECULAR_SYSTEM",
            Self::ChemicalShiftLists => "CHEMICAL_SHIFT_LISTS",
            Self::DistanceRestraintLists => "DISTANCE_RESTRAINT_LISTS",
            Self::DihedralRestraintLists => "DIHEDRAL_RESTRAINT_LISTS",
            Self::RdcRestraintLists => "RDC_RESTRAINT_LISTS",
            Self::PeakLists => "PEAK_LISTS",
            Self::LoopConsistency => "LOOP_CONSISTENCY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lint diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    severity: Severity,
    /// Category the issue belongs to
    category: Category,
    /// Human-readable message
    message: String,
    /// Rule ID that generated this diagnostic
    rule_id: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: Category,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    pub fn warning(category: Category, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message, rule_id)
    }

    pub fn error(category: Category, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message, rule_id)
    }

    pub fn hint(category: Category, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Hint, category, message, rule_id)
    }

    // Public getters
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Escalate the severity to error level (used by lint runner).
    pub fn escalate_to_error(&mut self) {
        self.severity = Severity::Error;
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule_id, self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Severity tests ====================

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Hint < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Hint.to_string(), "hint");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    // ==================== Category tests ====================

    #[test]
    fn test_category_names_are_unique() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::LoopConsistency.to_string(), "LOOP_CONSISTENCY");
        assert_eq!(Category::PeakLists.to_string(), "PEAK_LISTS");
    }

    // ==================== Diagnostic tests ====================

    #[test]
    fn test_constructors_set_severity() {
        let e = Diagnostic::error(Category::Metadata, "m", "metadata");
        let w = Diagnostic::warning(Category::Metadata, "m", "metadata");
        let h = Diagnostic::hint(Category::Metadata, "m", "metadata");
        assert_eq!(e.severity(), Severity::Error);
        assert_eq!(w.severity(), Severity::Warning);
        assert_eq!(h.severity(), Severity::Hint);
    }

    #[test]
    fn test_getters() {
        let d = Diagnostic::error(Category::Saveframes, "meta: missing sf_category label.", "saveframe-fields");
        assert_eq!(d.category(), Category::Saveframes);
        assert_eq!(d.message(), "meta: missing sf_category label.");
        assert_eq!(d.rule_id(), "saveframe-fields");
    }

    #[test]
    fn test_escalate_to_error() {
        let mut d = Diagnostic::warning(Category::PeakLists, "x", "peak-lists");
        d.escalate_to_error();
        assert_eq!(d.severity(), Severity::Error);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::warning(Category::Metadata, "Field 'x' not allowed in meta.", "metadata");
        assert_eq!(d.to_string(), "[metadata] warning: Field 'x' not allowed in meta.");
    }
}
