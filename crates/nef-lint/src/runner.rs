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

//! Lint runner

use crate::diagnostic::{Diagnostic, Severity};
use crate::rules::{default_rules, LintRule, RuleConfig};
use nef_core::Document;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Maximum number of diagnostics to collect before stopping.
///
/// Loop-consistency hints scale with row count, so a large restraint list
/// with a sparsely filled column can otherwise produce millions of entries.
const MAX_DIAGNOSTICS: usize = 10_000;

/// Invalid lint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintConfigError {
    #[error("too many rule configurations: {count} (max: {max})")]
    TooManyRules { count: usize, max: usize },
    #[error("empty rule ID not allowed")]
    EmptyRuleId,
    #[error("rule ID too long: {len} bytes (max: {max})")]
    RuleIdTooLong { len: usize, max: usize },
}

/// Configuration for the lint runner
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Rule configurations by rule ID
    pub rules: HashMap<String, RuleConfig>,
    /// Minimum severity to report
    pub min_severity: Severity,
    /// Maximum number of diagnostics to collect (default: 10,000)
    pub max_diagnostics: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            min_severity: Severity::Hint,
            max_diagnostics: MAX_DIAGNOSTICS,
        }
    }
}

impl LintConfig {
    /// Validate configuration (checks rule ID lengths and limits).
    pub fn validate(&self) -> Result<(), LintConfigError> {
        const MAX_RULE_ID_LENGTH: usize = 100;
        const MAX_RULES: usize = 1000;

        if self.rules.len() > MAX_RULES {
            return Err(LintConfigError::TooManyRules {
                count: self.rules.len(),
                max: MAX_RULES,
            });
        }

        for id in self.rules.keys() {
            if id.is_empty() {
                return Err(LintConfigError::EmptyRuleId);
            }
            if id.len() > MAX_RULE_ID_LENGTH {
                return Err(LintConfigError::RuleIdTooLong {
                    len: id.len(),
                    max: MAX_RULE_ID_LENGTH,
                });
            }
        }

        Ok(())
    }

    /// Disable a specific rule
    pub fn disable_rule(&mut self, rule_id: &str) {
        self.rules.insert(
            rule_id.to_string(),
            RuleConfig {
                enabled: false,
                error: false,
            },
        );
    }

    /// Enable a specific rule
    pub fn enable_rule(&mut self, rule_id: &str) {
        self.rules.insert(
            rule_id.to_string(),
            RuleConfig {
                enabled: true,
                error: false,
            },
        );
    }

    /// Set a rule to error level
    pub fn set_rule_error(&mut self, rule_id: &str) {
        self.rules.insert(
            rule_id.to_string(),
            RuleConfig {
                enabled: true,
                error: true,
            },
        );
    }
}

/// Lint runner
pub struct LintRunner {
    config: LintConfig,
    rules: Vec<Box<dyn LintRule>>,
}

impl LintRunner {
    /// Create a new lint runner with default rules
    pub fn new(config: LintConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
        }
    }

    /// Create a lint runner with custom rules
    pub fn with_rules(config: LintConfig, rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { config, rules }
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Registered rules, in execution order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Run all enabled rules on a document.
    ///
    /// At most `config.max_diagnostics` diagnostics are collected. When the
    /// cap is hit, a warning noting the suppression is appended under the
    /// category of the rule that overflowed and no further rules run.
    pub fn run(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut overflowed = None;

        for rule in &self.rules {
            let rule_id = rule.id();
            let rule_config = self.config.rules.get(rule_id).cloned().unwrap_or_default();

            if !rule_config.enabled {
                debug!("Skipping disabled rule {}", rule_id);
                continue;
            }

            let mut rule_diagnostics = rule.check(doc);
            debug!("Rule {} produced {} diagnostics", rule_id, rule_diagnostics.len());

            // Apply rule configuration
            for diag in &mut rule_diagnostics {
                if rule_config.error && diag.severity() == Severity::Warning {
                    diag.escalate_to_error();
                }
            }

            for diag in rule_diagnostics
                .into_iter()
                .filter(|d| d.severity() >= self.config.min_severity)
            {
                if diagnostics.len() >= self.config.max_diagnostics {
                    overflowed = Some(rule.category());
                    break;
                }
                diagnostics.push(diag);
            }

            if overflowed.is_some() {
                break;
            }
        }

        if let Some(category) = overflowed {
            debug!(
                "Diagnostic limit of {} reached in {}",
                self.config.max_diagnostics, category
            );
            diagnostics.push(Diagnostic::warning(
                category,
                format!(
                    "Diagnostic limit of {} exceeded. Further diagnostics have been suppressed.",
                    self.config.max_diagnostics
                ),
                "diagnostic-limit",
            ));
        }

        diagnostics
    }
}

impl Default for LintRunner {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}
