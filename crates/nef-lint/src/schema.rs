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

//! NEF saveframe schemas.
//!
//! One table per standard saveframe category, listing the scalar fields and
//! loops a saveframe may carry and the columns each loop may carry.

/// Name and category of the metadata saveframe.
pub const META_DATA: &str = "nef_nmr_meta_data";
/// Name and category of the molecular system saveframe.
pub const MOLECULAR_SYSTEM: &str = "nef_molecular_system";
pub const CHEMICAL_SHIFT_LIST: &str = "nef_chemical_shift_list";
pub const DISTANCE_RESTRAINT_LIST: &str = "nef_distance_restraint_list";
pub const DIHEDRAL_RESTRAINT_LIST: &str = "nef_dihedral_restraint_list";
pub const RDC_RESTRAINT_LIST: &str = "nef_rdc_restraint_list";
pub const PEAK_LIST: &str = "nef_nmr_spectrum";

/// Expected value of `format_name` in the metadata saveframe.
pub const FORMAT_NAME: &str = "Nmr_Exchange_Format";

/// Fields every saveframe must carry.
pub const ALL_SAVEFRAME_FIELDS: &[&str] = &["sf_category", "sf_framecode"];

/// Saveframes that must exist, by name.
pub const REQUIRED_BY_NAME: &[&str] = &[META_DATA, MOLECULAR_SYSTEM];

/// Saveframe categories of which at least one saveframe must exist.
pub const REQUIRED_BY_CATEGORY: &[&str] = &[CHEMICAL_SHIFT_LIST];

/// Allowed content of a saveframe category.
#[derive(Debug)]
pub struct SaveframeSchema {
    pub category: &'static str,
    pub required_fields: &'static [&'static str],
    pub optional_fields: &'static [&'static str],
    pub required_loops: &'static [&'static str],
    pub optional_loops: &'static [&'static str],
    pub loops: &'static [LoopSchema],
}

impl SaveframeSchema {
    /// Whether `key` may appear as a scalar or loop in this category.
    pub fn allows(&self, key: &str) -> bool {
        self.required_fields
            .iter()
            .chain(self.optional_fields)
            .chain(self.required_loops)
            .chain(self.optional_loops)
            .any(|k| *k == key)
    }

    /// Required fields followed by required loops.
    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> {
        self.required_fields
            .iter()
            .chain(self.required_loops)
            .copied()
    }

    pub fn loop_schema(&self, name: &str) -> Option<&'static LoopSchema> {
        self.loops.iter().find(|l| l.name == name)
    }
}

/// Allowed columns of a loop.
///
/// Patterned columns are prefixes completed with a dimension number, from 1
/// up to the saveframe's `num_dimensions`.
#[derive(Debug)]
pub struct LoopSchema {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    /// Groups of columns of which at least one must be present.
    pub alternates: &'static [&'static [&'static str]],
    pub required_patterns: &'static [&'static str],
    pub optional_patterns: &'static [&'static str],
    /// Any extra column is allowed.
    pub open: bool,
    /// Rows are checked for consistent use of columns.
    pub consistency: bool,
}

impl LoopSchema {
    const fn closed(name: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            name,
            required,
            optional: &[],
            alternates: &[],
            required_patterns: &[],
            optional_patterns: &[],
            open: false,
            consistency: false,
        }
    }

    /// Whether `column` may appear in this loop given `dimensions`.
    ///
    /// With unknown dimensions any numeric suffix matches a pattern.
    pub fn allows(&self, column: &str, dimensions: Option<usize>) -> bool {
        if self.open
            || self.required.contains(&column)
            || self.optional.contains(&column)
            || self.alternates.iter().any(|group| group.contains(&column))
        {
            return true;
        }
        self.required_patterns
            .iter()
            .chain(self.optional_patterns)
            .any(|prefix| matches_pattern(column, prefix, dimensions))
    }

    /// Required columns with patterns expanded over `1..=dimensions`.
    pub fn required_columns(&self, dimensions: Option<usize>) -> Vec<String> {
        let mut columns: Vec<String> = self.required.iter().map(|c| c.to_string()).collect();
        if let Some(n) = dimensions {
            for dim in 1..=n {
                for prefix in self.required_patterns {
                    columns.push(format!("{}{}", prefix, dim));
                }
            }
        }
        columns
    }
}

fn matches_pattern(column: &str, prefix: &str, dimensions: Option<usize>) -> bool {
    let Some(suffix) = column.strip_prefix(prefix) else {
        return false;
    };
    match suffix.parse::<usize>() {
        Ok(dim) if !suffix.starts_with('+') => match dimensions {
            Some(n) => (1..=n).contains(&dim),
            None => true,
        },
        _ => false,
    }
}

const RESTRAINT_OPTIONAL_COLUMNS: &[&str] = &[
    "restraint_combination_id",
    "target_value",
    "target_value_uncertainty",
    "lower_linear_limit",
    "lower_limit",
    "upper_limit",
    "upper_linear_limit",
];

const TWO_ATOM_RESTRAINT_COLUMNS: &[&str] = &[
    "ordinal",
    "restraint_id",
    "chain_code_1",
    "sequence_code_1",
    "residue_type_1",
    "atom_name_1",
    "chain_code_2",
    "sequence_code_2",
    "residue_type_2",
    "atom_name_2",
    "weight",
];

pub static META_DATA_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: META_DATA,
    required_fields: &[
        "sf_category",
        "sf_framecode",
        "format_name",
        "format_version",
        "program_name",
        "program_version",
        "creation_date",
        "uuid",
    ],
    optional_fields: &["coordinate_file_name"],
    required_loops: &[],
    optional_loops: &["nef_related_entries", "nef_program_script", "nef_run_history"],
    loops: &[
        LoopSchema::closed(
            "nef_related_entries",
            &["database_name", "database_accession_code"],
        ),
        LoopSchema {
            open: true,
            consistency: true,
            ..LoopSchema::closed("nef_program_script", &["program_name"])
        },
        LoopSchema {
            optional: &["program_version", "script_name", "script"],
            consistency: true,
            ..LoopSchema::closed("nef_run_history", &["run_ordinal", "program_name"])
        },
    ],
};

pub static MOLECULAR_SYSTEM_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: MOLECULAR_SYSTEM,
    required_fields: &["sf_category", "sf_framecode"],
    optional_fields: &[],
    required_loops: &["nef_sequence"],
    optional_loops: &["nef_covalent_links"],
    loops: &[
        LoopSchema::closed(
            "nef_sequence",
            &["chain_code", "sequence_code", "residue_type", "linking", "residue_variant"],
        ),
        LoopSchema::closed(
            "nef_covalent_links",
            &[
                "chain_code_1",
                "sequence_code_1",
                "residue_type_1",
                "atom_name_1",
                "chain_code_2",
                "sequence_code_2",
                "residue_type_2",
                "atom_name_2",
            ],
        ),
    ],
};

pub static CHEMICAL_SHIFT_LIST_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: CHEMICAL_SHIFT_LIST,
    required_fields: &["sf_category", "sf_framecode"],
    optional_fields: &[],
    required_loops: &["nef_chemical_shift"],
    optional_loops: &[],
    loops: &[LoopSchema {
        optional: &["value_uncertainty"],
        consistency: true,
        ..LoopSchema::closed(
            "nef_chemical_shift",
            &["chain_code", "sequence_code", "residue_type", "atom_name", "value"],
        )
    }],
};

pub static DISTANCE_RESTRAINT_LIST_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: DISTANCE_RESTRAINT_LIST,
    required_fields: &["sf_category", "sf_framecode", "potential_type"],
    optional_fields: &["restraint_origin"],
    required_loops: &["nef_distance_restraint"],
    optional_loops: &[],
    loops: &[LoopSchema {
        optional: RESTRAINT_OPTIONAL_COLUMNS,
        consistency: true,
        ..LoopSchema::closed("nef_distance_restraint", TWO_ATOM_RESTRAINT_COLUMNS)
    }],
};

pub static DIHEDRAL_RESTRAINT_LIST_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: DIHEDRAL_RESTRAINT_LIST,
    required_fields: &["sf_category", "sf_framecode", "potential_type"],
    optional_fields: &["restraint_origin"],
    required_loops: &["nef_dihedral_restraint"],
    optional_loops: &[],
    loops: &[LoopSchema {
        optional: RESTRAINT_OPTIONAL_COLUMNS,
        ..LoopSchema::closed(
            "nef_dihedral_restraint",
            &[
                "ordinal",
                "restraint_id",
                "chain_code_1",
                "sequence_code_1",
                "residue_type_1",
                "atom_name_1",
                "chain_code_2",
                "sequence_code_2",
                "residue_type_2",
                "atom_name_2",
                "chain_code_3",
                "sequence_code_3",
                "residue_type_3",
                "atom_name_3",
                "chain_code_4",
                "sequence_code_4",
                "residue_type_4",
                "atom_name_4",
                "weight",
            ],
        )
    }],
};

pub static RDC_RESTRAINT_LIST_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: RDC_RESTRAINT_LIST,
    required_fields: &["sf_category", "sf_framecode", "potential_type"],
    optional_fields: &[
        "restraint_origin",
        "tensor_magnitude",
        "tensor_rhombicity",
        "tensor_chain_code",
        "tensor_sequence_code",
        "tensor_residue_type",
    ],
    required_loops: &["nef_rdc_restraint"],
    optional_loops: &[],
    loops: &[LoopSchema {
        optional: &[
            "restraint_combination_id",
            "target_value",
            "target_value_uncertainty",
            "lower_linear_limit",
            "lower_limit",
            "upper_limit",
            "upper_linear_limit",
            "scale",
            "distance_dependent",
        ],
        ..LoopSchema::closed("nef_rdc_restraint", TWO_ATOM_RESTRAINT_COLUMNS)
    }],
};

pub static PEAK_LIST_SCHEMA: SaveframeSchema = SaveframeSchema {
    category: PEAK_LIST,
    required_fields: &["sf_category", "sf_framecode", "num_dimensions", "chemical_shift_list"],
    optional_fields: &["experiment_classification", "experiment_type"],
    required_loops: &["nef_spectrum_dimension", "nef_spectrum_dimension_transfer", "nef_peak"],
    optional_loops: &[],
    loops: &[
        LoopSchema {
            optional: &[
                "spectrometer_frequency",
                "spectral_width",
                "value_first_point",
                "folding",
                "absolute_peak_positions",
                "is_acquisition",
            ],
            ..LoopSchema::closed("nef_spectrum_dimension", &["dimension_id", "axis_unit", "axis_code"])
        },
        LoopSchema {
            optional: &["is_indirect"],
            ..LoopSchema::closed(
                "nef_spectrum_dimension_transfer",
                &["dimension_1", "dimension_2", "transfer_type"],
            )
        },
        LoopSchema {
            alternates: &[&["height", "volume"]],
            required_patterns: &[
                "position_",
                "chain_code_",
                "sequence_code_",
                "residue_type_",
                "atom_name_",
            ],
            optional_patterns: &["position_uncertainty_"],
            ..LoopSchema::closed("nef_peak", &["ordinal", "peak_id"])
        },
    ],
};

/// All saveframe schemas.
pub fn schemas() -> [&'static SaveframeSchema; 7] {
    [
        &META_DATA_SCHEMA,
        &MOLECULAR_SYSTEM_SCHEMA,
        &CHEMICAL_SHIFT_LIST_SCHEMA,
        &DISTANCE_RESTRAINT_LIST_SCHEMA,
        &DIHEDRAL_RESTRAINT_LIST_SCHEMA,
        &RDC_RESTRAINT_LIST_SCHEMA,
        &PEAK_LIST_SCHEMA,
    ]
}

/// Look up the schema for a saveframe category.
pub fn schema_for(category: &str) -> Option<&'static SaveframeSchema> {
    schemas().into_iter().find(|s| s.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup() {
        assert_eq!(schema_for("nef_chemical_shift_list").unwrap().category, CHEMICAL_SHIFT_LIST);
        assert!(schema_for("ccpn_assignment").is_none());
    }

    #[test]
    fn test_every_schema_requires_identity_fields() {
        for schema in schemas() {
            for field in ALL_SAVEFRAME_FIELDS {
                assert!(schema.required_fields.contains(field), "{}", schema.category);
            }
        }
    }

    #[test]
    fn test_every_loop_has_a_table() {
        for schema in schemas() {
            for name in schema.required_loops.iter().chain(schema.optional_loops) {
                assert!(schema.loop_schema(name).is_some(), "{name}");
            }
        }
    }

    #[test]
    fn test_saveframe_allows() {
        assert!(META_DATA_SCHEMA.allows("coordinate_file_name"));
        assert!(META_DATA_SCHEMA.allows("nef_run_history"));
        assert!(!META_DATA_SCHEMA.allows("nef_sequence"));
    }

    #[test]
    fn test_required_keys_order() {
        let keys: Vec<_> = MOLECULAR_SYSTEM_SCHEMA.required_keys().collect();
        assert_eq!(keys, vec!["sf_category", "sf_framecode", "nef_sequence"]);
    }

    #[test]
    fn test_patterned_columns() {
        let peak = PEAK_LIST_SCHEMA.loop_schema("nef_peak").unwrap();
        assert!(peak.allows("position_2", Some(2)));
        assert!(!peak.allows("position_3", Some(2)));
        assert!(!peak.allows("position_0", Some(2)));
        assert!(peak.allows("position_uncertainty_1", Some(2)));
        assert!(peak.allows("position_7", None));
        assert!(peak.allows("height", Some(2)));
        assert!(!peak.allows("position_x", None));
    }

    #[test]
    fn test_required_columns_expand_patterns() {
        let peak = PEAK_LIST_SCHEMA.loop_schema("nef_peak").unwrap();
        let columns = peak.required_columns(Some(2));
        assert!(columns.contains(&"position_1".to_string()));
        assert!(columns.contains(&"atom_name_2".to_string()));
        assert!(!columns.contains(&"position_3".to_string()));
        assert_eq!(peak.required_columns(None), vec!["ordinal", "peak_id"]);
    }

    #[test]
    fn test_open_loop_allows_anything() {
        let scripts = META_DATA_SCHEMA.loop_schema("nef_program_script").unwrap();
        assert!(scripts.allows("cyana_macro", None));
    }
}
