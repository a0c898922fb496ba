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

//! Document structure for parsed NEF.
//!
//! Everything is insertion ordered: saveframes iterate in declaration order,
//! and keys within a saveframe iterate in the order they were first defined.
//! All values are kept as the exact strings found in the source.

use std::collections::HashMap;

/// The null placeholder, also used to pad ragged loops in lenient mode.
pub const NULL_VALUE: &str = ".";

/// A looped table: named columns plus row-major values.
///
/// `data.len()` is always a multiple of `columns.len()` for loops produced by
/// the parser. Row `i`, column `j` is `data[i * columns.len() + j]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loop {
    /// Column names (the field part of each `_category.field` tag).
    pub columns: Vec<String>,
    /// Row-major flat values.
    pub data: Vec<String>,
}

impl Loop {
    /// Create an empty loop with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            data: Vec::new(),
        }
    }

    /// Create a loop with columns and flat data.
    pub fn with_data(columns: Vec<String>, data: Vec<String>) -> Self {
        Self { columns, data }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &[String] {
        &self.data
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of complete rows.
    pub fn row_count(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.data.len() / self.columns.len()
        }
    }

    /// Whether the data length is not a multiple of the column count.
    pub fn is_ragged(&self) -> bool {
        !self.columns.is_empty() && self.data.len() % self.columns.len() != 0
    }

    /// Get one row as a slice.
    pub fn row(&self, index: usize) -> Option<&[String]> {
        let ncols = self.columns.len();
        if ncols == 0 {
            return None;
        }
        let start = index.checked_mul(ncols)?;
        let end = start.checked_add(ncols)?;
        self.data.get(start..end)
    }

    /// Iterate over complete rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        let ncols = self.columns.len().max(1);
        let complete = self.row_count() * self.columns.len();
        self.data[..complete].chunks_exact(ncols)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a single cell by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.row(row).map(|r| r[index].as_str())
    }

    /// Pad the data with [`NULL_VALUE`] up to the next complete row.
    ///
    /// Returns the number of values added.
    pub fn pad_to_complete_rows(&mut self) -> usize {
        let ncols = self.columns.len();
        if ncols == 0 {
            return 0;
        }
        let remainder = self.data.len() % ncols;
        if remainder == 0 {
            return 0;
        }
        let missing = ncols - remainder;
        self.data
            .extend(std::iter::repeat(NULL_VALUE.to_string()).take(missing));
        missing
    }
}

/// A value stored under a saveframe key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entry {
    /// A single value.
    Scalar(String),
    /// A looped table.
    Loop(Loop),
}

impl Entry {
    /// Try to get as a scalar value.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a loop.
    pub fn as_loop(&self) -> Option<&Loop> {
        match self {
            Self::Loop(l) => Some(l),
            _ => None,
        }
    }
}

/// A named, ordered collection of scalars and loops.
///
/// Keys are looked up through a hash index; iteration follows definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "SaveframeData"))]
pub struct Saveframe {
    name: String,
    entries: Vec<(String, Entry)>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SaveframeData {
    name: String,
    entries: Vec<(String, Entry)>,
}

#[cfg(feature = "serde")]
impl From<SaveframeData> for Saveframe {
    fn from(data: SaveframeData) -> Self {
        let mut saveframe = Saveframe::new(data.name);
        for (key, entry) in data.entries {
            saveframe.insert(key, entry);
        }
        saveframe
    }
}

impl Saveframe {
    /// Create an empty saveframe.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The saveframe name (the suffix of `save_<name>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an entry. An existing key keeps its position and gets the new
    /// value; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, entry)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
                None
            }
        }
    }

    /// Insert a scalar value.
    pub fn insert_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<Entry> {
        self.insert(key, Entry::Scalar(value.into()))
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        let position = *self.index.get(key)?;
        self.entries.get(position).map(|(_, e)| e)
    }

    /// Get a scalar value by key.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Entry::as_scalar)
    }

    /// Get a loop by category key.
    pub fn get_loop(&self, key: &str) -> Option<&Loop> {
        self.get(key).and_then(Entry::as_loop)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in definition order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Loops in definition order.
    pub fn loops(&self) -> impl Iterator<Item = (&str, &Loop)> {
        self.iter()
            .filter_map(|(k, e)| e.as_loop().map(|l| (k, l)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `sf_category` scalar, if present.
    pub fn category(&self) -> Option<&str> {
        self.scalar("sf_category")
    }

    /// The `sf_framecode` scalar, if present.
    pub fn framecode(&self) -> Option<&str> {
        self.scalar("sf_framecode")
    }
}

/// A parsed NEF document: one datablock and its saveframes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "DocumentData"))]
pub struct Document {
    /// Datablock name (the suffix of `data_<name>`).
    pub datablock: Option<String>,
    saveframes: Vec<Saveframe>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DocumentData {
    datablock: Option<String>,
    saveframes: Vec<Saveframe>,
}

#[cfg(feature = "serde")]
impl From<DocumentData> for Document {
    fn from(data: DocumentData) -> Self {
        let mut document = Document::new();
        document.datablock = data.datablock;
        for saveframe in data.saveframes {
            document.insert(saveframe);
        }
        document
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datablock(&self) -> Option<&str> {
        self.datablock.as_deref()
    }

    /// Get a saveframe by name.
    pub fn get(&self, name: &str) -> Option<&Saveframe> {
        self.saveframes.get(self.position(name)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add a saveframe, replacing any saveframe with the same name in place.
    ///
    /// Returns the saveframe's index and whether an existing one was replaced.
    pub fn insert(&mut self, saveframe: Saveframe) -> (usize, bool) {
        match self.position(&saveframe.name) {
            Some(index) => {
                self.saveframes[index] = saveframe;
                (index, true)
            }
            None => {
                let index = self.saveframes.len();
                self.index.insert(saveframe.name.clone(), index);
                self.saveframes.push(saveframe);
                (index, false)
            }
        }
    }

    /// Saveframes in declaration order.
    pub fn saveframes(&self) -> impl Iterator<Item = &Saveframe> {
        self.saveframes.iter()
    }

    /// Saveframe names in declaration order.
    pub fn saveframe_names(&self) -> impl Iterator<Item = &str> {
        self.saveframes.iter().map(|sf| sf.name.as_str())
    }

    /// Saveframes whose `sf_category` equals `category`.
    pub fn saveframes_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Saveframe> + 'a {
        self.saveframes
            .iter()
            .filter(move |sf| sf.category() == Some(category))
    }

    /// Number of saveframes.
    pub fn len(&self) -> usize {
        self.saveframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saveframes.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn saveframe_at_mut(&mut self, index: usize) -> Option<&mut Saveframe> {
        self.saveframes.get_mut(index)
    }
}
