// darshan-report - summary reports for Darshan I/O traces
// Copyright (C) 2025  Maxim Petrov
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod loader;
pub mod parser;

use std::collections::HashMap;

/// Named columns of numeric values, one row per record.
///
/// Columns keep the order of their first appearance. A counter that some record does not report
/// reads as `T::default()` for that record.
#[derive(Clone, Debug, Default)]
pub struct CounterTable<T> {
    names: Vec<String>,
    columns: HashMap<String, Vec<T>>,
    nrows: usize,
}

impl<T: Copy + Default> CounterTable<T> {
    pub fn push_row(&mut self, row: &[(String, T)]) {
        let nrows = self.nrows;
        for (name, value) in row {
            if !self.columns.contains_key(name) {
                self.names.push(name.clone());
            }
            let column = self
                .columns
                .entry(name.clone())
                .or_insert_with(|| vec![T::default(); nrows]);
            // the same counter twice in one record: the last value wins
            if column.len() > nrows {
                column[nrows] = *value;
            } else {
                column.push(*value);
            }
        }

        self.nrows += 1;
        for column in self.columns.values_mut() {
            column.resize(self.nrows, T::default());
        }
    }

    pub fn column(&self, name: &str) -> Option<&[T]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.nrows
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }
}

/// Record identity: the rank that wrote it (-1 for records shared by all ranks) and the record id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub rank: i64,
    pub id: u64,
}

/// All the records of a single module, split into integer and floating point counters.
#[derive(Clone, Debug, Default)]
pub struct RecordTable {
    pub counters: CounterTable<i64>,
    pub fcounters: CounterTable<f64>,
}

/// Size and format version of a module region in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleRegion {
    pub len: u64,
    pub ver: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobMetadata {
    pub jobid: u64,
    pub uid: u64,
    pub nprocs: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub metadata: HashMap<String, String>,
}

impl JobMetadata {
    /// Wall-clock job duration in seconds.
    pub fn runtime(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// Parsed Darshan log.
#[derive(Clone, Debug, Default)]
pub struct DarshanReport {
    pub version: String,
    pub exe: String,
    pub job: JobMetadata,
    pub(crate) modules: Vec<(String, ModuleRegion)>,
    pub(crate) records: HashMap<String, RecordTable>,
}

impl DarshanReport {
    /// Modules present in the log, in log order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &ModuleRegion)> {
        self.modules.iter().map(|(name, region)| (name.as_str(), region))
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|(n, _)| n == name)
    }

    /// Records of the module, if the log has any.
    pub fn records(&self, module: &str) -> Option<&RecordTable> {
        self.records.get(module)
    }
}
