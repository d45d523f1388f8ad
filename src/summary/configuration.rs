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

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::{Result, readfile};
use crate::plotters::io_cost::FigureSize;
use crate::report::loader::DEFAULT_DARSHAN_PARSER;

/// Optional settings of the summary report.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub io_cost: FigureSize,
    /// CSS file replacing the built-in stylesheet.
    pub stylesheet: Option<PathBuf>,
    /// Executable converting binary logs to text.
    pub darshan_parser: Option<String>,
}

impl ReportConfig {
    pub fn darshan_parser(&self) -> &str {
        self.darshan_parser
            .as_deref()
            .unwrap_or(DEFAULT_DARSHAN_PARSER)
    }
}

pub fn parse_config(config_str: &str) -> Result<ReportConfig> {
    serde_yml::from_str(config_str).map_err(|e| format!("failed to parse config file: {e}"))
}

pub fn read_config(path: &Path) -> Result<ReportConfig> {
    parse_config(&readfile(path)?)
}
