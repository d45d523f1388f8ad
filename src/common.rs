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

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Use simple text descriptions as error type for all the errors in darshan-report.
pub type Result<T> = std::result::Result<T, String>;

/// Little helper function to convert str literals to error message.
pub fn emsg<T, U: AsRef<str>>(s: U) -> Result<T> {
    Err(s.as_ref().to_string())
}

pub fn readfile(path: &Path) -> Result<String> {
    let mut buf = String::with_capacity(32 * 1024);
    File::open(path)
        .map_err(|e| format!("failed to open {path:?}: {e}"))?
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read {path:?}: {e}"))?;
    Ok(buf)
}
