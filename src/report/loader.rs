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

use std::path::Path;

use log::info;
use subprocess::{Exec, Redirection};

use crate::common::{Result, readfile};
use crate::report::{DarshanReport, parser};

pub const DEFAULT_DARSHAN_PARSER: &str = "darshan-parser";

fn is_binary_log(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "darshan")
}

/// Run `darshan-parser` over a binary log and return its text dump.
fn run_darshan_parser(parser_cmd: &str, path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(format!("failed to open {path:?}: no such file"));
    }

    info!("converting {path:?} with {parser_cmd}");
    let capture = Exec::cmd(parser_cmd)
        .arg(path)
        .stdout(Redirection::Pipe)
        .stderr(Redirection::Pipe)
        .capture()
        .map_err(|e| format!("failed to run {parser_cmd}: {e}"))?;

    if !capture.success() {
        return Err(format!(
            "{parser_cmd} failed on {path:?} ({:?}): {}",
            capture.exit_status,
            capture.stderr_str().trim()
        ));
    }

    Ok(capture.stdout_str())
}

/// Load a log: `.darshan` files go through `darshan-parser`, anything else is read as its dump.
pub fn load(path: &Path, parser_cmd: &str) -> Result<DarshanReport> {
    let content = if is_binary_log(path) {
        run_darshan_parser(parser_cmd, path)?
    } else {
        readfile(path)?
    };

    parser::parse(&content).map_err(|e| format!("failed to parse {path:?}: {e}"))
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use indoc::indoc;
    use tempdir::TempDir;

    use super::{DEFAULT_DARSHAN_PARSER, is_binary_log, load};

    // a binary log stand-in holding text dump, `cat` acts as the parser
    fn fake_binary_log(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("x.darshan");
        File::create(&path)
            .unwrap()
            .write_all(
                indoc! {"
                    # darshan log version: 3.21
                    # nprocs: 2
                    # STDIO module: 60 bytes (compressed), ver=2
                "}
                .as_bytes(),
            )
            .unwrap();
        path
    }

    #[test]
    fn binary_logs_by_extension() {
        assert!(is_binary_log(Path::new("logs/sample.darshan")));
        assert!(!is_binary_log(Path::new("logs/sample.txt")));
        assert!(!is_binary_log(Path::new("logs/darshan")));
    }

    #[test]
    fn load_text_dump() {
        let dir = TempDir::new("loader").unwrap();
        let path = dir.path().join("sample.txt");
        File::create(&path)
            .unwrap()
            .write_all(
                indoc! {"
                    # darshan log version: 3.21
                    # nprocs: 16
                    # POSIX module: 3010 bytes (compressed), ver=4
                "}
                .as_bytes(),
            )
            .unwrap();

        let report = load(&path, DEFAULT_DARSHAN_PARSER).unwrap();
        assert_eq!(report.job.nprocs, 16);
        assert!(report.has_module("POSIX"));
    }

    #[test]
    fn missing_dump_is_error() {
        let err = load(Path::new("/no/such/log.txt"), DEFAULT_DARSHAN_PARSER).unwrap_err();
        assert!(err.starts_with("failed to open"));
    }

    #[test]
    fn missing_binary_log_is_error() {
        load(Path::new("/no/such/log.darshan"), DEFAULT_DARSHAN_PARSER).unwrap_err();
    }

    #[test]
    fn load_binary_log_through_parser() {
        let dir = TempDir::new("loader").unwrap();
        let path = fake_binary_log(&dir);

        let report = load(&path, "cat").unwrap();
        assert_eq!(report.job.nprocs, 2);
        assert!(report.has_module("STDIO"));
    }

    #[test]
    fn failing_parser_is_error() {
        let dir = TempDir::new("loader").unwrap();
        let path = fake_binary_log(&dir);

        let err = load(&path, "false").unwrap_err();
        assert!(err.starts_with("false failed on"), "{err}");
        assert!(err.contains("Exited(1)"), "{err}");
    }

    #[test]
    fn missing_parser_is_error() {
        let dir = TempDir::new("loader").unwrap();
        let path = fake_binary_log(&dir);

        let err = load(&path, "/no/such/parser").unwrap_err();
        assert!(err.starts_with("failed to run /no/such/parser"), "{err}");
    }

    #[test]
    fn not_a_dump_is_error() {
        let dir = TempDir::new("loader").unwrap();
        let path = dir.path().join("notes.txt");
        File::create(&path)
            .unwrap()
            .write_all(b"just some text\n")
            .unwrap();
        load(&path, DEFAULT_DARSHAN_PARSER).unwrap_err();
    }
}
