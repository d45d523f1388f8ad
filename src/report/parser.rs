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

//! Reader for the text dump printed by `darshan-parser`.

use log::debug;

use crate::common::{Result, emsg};
use crate::report::{DarshanReport, ModuleRegion, RecordKey, RecordTable};

/// Counters of the record being collected, flushed once the next record starts.
struct PendingRecord {
    module: String,
    key: RecordKey,
    counters: Vec<(String, i64)>,
    fcounters: Vec<(String, f64)>,
}

fn is_fcounter(name: &str) -> bool {
    name.contains("_F_")
}

fn parse_seconds(value: &str) -> Result<i64> {
    // newer logs print "sec.nsec", only whole seconds are kept
    let secs = value.split_once('.').map_or(value, |(s, _)| s);
    secs.parse::<i64>()
        .map_err(|e| format!("bad timestamp '{value}': {e}"))
}

fn parse_number(value: &str, what: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| format!("bad {what} '{value}': {e}"))
}

fn parse_region(value: &str) -> Result<ModuleRegion> {
    // "186 bytes (compressed), ver=3"
    let len = value
        .split_ascii_whitespace()
        .next()
        .ok_or_else(|| format!("empty module region '{value}'"))?;
    let len = parse_number(len, "module length")?;

    let ver = match value.rsplit_once("ver=") {
        Some((_, ver)) => ver
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad module version in '{value}': {e}"))?,
        None => 0,
    };

    Ok(ModuleRegion { len, ver })
}

fn handle_header(report: &mut DarshanReport, line: &str) -> Result<()> {
    let Some(line) = line.strip_prefix("# ") else {
        return Ok(());
    };
    let Some((key, value)) = line.split_once(':') else {
        return Ok(());
    };
    // the command line keeps its trailing whitespace
    if key == "exe" {
        report.exe = value.strip_prefix(' ').unwrap_or(value).to_string();
        return Ok(());
    }
    let value = value.trim();

    match key {
        "darshan log version" => report.version = value.to_string(),
        "uid" => report.job.uid = parse_number(value, "uid")?,
        "jobid" => report.job.jobid = parse_number(value, "jobid")?,
        "nprocs" => report.job.nprocs = parse_number(value, "nprocs")?,
        "start_time" | "start_time_sec" => report.job.start_time = parse_seconds(value)?,
        "end_time" | "end_time_sec" => report.job.end_time = parse_seconds(value)?,
        "metadata" => {
            if let Some((k, v)) = value.split_once(" = ") {
                report.job.metadata.insert(k.to_string(), v.to_string());
            }
        }
        other => match other.strip_suffix(" module") {
            // region table entries all look like "<MODULE> module: <len> bytes ..."
            Some(module) if value.contains("bytes") => {
                let region = parse_region(value)?;
                report.modules.push((module.to_string(), region));
            }
            _ => debug!("skipping header line: {line}"),
        },
    }

    Ok(())
}

fn flush(report: &mut DarshanReport, pending: Option<PendingRecord>) {
    let Some(rec) = pending else {
        return;
    };

    if !report.has_module(&rec.module) {
        debug!("module {} has records but no log region", rec.module);
        report
            .modules
            .push((rec.module.clone(), ModuleRegion { len: 0, ver: 0 }));
    }

    let table: &mut RecordTable = report.records.entry(rec.module).or_default();
    table.counters.push_row(&rec.counters);
    table.fcounters.push_row(&rec.fcounters);
}

/// Parse the full output of `darshan-parser` into a report.
pub fn parse(content: &str) -> Result<DarshanReport> {
    let mut report = DarshanReport::default();
    let mut pending: Option<PendingRecord> = None;

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('#') {
            handle_header(&mut report, line)
                .map_err(|e| format!("line {}: {e}", lineno + 1))?;
            continue;
        }

        let items: Vec<&str> = line.split('\t').collect();
        if items.len() < 5 {
            return Err(format!("line {}: bad record line '{line}'", lineno + 1));
        }

        let module = items[0];
        let rank = items[1]
            .parse::<i64>()
            .map_err(|e| format!("line {}: bad rank '{}': {e}", lineno + 1, items[1]))?;
        let id = items[2]
            .parse::<u64>()
            .map_err(|e| format!("line {}: bad record id '{}': {e}", lineno + 1, items[2]))?;
        let key = RecordKey { rank, id };
        let counter = items[3];
        let value = items[4];

        let rec = match pending.take() {
            Some(rec) if rec.module == module && rec.key == key => pending.insert(rec),
            other => {
                flush(&mut report, other);
                pending.insert(PendingRecord {
                    module: module.to_string(),
                    key,
                    counters: vec![],
                    fcounters: vec![],
                })
            }
        };

        if is_fcounter(counter) {
            let value = value
                .parse::<f64>()
                .map_err(|e| format!("line {}: bad value for {counter}: {e}", lineno + 1))?;
            rec.fcounters.push((counter.to_string(), value));
        } else {
            let value = value
                .parse::<i64>()
                .map_err(|e| format!("line {}: bad value for {counter}: {e}", lineno + 1))?;
            rec.counters.push((counter.to_string(), value));
        }
    }
    flush(&mut report, pending);

    if report.version.is_empty() {
        return emsg("no darshan log version found, is it darshan-parser output?");
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::{parse, parse_region, parse_seconds};
    use crate::report::ModuleRegion;

    const DUMP: &str = indoc! {"
        # darshan log version: 3.10
        # compression method: ZLIB
        # exe: /global/bin/vpicio_uni /scratch/vpicio.hdf5 32
        # uid: 69615
        # jobid: 4478544
        # start_time: 1490000867
        # start_time_asci: Mon Mar 20 02:07:47 2017
        # end_time: 1490000983
        # end_time_asci: Mon Mar 20 02:09:43 2017
        # nprocs: 2048
        # run time: 117
        # metadata: lib_ver = 3.1.3
        # metadata: h = romio_no_indep_rw=true;cb_nodes=4

        # log file regions
        # -------------------------------------------------------
        # header: 360 bytes (uncompressed)
        # job data: 314 bytes (compressed)
        # record table: 5904 bytes (compressed)
        # POSIX module: 3010 bytes (compressed), ver=3
        # MPI-IO module: 1044 bytes (compressed), ver=2
        # LUSTRE module: 6216 bytes (compressed), ver=1

        # mounted file systems (mount point and fs type)
        # -------------------------------------------------------
        # mount entry:\t/scratch2\tlustre
        # mount entry:\t/\trootfs

        # description of columns:
        #   <module>: module responsible for this I/O record.
        #<module>\t<rank>\t<record id>\t<counter>\t<value>\t<file name>\t<mount pt>\t<fs type>
        POSIX\t-1\t100\tPOSIX_OPENS\t2049\t/scratch2/a\t/scratch2\tlustre
        POSIX\t-1\t100\tPOSIX_F_READ_TIME\t1.500000\t/scratch2/a\t/scratch2\tlustre
        POSIX\t-1\t100\tPOSIX_F_WRITE_TIME\t2.000000\t/scratch2/a\t/scratch2\tlustre
        POSIX\t3\t200\tPOSIX_OPENS\t1\t/scratch2/b\t/scratch2\tlustre
        POSIX\t3\t200\tPOSIX_F_READ_TIME\t0.500000\t/scratch2/b\t/scratch2\tlustre
        MPI-IO\t-1\t100\tMPIIO_INDEP_OPENS\t0\t/scratch2/a\t/scratch2\tlustre
        MPI-IO\t-1\t100\tMPIIO_F_META_TIME\t0.250000\t/scratch2/a\t/scratch2\tlustre
    "};

    #[test]
    fn parse_job_header() {
        let report = parse(DUMP).unwrap();
        assert_eq!(report.version, "3.10");
        assert_eq!(report.exe, "/global/bin/vpicio_uni /scratch/vpicio.hdf5 32");
        assert_eq!(report.job.uid, 69615);
        assert_eq!(report.job.jobid, 4478544);
        assert_eq!(report.job.nprocs, 2048);
        assert_eq!(report.job.start_time, 1490000867);
        assert_eq!(report.job.end_time, 1490000983);
        assert_eq!(report.job.runtime(), 116);
        assert_eq!(report.job.metadata["lib_ver"], "3.1.3");
        assert_eq!(report.job.metadata["h"], "romio_no_indep_rw=true;cb_nodes=4");
    }

    #[test]
    fn parse_regions_in_log_order() {
        let report = parse(DUMP).unwrap();
        let modules: Vec<_> = report.modules().map(|(name, r)| (name, *r)).collect();
        assert_eq!(
            modules,
            [
                ("POSIX", ModuleRegion { len: 3010, ver: 3 }),
                ("MPI-IO", ModuleRegion { len: 1044, ver: 2 }),
                ("LUSTRE", ModuleRegion { len: 6216, ver: 1 }),
            ]
        );
    }

    #[test]
    fn parse_records() {
        let report = parse(DUMP).unwrap();

        let posix = report.records("POSIX").unwrap();
        assert_eq!(posix.counters.len(), 2);
        assert_eq!(posix.counters.column("POSIX_OPENS").unwrap(), [2049, 1]);
        assert_eq!(
            posix.fcounters.column("POSIX_F_READ_TIME").unwrap(),
            [1.5, 0.5]
        );
        assert_eq!(
            posix.fcounters.column("POSIX_F_WRITE_TIME").unwrap(),
            [2.0, 0.0]
        );

        let mpiio = report.records("MPI-IO").unwrap();
        assert_eq!(mpiio.fcounters.len(), 1);
        assert_eq!(
            mpiio.fcounters.column("MPIIO_F_META_TIME").unwrap(),
            [0.25]
        );

        // region without records
        assert!(report.records("LUSTRE").is_none());
    }

    #[test]
    fn module_without_region_is_registered() {
        let dump = indoc! {"
            # darshan log version: 3.21
            # nprocs: 1
            STDIO\t0\t7\tSTDIO_F_READ_TIME\t0.1\t<STDOUT>\tUNKNOWN\tUNKNOWN
        "};
        let report = parse(dump).unwrap();
        assert!(report.has_module("STDIO"));
        assert_eq!(report.records("STDIO").unwrap().fcounters.len(), 1);
    }

    #[test]
    fn empty_exe_is_kept_empty() {
        let dump = "# darshan log version: 3.21\n# exe: \n";
        let report = parse(dump).unwrap();
        assert_eq!(report.exe, "");
    }

    #[test]
    fn exe_keeps_trailing_space() {
        let dump = "# darshan log version: 3.21\n# exe: /yellow/usr/projects/a.out \n";
        let report = parse(dump).unwrap();
        assert_eq!(report.exe, "/yellow/usr/projects/a.out ");
    }

    #[test]
    fn dont_parse_empty_content() {
        parse("").unwrap_err();
    }

    #[test]
    fn dont_parse_short_record_line() {
        let dump = "# darshan log version: 3.10\nPOSIX\t-1\t100\n";
        parse(dump).unwrap_err();
    }

    #[test]
    fn dont_parse_bad_counter_value() {
        let dump = "# darshan log version: 3.10\nPOSIX\t-1\t100\tPOSIX_OPENS\tmany\n";
        let err = parse(dump).unwrap_err();
        assert!(err.contains("POSIX_OPENS"));
    }

    #[test]
    fn timestamps_with_nanoseconds() {
        assert_eq!(parse_seconds("1619109091.123456789").unwrap(), 1619109091);
        assert_eq!(parse_seconds("1619109091").unwrap(), 1619109091);
        parse_seconds("yesterday").unwrap_err();
    }

    #[test]
    fn region_without_version() {
        let region = parse_region("80 bytes (compressed)").unwrap();
        assert_eq!(region, ModuleRegion { len: 80, ver: 0 });
    }
}
