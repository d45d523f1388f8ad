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

//! Job summary report: header, metadata and module tables, I/O cost chart.

pub mod configuration;
pub mod html;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;

use crate::common::{Result, readfile};
use crate::plotters::io_cost::{IoCostChart, io_cost_table, plot_io_cost};
use crate::report::{DarshanReport, loader};

use configuration::ReportConfig;

const DEFAULT_STYLESHEET: &str = include_str!("summary/style.css");

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const IO_COST_CAPTION: &str = "Average (across all ranks) amount of run time that each process \
    spent performing I/O, separated by read, write, and metadata operations.";

/// Everything the HTML summary of a single log is made of.
pub struct ReportData {
    pub log_path: PathBuf,
    pub report: DarshanReport,
    pub header: String,
    pub footer: String,
    pub stylesheet: String,
    pub metadata_table: String,
    pub module_table: String,
    pub io_cost: Option<IoCostChart>,
}

fn local_time(secs: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0).map(|t| t.with_timezone(&Local))
}

fn format_time(secs: i64) -> String {
    local_time(secs)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Command line of the job, "Anonymized" for hashed executables and "N/A" if absent.
pub fn full_command(report: &DarshanReport) -> String {
    let exe = report.exe.as_str();
    if exe.trim().is_empty() {
        "N/A".to_string()
    } else if exe.trim().chars().all(|c| c.is_ascii_digit()) {
        "Anonymized".to_string()
    } else {
        exe.to_string()
    }
}

/// Job runtime in seconds as shown in the report, "< 1" when start and end time are the same.
pub fn runtime_string(report: &DarshanReport) -> String {
    match report.job.runtime() {
        0 => "< 1".to_string(),
        secs => format!("{:.1}", secs as f64),
    }
}

/// "<application> (<start date>)"
pub fn header(report: &DarshanReport) -> String {
    let command = full_command(report);
    let app = match command.as_str() {
        "N/A" | "Anonymized" => command.clone(),
        _ => {
            let exe = command.split_ascii_whitespace().next().unwrap_or_default();
            Path::new(exe)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| exe.to_string())
        }
    };

    let date = local_time(report.job.start_time)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!("{app} ({date})")
}

pub fn footer() -> String {
    format!(
        "Summary report generated via darshan-report v{}",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn metadata_rows(report: &DarshanReport, log_path: &Path) -> Vec<(&'static str, String)> {
    let log_name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let lib_ver = report
        .job
        .metadata
        .get("lib_ver")
        .cloned()
        .unwrap_or_else(|| "N/A".to_string());

    vec![
        ("Job ID", report.job.jobid.to_string()),
        ("User ID", report.job.uid.to_string()),
        ("# Processes", report.job.nprocs.to_string()),
        ("Runtime (s)", runtime_string(report)),
        ("Start Time", format_time(report.job.start_time)),
        ("End Time", format_time(report.job.end_time)),
        ("Command", full_command(report)),
        ("Log Filename", log_name),
        ("Runtime Library Version", lib_ver),
        ("Log Format Version", report.version.clone()),
    ]
}

/// One row per module region: "<MODULE> (ver=<v>)" and its size in KiB.
pub fn module_rows(report: &DarshanReport) -> Vec<(String, String)> {
    report
        .modules()
        .map(|(name, region)| {
            (
                format!("{name} (ver={})", region.ver),
                format!("{:.2} KiB", region.len as f64 / 1024.0),
            )
        })
        .collect()
}

impl ReportData {
    /// Load the log and prepare every part of its report.
    pub fn new(log_path: &Path, config: &ReportConfig) -> Result<Self> {
        info!("loading log {log_path:?}");
        let report = loader::load(log_path, config.darshan_parser())?;
        Self::from_report(log_path, report, config)
    }

    pub fn from_report(
        log_path: &Path,
        report: DarshanReport,
        config: &ReportConfig,
    ) -> Result<Self> {
        let stylesheet = match &config.stylesheet {
            Some(path) => readfile(path)?,
            None => DEFAULT_STYLESHEET.to_string(),
        };

        let table = io_cost_table(&report)?;
        let io_cost = if table.is_empty() {
            info!("no POSIX, MPI-IO or STDIO data, skipping I/O cost");
            None
        } else {
            Some(plot_io_cost(&table, report.job.runtime(), config.io_cost))
        };

        Ok(ReportData {
            log_path: log_path.to_path_buf(),
            header: header(&report),
            footer: footer(),
            stylesheet,
            metadata_table: html::table(&metadata_rows(&report, log_path)),
            module_table: html::table(&module_rows(&report)),
            io_cost,
            report,
        })
    }

    /// The complete report as a standalone HTML page.
    pub fn to_html(&self) -> String {
        let io_cost = match &self.io_cost {
            Some(chart) => format!(
                "<h2>I/O Cost</h2>\n<figure>\n{}\n<figcaption>{IO_COST_CAPTION}</figcaption>\n</figure>\n",
                chart.plot.to_inline_html(Some("io-cost"))
            ),
            None => String::new(),
        };

        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <title>{header}</title>\n\
             <style>\n{style}\n</style>\n\
             <script src=\"{PLOTLY_CDN}\"></script>\n\
             </head>\n\
             <body>\n\
             <h1>{header}</h1>\n\
             <h2>Job Summary</h2>\n{metadata}\n\
             <h2>Darshan Log Information</h2>\n{modules}\n\
             {io_cost}\
             <footer>\n<p>{footer}</p>\n</footer>\n\
             </body>\n\
             </html>\n",
            header = html::escape_html(&self.header),
            style = self.stylesheet,
            metadata = self.metadata_table,
            modules = self.module_table,
            footer = html::escape_html(&self.footer),
        )
    }

    pub fn write_html(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_html())
            .map_err(|e| format!("failed to write report {path:?}: {e}"))?;
        info!("report for {:?} written to {path:?}", self.log_path);
        Ok(())
    }
}
