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

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use darshan_report::common::{Result, emsg};
use darshan_report::plotters::io_cost::io_cost_table;
use darshan_report::summary::ReportData;
use darshan_report::summary::configuration::{ReportConfig, read_config};

/// Generates a Darshan Summary Report
#[derive(Parser, Debug)]
#[command(name = "darshan-summary", version)]
struct Cli {
    /// Darshan logs (binary .darshan or darshan-parser output), glob patterns allowed
    #[arg(required = true, value_name = "LOG_PATH")]
    log_paths: Vec<String>,

    /// Report file name, only with a single log [default: <log name>_report.html]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// YAML report configuration
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also save the I/O cost chart as a standalone HTML page, only with a single log
    #[arg(long, value_name = "PATH")]
    io_cost_html: Option<PathBuf>,

    /// Print the I/O cost table as JSON
    #[arg(long)]
    io_cost_json: bool,
}

fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| format!("bad log path pattern '{pattern}': {e}"))?
            .flatten()
            .collect();

        if matches.is_empty() {
            // not a pattern or nothing matched, let the loader report a missing file
            paths.push(PathBuf::from(pattern));
        } else {
            paths.extend(matches);
        }
    }
    Ok(paths)
}

fn default_output(log_path: &Path) -> PathBuf {
    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "darshan".to_string());
    PathBuf::from(format!("{stem}_report.html"))
}

fn process_log(cli: &Cli, config: &ReportConfig, log_path: &Path) -> Result<()> {
    let data = ReportData::new(log_path, config)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(log_path));
    data.write_html(&output)?;

    if let Some(path) = &cli.io_cost_html {
        match &data.io_cost {
            Some(chart) => {
                chart.plot.write_html(path);
                info!("I/O cost chart written to {path:?}");
            }
            None => warn!("{log_path:?} has no I/O cost data, {path:?} not written"),
        }
    }

    if cli.io_cost_json {
        let table = io_cost_table(&data.report)?;
        let json = serde_json::to_string_pretty(&table)
            .map_err(|e| format!("failed to serialize I/O cost: {e}"))?;
        println!("{json}");
    }

    Ok(())
}

fn main_wrapper(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ReportConfig::default(),
    };

    let logs = expand_paths(&cli.log_paths)?;
    if logs.len() > 1 && (cli.output.is_some() || cli.io_cost_html.is_some()) {
        return emsg("--output and --io-cost-html need exactly one log");
    }

    for log_path in &logs {
        process_log(&cli, &config, log_path)?;
    }

    info!("done, {} report(s) generated", logs.len());
    Ok(())
}

fn main() {
    // init log with Info level by default
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(msg) = main_wrapper(cli) {
        error!("Error: {msg}");
        std::process::exit(1);
    }
}
