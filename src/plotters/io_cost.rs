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

//! I/O cost: average time each process spent in read, write and metadata operations.

use log::{debug, warn};
use plotly::common::AxisSide;
use plotly::layout::{Axis, BarMode, Legend, TraceOrder};
use plotly::{Bar, Layout, Plot};
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::plotters::ticks::{auto_ticks, bins_for_height, format_tick, linspace};
use crate::report::{CounterTable, DarshanReport};

/// Modules which record read, write and metadata timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoModule {
    Posix,
    MpiIo,
    Stdio,
}

impl IoModule {
    pub const ALL: [IoModule; 3] = [IoModule::Posix, IoModule::MpiIo, IoModule::Stdio];

    pub fn from_log_name(name: &str) -> Option<IoModule> {
        match name {
            "POSIX" => Some(IoModule::Posix),
            "MPI-IO" => Some(IoModule::MpiIo),
            "STDIO" => Some(IoModule::Stdio),
            _ => None,
        }
    }

    /// Module name as it appears in the log.
    pub fn log_name(self) -> &'static str {
        match self {
            IoModule::Posix => "POSIX",
            IoModule::MpiIo => "MPI-IO",
            IoModule::Stdio => "STDIO",
        }
    }

    /// Counter prefix, also used as the chart label.
    pub fn key(self) -> &'static str {
        match self {
            IoModule::Posix => "POSIX",
            IoModule::MpiIo => "MPIIO",
            IoModule::Stdio => "STDIO",
        }
    }

    /// Read, write and metadata timer columns, in this order.
    pub fn timers(self) -> [&'static str; 3] {
        match self {
            IoModule::Posix => [
                "POSIX_F_READ_TIME",
                "POSIX_F_WRITE_TIME",
                "POSIX_F_META_TIME",
            ],
            IoModule::MpiIo => [
                "MPIIO_F_READ_TIME",
                "MPIIO_F_WRITE_TIME",
                "MPIIO_F_META_TIME",
            ],
            IoModule::Stdio => [
                "STDIO_F_READ_TIME",
                "STDIO_F_WRITE_TIME",
                "STDIO_F_META_TIME",
            ],
        }
    }
}

impl Serialize for IoModule {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.key())
    }
}

/// Average seconds per process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IoCost {
    pub read: f64,
    pub write: f64,
    pub meta: f64,
}

impl IoCost {
    pub fn total(&self) -> f64 {
        self.read + self.write + self.meta
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.read, self.write, self.meta]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IoCostRow {
    pub module: IoModule,
    #[serde(flatten)]
    pub cost: IoCost,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IoCostTable {
    rows: Vec<IoCostRow>,
}

impl IoCostTable {
    pub fn rows(&self) -> &[IoCostRow] {
        &self.rows
    }

    pub fn get(&self, module: IoModule) -> Option<&IoCost> {
        self.rows
            .iter()
            .find(|row| row.module == module)
            .map(|row| &row.cost)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sum the module timers over all records and divide the sums by the process count.
pub fn by_avg(fcounters: &CounterTable<f64>, module: IoModule, nprocs: u64) -> Result<IoCost> {
    if nprocs == 0 {
        return Err(format!(
            "cannot average {} timers over zero processes",
            module.log_name()
        ));
    }

    let mut avg = [0.0; 3];
    for (value, name) in avg.iter_mut().zip(module.timers()) {
        let column = fcounters.column(name).ok_or_else(|| {
            format!(
                "missing data: no column {name} in {} records",
                module.log_name()
            )
        })?;
        *value = column.iter().sum::<f64>() / nprocs as f64;
    }

    let [read, write, meta] = avg;
    Ok(IoCost { read, write, meta })
}

/// Build the I/O cost table for every supported module present in the log, in log order.
pub fn io_cost_table(report: &DarshanReport) -> Result<IoCostTable> {
    let mut rows = vec![];
    for (name, _) in report.modules() {
        let Some(module) = IoModule::from_log_name(name) else {
            debug!("no I/O cost for module {name}");
            continue;
        };

        let cost = match report.records(name) {
            Some(records) => by_avg(&records.fcounters, module, report.job.nprocs)?,
            // region present but no records
            None => IoCost::default(),
        };
        rows.push(IoCostRow { module, cost });
    }
    Ok(IoCostTable { rows })
}

/// Chart dimensions in pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FigureSize {
    #[serde(default = "FigureSize::default_width")]
    pub width: usize,
    #[serde(default = "FigureSize::default_height")]
    pub height: usize,
}

impl FigureSize {
    fn default_width() -> usize {
        450
    }

    fn default_height() -> usize {
        400
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        FigureSize {
            width: FigureSize::default_width(),
            height: FigureSize::default_height(),
        }
    }
}

/// Rendered I/O cost chart together with the axis layout it was built with.
pub struct IoCostChart {
    pub plot: Plot,
    pub runtime: f64,
    pub seconds_ticks: Vec<f64>,
    pub percent_ticks: Vec<f64>,
    pub legend: Vec<&'static str>,
}

/// Runtime used for axis scaling, a zero runtime is shown as one second.
pub fn effective_runtime(runtime: i64) -> f64 {
    if runtime < 0 {
        warn!("negative job runtime {runtime}, plotting as 1 second");
    }
    if runtime <= 0 { 1.0 } else { runtime as f64 }
}

// bottom of the stack first, same order as IoCost::as_array()
const SERIES: [&str; 3] = ["Read", "Write", "Meta"];

/// Stacked bar chart of the I/O cost with seconds on the left axis and percent of the runtime on
/// the right one. Grid lines of both axes coincide.
pub fn plot_io_cost(table: &IoCostTable, runtime: i64, size: FigureSize) -> IoCostChart {
    let runtime = effective_runtime(runtime);

    let labels: Vec<String> = table
        .rows()
        .iter()
        .map(|row| row.module.key().to_string())
        .collect();

    let mut plot = Plot::new();
    for (i, name) in SERIES.into_iter().enumerate() {
        let values: Vec<f64> = table.rows().iter().map(|row| row.cost.as_array()[i]).collect();
        plot.add_trace(Bar::new(labels.clone(), values).name(name));
    }

    // percent ticks drive the seconds ticks so both axes share the grid
    let percent_ticks = auto_ticks(0.0, 100.0, bins_for_height(size.height));
    let seconds_ticks = linspace(0.0, runtime, percent_ticks.len());

    let percent_text: Vec<String> = percent_ticks
        .iter()
        .map(|t| format!("{}%", format_tick(*t)))
        .collect();
    let seconds_text: Vec<String> = seconds_ticks.iter().map(|t| format_tick(*t)).collect();

    plot.set_layout(
        Layout::new()
            .bar_mode(BarMode::Stack)
            .y_axis(
                Axis::new()
                    .title("Runtime (s)")
                    .range(vec![0.0, runtime])
                    .tick_values(seconds_ticks.clone())
                    .tick_text(seconds_text)
                    .show_grid(true),
            )
            .y_axis2(
                Axis::new()
                    .overlaying("y")
                    .side(AxisSide::Right)
                    .range(vec![0.0, 100.0])
                    .tick_values(percent_ticks.clone())
                    .tick_text(percent_text)
                    .show_grid(false),
            )
            .legend(Legend::new().trace_order(TraceOrder::Reversed).x(1.2))
            .width(size.width)
            .height(size.height),
    );

    let legend = SERIES.into_iter().rev().collect();

    IoCostChart {
        plot,
        runtime,
        seconds_ticks,
        percent_ticks,
        legend,
    }
}

/// Aggregate the report and plot its I/O cost.
pub fn plot_report_io_cost(report: &DarshanReport, size: FigureSize) -> Result<IoCostChart> {
    let table = io_cost_table(report)?;
    Ok(plot_io_cost(&table, report.job.runtime(), size))
}
