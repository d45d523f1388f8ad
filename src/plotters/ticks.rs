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

/// Tick step multipliers tried for every power of ten.
const STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

const EPS: f64 = 1e-9;

/// How many tick intervals fit on a vertical axis of the given figure height in pixels.
pub fn bins_for_height(height: usize) -> usize {
    (height / 80).clamp(2, 9)
}

/// Pick "nice" tick positions inside `[lo, hi]` using at most `max_bins` intervals.
///
/// The step is the smallest of 1, 2, 2.5, 5 or 10 times a power of ten which splits the range
/// into no more than `max_bins` intervals.
pub fn auto_ticks(lo: f64, hi: f64, max_bins: usize) -> Vec<f64> {
    let span = hi - lo;
    if span <= 0.0 || !span.is_finite() || max_bins == 0 {
        return vec![lo];
    }

    let raw_step = span / max_bins as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = STEPS
        .iter()
        .map(|s| s * magnitude)
        .find(|s| *s >= raw_step * (1.0 - EPS))
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step - EPS).ceil() as i64 as f64 * step;
    let count = ((hi - first) / step + EPS).floor() as usize + 1;
    (0..count).map(|i| first + i as f64 * step).collect()
}

/// `count` evenly spaced values from `lo` to `hi`, both ends included.
pub fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![lo],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        hi
                    } else {
                        lo + (hi - lo) * i as f64 / last
                    }
                })
                .collect()
        }
    }
}

/// Short tick label: at most two decimals, no trailing zeros.
pub fn format_tick(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
