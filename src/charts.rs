//! Chart-ready data derived from a schema profile
//!
//! Nothing here draws anything. The host renders histograms, box plots,
//! scatter plots, correlation heatmaps and count charts from these values.

use serde::Serialize;

use crate::profiler::{CategoryCount, NumericColumn, SchemaProfile};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    BoxPlot,
    Scatter,
    CorrelationHeatmap,
    CategoryCount,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::BoxPlot,
        ChartKind::CorrelationHeatmap,
        ChartKind::CategoryCount,
    ];

    /// Eligible columns needed before the chart means anything
    pub fn required_columns(self) -> usize {
        match self {
            ChartKind::Scatter | ChartKind::CorrelationHeatmap => 2,
            _ => 1,
        }
    }

    fn wants_numeric(self) -> bool {
        !matches!(self, ChartKind::CategoryCount)
    }
}

/// Whether a chart can be drawn for the active dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Available { columns: Vec<String> },
    Insufficient { needed: usize, available: usize },
}

/// Not enough suitable columns for the requested chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("insufficient columns: need {needed}, have {available}")]
pub struct Insufficient {
    pub needed: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartOption {
    pub chart: ChartKind,
    pub availability: Availability,
}

/// Per-chart eligibility for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPlan {
    pub options: Vec<ChartOption>,
}

impl ChartPlan {
    pub fn from_profile(profile: &SchemaProfile) -> Self {
        let numeric: Vec<String> = profile.numeric().map(|c| c.name.clone()).collect();
        let categorical: Vec<String> = profile.categorical().map(|c| c.name.clone()).collect();

        let options = ChartKind::ALL
            .iter()
            .map(|&chart| {
                let columns = if chart.wants_numeric() {
                    &numeric
                } else {
                    &categorical
                };
                let needed = chart.required_columns();
                let availability = if columns.len() >= needed {
                    Availability::Available {
                        columns: columns.clone(),
                    }
                } else {
                    Availability::Insufficient {
                        needed,
                        available: columns.len(),
                    }
                };
                ChartOption {
                    chart,
                    availability,
                }
            })
            .collect();

        Self { options }
    }

    pub fn get(&self, chart: ChartKind) -> Option<&Availability> {
        self.options
            .iter()
            .find(|o| o.chart == chart)
            .map(|o| &o.availability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the column range. A constant column gets one bin.
pub fn histogram(column: &NumericColumn, bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    if column.count == 0 {
        return Vec::new();
    }
    if column.min == column.max {
        return vec![HistogramBin {
            start: column.min,
            end: column.max,
            count: column.count,
        }];
    }

    let width = (column.max - column.min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: column.min + width * i as f64,
            end: if i + 1 == bins {
                column.max
            } else {
                column.min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in column.present() {
        let idx = (((value - column.min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Box plot statistics. Quartiles use linear interpolation between ranks;
/// whiskers reach the furthest values within 1.5 IQR of the box.
pub fn box_stats(column: &NumericColumn) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = column.present().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (low_fence, high_fence) = (q1 - fence, q3 + fence);

    let inside = sorted.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
    let lower_whisker = inside.clone().next().unwrap_or(q1);
    let upper_whisker = inside.last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Pearson correlations between every pair of numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where fewer than two rows are shared or a column is constant
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(profile: &SchemaProfile) -> Result<CorrelationMatrix, Insufficient> {
    let numeric: Vec<(&str, &NumericColumn)> = profile
        .columns
        .iter()
        .filter_map(|c| c.as_numeric().map(|n| (c.name.as_str(), n)))
        .collect();
    if numeric.len() < 2 {
        return Err(Insufficient {
            needed: 2,
            available: numeric.len(),
        });
    }

    let values = numeric
        .iter()
        .map(|(_, a)| numeric.iter().map(|(_, b)| pearson(a, b)).collect())
        .collect();

    Ok(CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

/// Pearson coefficient over rows where both columns have a value.
fn pearson(a: &NumericColumn, b: &NumericColumn) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .values
        .iter()
        .zip(&b.values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Points for a scatter plot of column `x` against column `y`.
pub fn scatter_points(
    profile: &SchemaProfile,
    x: &str,
    y: &str,
) -> Result<Vec<(f64, f64)>, Insufficient> {
    let available = profile.numeric().count();
    let insufficient = Insufficient {
        needed: 2,
        available,
    };
    if available < 2 {
        return Err(insufficient);
    }

    let xs = profile.get(x).and_then(|c| c.as_numeric()).ok_or(insufficient)?;
    let ys = profile.get(y).and_then(|c| c.as_numeric()).ok_or(insufficient)?;

    Ok(xs
        .values
        .iter()
        .zip(&ys.values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect())
}

/// Category counts of a column, ready for a bar chart
pub fn category_counts<'a>(profile: &'a SchemaProfile, column: &str) -> Option<&'a [CategoryCount]> {
    profile
        .get(column)
        .and_then(|c| c.as_categorical())
        .map(|c| c.counts.as_slice())
}
