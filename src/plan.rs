//! Chart planning: reshape table rows into a renderable chart specification.
//!
//! Given a user-selected column subset, the planner picks a chart type from
//! the columns' observed numericness, builds one point per surviving row, and
//! post-processes by type: pie charts aggregate counts per distinct value of
//! the first selected column, everything else is capped at
//! [`MAX_CHART_POINTS`] points by even-stride downsampling. The cap is a
//! fixed performance bound, not a statistically faithful sample.
//!
//! [`placeholder_spec`] produces the shape-compatible fallback the analysis
//! layer serves when real data cannot be re-fetched: same selection-driven
//! typing, procedurally generated points sized to the dataset's nominal row
//! count.

use std::collections::BTreeMap;

use itertools::Itertools;
use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    decode::{Cell, Table},
    error::PipelineError,
    profile::is_numeric_column,
};

/// Upper bound on points handed to the renderer for non-pie charts.
pub const MAX_CHART_POINTS: usize = 100;

/// Upper bound on procedurally generated placeholder points.
pub const MAX_PLACEHOLDER_POINTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Scatter,
    Line,
    Bar,
    Pie,
    Area,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Scatter => "scatter",
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Area => "area",
        }
    }
}

/// One chart-ready point: selected column names mapped to cell values, in
/// selection order. Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartPoint {
    fields: Vec<(String, Cell)>,
}

impl ChartPoint {
    fn push(&mut self, name: &str, cell: Cell) {
        self.fields.push((name.to_string(), cell));
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, cell)| cell)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn all_values_empty(&self) -> bool {
        self.fields.iter().all(|(_, cell)| cell.is_empty())
    }
}

impl Serialize for ChartPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// One aggregated pie entry: a distinct first-column value and its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: u64,
}

/// Chart data is either raw points or a pie aggregation; the two never mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Points(Vec<ChartPoint>),
    Slices(Vec<PieSlice>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Points(points) => points.len(),
            ChartData::Slices(slices) => slices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub description: String,
    pub data: ChartData,
    #[serde(rename = "xAxis")]
    pub x_axis: String,
    #[serde(rename = "yAxis")]
    pub y_axis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Plans a chart for `selected` columns over real table data.
pub fn plan(
    table: &Table,
    selected: &[String],
    dataset_name: &str,
) -> Result<ChartSpec, PipelineError> {
    ensure_selection(selected)?;
    let indices = selected
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| PipelineError::ColumnNotFound { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let points = build_points(table, selected, &indices);
    let chart_type = select_chart_type(&points, selected);
    let data = match chart_type {
        ChartType::Pie => ChartData::Slices(aggregate_pie(&points, &selected[0])),
        _ => ChartData::Points(downsample(points, MAX_CHART_POINTS)),
    };
    Ok(spec_shell(chart_type, selected, dataset_name, data))
}

/// Shape-compatible fallback specification with placeholder data, served
/// when the stored file cannot be re-fetched or re-decoded. `nominal_rows`
/// is the row count recorded at upload time.
pub fn placeholder_spec(
    selected: &[String],
    dataset_name: &str,
    nominal_rows: usize,
) -> Result<ChartSpec, PipelineError> {
    ensure_selection(selected)?;
    let chart_type = fallback_chart_type(selected.len());
    let size = nominal_rows.min(MAX_PLACEHOLDER_POINTS);
    let mut rng = rand::thread_rng();
    let mut points = Vec::with_capacity(size);
    for i in 0..size {
        let mut point = ChartPoint::default();
        for (position, column) in selected.iter().enumerate() {
            let cell = if position == 0 {
                match chart_type {
                    ChartType::Scatter | ChartType::Line => Cell::Number(i as f64),
                    _ => Cell::Text(format!("Group {}", i % 8 + 1)),
                }
            } else {
                Cell::Number(f64::from(rng.gen_range(10..110)))
            };
            point.push(column, cell);
        }
        points.push(point);
    }
    Ok(spec_shell(
        chart_type,
        selected,
        dataset_name,
        ChartData::Points(points),
    ))
}

fn ensure_selection(selected: &[String]) -> Result<(), PipelineError> {
    if selected.len() < 2 {
        return Err(PipelineError::InsufficientColumns {
            selected: selected.len(),
        });
    }
    Ok(())
}

// One point per source row; absent and null cells become empty strings so the
// renderer always sees every selected field. Points with no data at all are
// dropped.
fn build_points(table: &Table, selected: &[String], indices: &[usize]) -> Vec<ChartPoint> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let mut point = ChartPoint::default();
            for (name, &index) in selected.iter().zip(indices) {
                let cell = match row.get(index) {
                    Some(Cell::Null) | None => Cell::Text(String::new()),
                    Some(cell) => cell.clone(),
                };
                point.push(name, cell);
            }
            (!point.all_values_empty()).then_some(point)
        })
        .collect()
}

/// Decision table for exactly two selected columns:
///
/// | first numeric | second numeric | type    |
/// |---------------|----------------|---------|
/// | yes           | yes            | scatter |
/// | one of them   |                | bar     |
/// | no            | no             | pie     |
///
/// Three or more selections always produce a bar chart.
fn select_chart_type(points: &[ChartPoint], selected: &[String]) -> ChartType {
    if selected.len() >= 3 {
        return ChartType::Bar;
    }
    let first = realized_point_values(points, &selected[0]);
    let second = realized_point_values(points, &selected[1]);
    match (is_numeric_column(&first), is_numeric_column(&second)) {
        (true, true) => ChartType::Scatter,
        (true, false) | (false, true) => ChartType::Bar,
        (false, false) => ChartType::Pie,
    }
}

fn realized_point_values<'a>(points: &'a [ChartPoint], name: &str) -> Vec<&'a Cell> {
    points
        .iter()
        .filter_map(|point| point.get(name))
        .filter(|cell| !cell.is_empty())
        .collect()
}

// Counts occurrences of each distinct rendered value of the first selected
// column. Output order follows the natural key order, not first-seen order.
fn aggregate_pie(points: &[ChartPoint], first_column: &str) -> Vec<PieSlice> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for point in points {
        let label = match point.get(first_column) {
            Some(cell) if !cell.is_empty() => cell.render(),
            _ => String::from("Unknown"),
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(name, value)| PieSlice { name, value })
        .collect()
}

// Every k-th point, then a hard truncation. Deterministic, not a random
// sample.
fn downsample(points: Vec<ChartPoint>, max_points: usize) -> Vec<ChartPoint> {
    if points.len() <= max_points {
        return points;
    }
    let step = points.len() / max_points;
    points
        .into_iter()
        .step_by(step.max(1))
        .take(max_points)
        .collect()
}

fn fallback_chart_type(selection_len: usize) -> ChartType {
    match selection_len {
        2 => ChartType::Scatter,
        3 => ChartType::Bar,
        _ => ChartType::Line,
    }
}

fn spec_shell(
    chart_type: ChartType,
    selected: &[String],
    dataset_name: &str,
    data: ChartData,
) -> ChartSpec {
    ChartSpec {
        chart_type,
        title: format!("{} vs {} Analysis", selected[0], selected[1]),
        description: format!(
            "Visualization of {} from {}",
            selected.iter().join(" and "),
            dataset_name
        ),
        data,
        x_axis: selected[0].clone(),
        y_axis: selected[1].clone(),
        category: selected.get(2).cloned(),
    }
}
