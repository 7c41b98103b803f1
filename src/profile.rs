//! Column profiling: semantic type judgments plus representative values.
//!
//! Two distinct derivations that must never be conflated:
//!
//! - **Observed** (full mode): types come from actual cell values via the
//!   majority-type rule, and samples are real values drawn from the table.
//! - **Heuristic** (fallback mode): no data is available, so types come from
//!   substring matches against the column name and samples are synthesized.
//!   This keeps callers functional when the stored file cannot be fetched;
//!   the `source` field marks the output so it is never presented as ground
//!   truth.

use chrono::{Days, Local};
use serde::{Deserialize, Serialize};

use crate::decode::{Cell, Table};

/// A column is numeric when more than this fraction of its realized values
/// coerce to a finite number. A column that is 85% numeric with a few "N/A"
/// outliers still counts.
pub const NUMERIC_MAJORITY_THRESHOLD: f64 = 0.8;

const SAMPLE_VALUE_LIMIT: usize = 5;

const DATE_NAME_TOKENS: &[&str] = &["date", "time", "created", "updated"];
const NUMERIC_NAME_TOKENS: &[&str] = &[
    "id", "count", "number", "price", "amount", "quantity", "age", "score", "rating",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Categorical,
    Date,
    Unknown,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::Categorical => "categorical",
            DataType::Date => "date",
            DataType::Unknown => "unknown",
        }
    }
}

/// Whether a profile was derived from real cell values or from the column
/// name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Observed,
    Heuristic,
}

impl ProfileSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSource::Observed => "observed",
            ProfileSource::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(rename = "sampleValues")]
    pub sample_values: Vec<String>,
    pub source: ProfileSource,
}

/// Profiles one entry per requested column name. Columns present in the
/// table are profiled from their realized values; names the table does not
/// carry degrade individually to the heuristic path. Never fails.
pub fn profile(names: &[String], table: Option<&Table>) -> Vec<ColumnProfile> {
    names
        .iter()
        .map(|name| {
            match table.and_then(|table| table.column_index(name).map(|idx| (table, idx))) {
                Some((table, index)) => observed_profile(name, table, index),
                None => heuristic_profile(name),
            }
        })
        .collect()
}

/// Full-mode profiling of every column in the table.
pub fn profile_table(table: &Table) -> Vec<ColumnProfile> {
    profile(&table.columns().to_vec(), Some(table))
}

/// Name-only fallback profiling for every requested column.
pub fn fallback_profiles(names: &[String]) -> Vec<ColumnProfile> {
    names.iter().map(|name| heuristic_profile(name)).collect()
}

/// Majority-type test shared with the chart planner.
pub fn is_numeric_column(values: &[&Cell]) -> bool {
    if values.is_empty() {
        return false;
    }
    let numeric = values
        .iter()
        .filter(|cell| cell.as_finite_f64().is_some())
        .count();
    numeric as f64 / values.len() as f64 > NUMERIC_MAJORITY_THRESHOLD
}

fn observed_profile(name: &str, table: &Table, index: usize) -> ColumnProfile {
    let realized = table.realized_values(index);
    let data_type = if is_numeric_column(&realized) {
        DataType::Numeric
    } else if contains_token(name, DATE_NAME_TOKENS) {
        DataType::Date
    } else if realized.is_empty() {
        DataType::Unknown
    } else {
        DataType::Categorical
    };
    let sample_values = realized
        .iter()
        .take(SAMPLE_VALUE_LIMIT)
        .map(|cell| cell.render())
        .collect();
    ColumnProfile {
        name: name.to_string(),
        data_type,
        sample_values,
        source: ProfileSource::Observed,
    }
}

fn heuristic_profile(name: &str) -> ColumnProfile {
    ColumnProfile {
        name: name.to_string(),
        data_type: heuristic_type(name),
        sample_values: heuristic_samples(name),
        source: ProfileSource::Heuristic,
    }
}

fn heuristic_type(name: &str) -> DataType {
    if contains_token(name, DATE_NAME_TOKENS) {
        DataType::Date
    } else if contains_token(name, NUMERIC_NAME_TOKENS) {
        DataType::Numeric
    } else {
        DataType::Categorical
    }
}

// Dictionary checks run in a fixed precedence order; the first match wins.
fn heuristic_samples(name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    let contains = |token: &str| lowered.contains(token);

    if contains("date") || contains("time") {
        let today = Local::now().date_naive();
        return (0..SAMPLE_VALUE_LIMIT as u64)
            .map(|offset| {
                (today + Days::new(offset))
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .collect();
    }
    if contains("id") {
        return (1..=SAMPLE_VALUE_LIMIT).map(|n| n.to_string()).collect();
    }
    if contains("price") || contains("amount") {
        return ["$25.99", "$45.50", "$12.75", "$89.99", "$33.25"]
            .map(String::from)
            .to_vec();
    }
    if contains("name") || contains("title") {
        return ["Product A", "Product B", "Product C", "Product D", "Product E"]
            .map(String::from)
            .to_vec();
    }
    if contains("category") || contains("type") {
        return ["Electronics", "Clothing", "Books", "Home", "Sports"]
            .map(String::from)
            .to_vec();
    }
    if contains("status") {
        return ["Active", "Inactive", "Pending", "Completed", "Cancelled"]
            .map(String::from)
            .to_vec();
    }
    (1..=SAMPLE_VALUE_LIMIT)
        .map(|n| format!("Value {n}"))
        .collect()
}

fn contains_token(name: &str, tokens: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    tokens.iter().any(|token| lowered.contains(token))
}
