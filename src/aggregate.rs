//! Grouped aggregation shared by every dashboard.
//!
//! Each breakdown in the dashboards has the same shape: group rows by one or
//! two category columns, reduce a numeric column with count, sum, mean, min
//! or max, give the results display labels and sort descending by one of
//! them. [`AggregateSpec`] captures that shape once.
//!
//! Groups appear in order of first appearance and the descending sort is
//! stable, so groups with equal values keep that order. Rows whose group key
//! is missing form their own group, so counts always add up to the input
//! height.

use crate::error::{DashboardError, Result};
use crate::frame::{self, has_column};
use crate::models::round_to;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reduction applied to a metric column within each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggOp {
    /// Number of rows in the group, whatever the metric holds
    Count,
    Sum,
    Mean,
    Min,
    Max,
}

impl AggOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggOp::Count => "count",
            AggOp::Sum => "sum",
            AggOp::Mean => "mean",
            AggOp::Min => "min",
            AggOp::Max => "max",
        }
    }

    fn expr(&self, metric: &str) -> Expr {
        let values = col(metric).cast(DataType::Float64);
        match self {
            AggOp::Count => len().cast(DataType::Int64),
            AggOp::Sum => values.sum(),
            AggOp::Mean => values.mean(),
            AggOp::Min => values.min(),
            AggOp::Max => values.max(),
        }
    }
}

/// One output column of an aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggOutput {
    pub metric: String,
    pub op: AggOp,
    pub label: String,
    pub decimals: Option<u32>,
}

/// Builder for a grouped aggregation
#[derive(Debug, Clone, Default)]
pub struct AggregateSpec {
    group_by: Vec<String>,
    outputs: Vec<AggOutput>,
    sort_by: Option<String>,
}

impl AggregateSpec {
    pub fn new<I, S>(group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add a `(metric, op)` output named `label`
    pub fn with_output(
        mut self,
        metric: impl Into<String>,
        op: AggOp,
        label: impl Into<String>,
    ) -> Self {
        self.outputs.push(AggOutput {
            metric: metric.into(),
            op,
            label: label.into(),
            decimals: None,
        });
        self
    }

    /// Add a rounded `(metric, op)` output named `label`
    pub fn with_rounded_output(
        mut self,
        metric: impl Into<String>,
        op: AggOp,
        label: impl Into<String>,
        decimals: u32,
    ) -> Self {
        self.outputs.push(AggOutput {
            metric: metric.into(),
            op,
            label: label.into(),
            decimals: Some(decimals),
        });
        self
    }

    /// Add a row count named `label`
    pub fn with_count(self, label: impl Into<String>) -> Self {
        let label = label.into();
        let metric = self.group_by.first().cloned().unwrap_or_default();
        self.with_output(metric, AggOp::Count, label)
    }

    /// Sort descending by the output (or group column) named `label`
    pub fn sorted_by(mut self, label: impl Into<String>) -> Self {
        self.sort_by = Some(label.into());
        self
    }

    pub fn outputs(&self) -> &[AggOutput] {
        &self.outputs
    }

    /// Columns the aggregation reads that `df` does not have
    pub fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        let metrics = self
            .outputs
            .iter()
            .filter(|output| output.op != AggOp::Count)
            .map(|output| &output.metric);

        for name in self.group_by.iter().chain(metrics) {
            if !has_column(df, name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        missing
    }

    /// Run the aggregation over `df`
    pub fn run(&self, df: &DataFrame) -> Result<DataFrame> {
        if self.group_by.is_empty() {
            return Err(DashboardError::configuration(
                "Aggregation needs at least one group column",
            ));
        }
        let missing = self.missing_columns(df);
        if !missing.is_empty() {
            return Err(DashboardError::missing_columns("aggregation", missing));
        }

        let keys: Vec<Expr> = self.group_by.iter().map(|name| col(name.as_str())).collect();
        let exprs: Vec<Expr> = self
            .outputs
            .iter()
            .map(|output| output.op.expr(&output.metric).alias(output.label.as_str()))
            .collect();

        let mut lf = df.clone().lazy().group_by_stable(keys).agg(exprs);

        if let Some(sort_by) = &self.sort_by {
            lf = lf.sort_by_exprs(
                [col(sort_by.as_str())],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            );
        }

        let mut result = lf.collect()?;

        for output in &self.outputs {
            if let Some(decimals) = output.decimals {
                let rounded = frame::float_values(&result, &output.label)?
                    .into_iter()
                    .map(|value| value.map(|v| round_to(v, decimals)))
                    .collect();
                frame::set_float_column(&mut result, &output.label, rounded)?;
            }
        }

        debug!(
            "Aggregated {} rows into {} groups by {}",
            df.height(),
            result.height(),
            self.group_by.join(", ")
        );
        Ok(result)
    }
}

/// Group `table` by `group_by` and reduce `metric_col` with each of `ops`
///
/// Output columns are the group columns followed by one column per op,
/// named after the op (`count`, `sum`, `mean`, `min`, `max`). When
/// `sort_by` is given the result is sorted descending by that column.
pub fn aggregate(
    table: &DataFrame,
    group_by: &[&str],
    metric_col: &str,
    ops: &[AggOp],
    sort_by: Option<&str>,
) -> Result<DataFrame> {
    let mut spec = AggregateSpec::new(group_by.iter().copied());
    for op in ops {
        spec = spec.with_output(metric_col, *op, op.as_str());
    }
    if let Some(sort_by) = sort_by {
        spec = spec.sorted_by(sort_by);
    }
    spec.run(table)
}

/// Count rows per distinct combination of `columns`, most frequent first
pub fn value_counts(table: &DataFrame, columns: &[&str], label: &str) -> Result<DataFrame> {
    AggregateSpec::new(columns.iter().copied())
        .with_count(label)
        .sorted_by(label)
        .run(table)
}

/// Top-N truncation with a "show all" escape hatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopN {
    pub limit: usize,
    pub show_all: bool,
}

/// Result of applying [`TopN`] to a table
#[derive(Debug, Clone)]
pub struct Truncated {
    pub frame: DataFrame,
    pub total_rows: usize,
}

impl Truncated {
    pub fn shown_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn hidden_rows(&self) -> usize {
        self.total_rows - self.frame.height()
    }

    pub fn is_truncated(&self) -> bool {
        self.hidden_rows() > 0
    }
}

impl TopN {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            show_all: false,
        }
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Keep the first `limit` rows unless everything is requested
    pub fn apply(&self, df: &DataFrame) -> Truncated {
        let frame = if self.show_all || df.height() <= self.limit {
            df.clone()
        } else {
            df.head(Some(self.limit))
        };
        Truncated {
            frame,
            total_rows: df.height(),
        }
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_TOP_N)
    }
}
