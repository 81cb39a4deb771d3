//! Human-readable rendering of matrices

use std::fmt::{self, Display, Formatter, Write};

use crate::matrix::DoubleMatrix;

/// Default row/column limit when truncation is requested
pub const DEFAULT_TRUNCATE_LIMIT: usize = 8;

/// Options for [`DoubleMatrix::pretty_string`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrettyConfig {
    /// Maximum number of leading rows to render, `None` for all
    pub max_rows: Option<usize>,
    /// Maximum number of leading columns to render, `None` for all
    pub max_cols: Option<usize>,
    /// Digits after the decimal point, `None` for shortest round-trip form
    pub precision: Option<usize>,
}

impl PrettyConfig {
    pub fn full() -> Self {
        Self {
            max_rows: None,
            max_cols: None,
            precision: None,
        }
    }

    pub fn truncated() -> Self {
        Self {
            max_rows: Some(DEFAULT_TRUNCATE_LIMIT),
            max_cols: Some(DEFAULT_TRUNCATE_LIMIT),
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self::full()
    }
}

const ELLIPSIS_H: &str = "…";
const ELLIPSIS_V: &str = "⋮";

impl DoubleMatrix {
    /// Render the matrix as a boxed grid
    ///
    /// With a row/column limit, only the leading rows/columns are printed and an
    /// ellipsis marks the elided part. The header line always carries the full
    /// shape.
    pub fn pretty_string(&self, config: &PrettyConfig) -> String {
        let (rows, cols) = self.shape();
        let shown_rows = config.max_rows.map_or(rows, |limit| rows.min(limit.max(1)));
        let shown_cols = config.max_cols.map_or(cols, |limit| cols.min(limit.max(1)));
        let more_rows = shown_rows < rows;
        let more_cols = shown_cols < cols;

        let cells: Vec<Vec<String>> = (0..shown_rows)
            .map(|i| {
                (0..shown_cols)
                    .map(|j| match config.precision {
                        Some(p) => format!("{:.1$}", self.get(i, j), p),
                        None => format!("{}", self.get(i, j)),
                    })
                    .collect()
            })
            .collect();
        let width = cells
            .iter()
            .flatten()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1);

        let grid_cols = shown_cols + usize::from(more_cols);
        let inner = (width + 1) * grid_cols;

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} x {}", rows, cols);
        let _ = writeln!(out, "  ┌{:inner$} ┐", "", inner = inner);
        for row in &cells {
            out.push_str("  │");
            for cell in row {
                let _ = write!(out, " {:>width$}", cell, width = width);
            }
            if more_cols {
                let _ = write!(out, " {:>width$}", ELLIPSIS_H, width = width);
            }
            out.push_str(" │\n");
        }
        if more_rows {
            out.push_str("  │");
            for _ in 0..grid_cols {
                let _ = write!(out, " {:>width$}", ELLIPSIS_V, width = width);
            }
            out.push_str(" │\n");
        }
        let _ = writeln!(out, "  └{:inner$} ┘", "", inner = inner);
        out
    }
}

impl Display for DoubleMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let config = match f.precision() {
            Some(p) => PrettyConfig::full().with_precision(p),
            None => PrettyConfig::full(),
        };
        f.write_str(&self.pretty_string(&config))
    }
}
