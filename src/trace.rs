//! Extraction of the training trace (elapsed time, perplexity, log-likelihood)
//! from a Gibbs trainer log.
//!
//! Expected line shapes, anywhere on the line after any timestamp prefix:
//!
//! ```text
//! Iteration 3 took 2.50 sec
//! Perplexity: 1043.21
//! loglikelihood: doc,model,total = -1.2e+06, -3.4e+06, -4.6e+06
//! ```
//!
//! An iteration line must carry its duration in the second-to-last token. Perplexity
//! and log-likelihood lines carry their value in the last token. Lines are decoded
//! lossily, so bytes that are not UTF-8 never stop a scan.

use std::io::{BufRead, Write};

use ndarray::Array2;

use crate::error::{Error, Result};

pub const ITERATION: &str = "Iteration";
pub const PERPLEXITY: &str = "Perplexity";
pub const LOGLIKELIHOOD: &str = "loglikelihood";

pub const HEADER: [&str; 3] = ["Time", "Perplexity", "Loglikelihood"];

/// What to do with a marker line whose value cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop at the first malformed line.
    #[default]
    Abort,
    /// Log a warning and ignore the marker on that line.
    Skip,
}

/// One output row, emitted for every log-likelihood line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub elapsed_time: f64,
    pub perplexity: f64,
    pub loglikelihood: f64,
}

/// Scans a log line by line, carrying the elapsed time and the last perplexity.
#[derive(Debug, Default)]
pub struct Extractor {
    policy: MalformedPolicy,
    elapsed_time: f64,
    perplexity: f64,
    line_no: usize,
}

// `nth_from_end` is 0 for the last token, 1 for the second-to-last and so on.
fn value_token(line: &str, nth_from_end: usize) -> Option<&str> {
    line.split_whitespace().rev().nth(nth_from_end)
}

impl Extractor {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn perplexity(&self) -> f64 {
        self.perplexity
    }

    fn parse_value(&self, line: &str, marker: &'static str, nth_from_end: usize) -> Result<f64> {
        let malformed = |reason: String| Error::MalformedLine {
            line_no: self.line_no,
            marker,
            line: line.trim_end().to_string(),
            reason,
        };
        let token = value_token(line, nth_from_end)
            .ok_or_else(|| malformed("too few tokens".to_string()))?;
        token
            .parse::<f64>()
            .map_err(|e| malformed(format!("non-numeric value `{}` ({})", token, e)))
    }

    // Under `MalformedPolicy::Skip` a bad value turns into `None`.
    fn value(&self, line: &str, marker: &'static str, nth_from_end: usize) -> Result<Option<f64>> {
        match self.parse_value(line, marker, nth_from_end) {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.policy == MalformedPolicy::Skip => {
                tracing::warn!(line_no = self.line_no, marker, "skipping malformed line: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Apply the three markers to `line`, in order, and return a row if the line
    /// carries a log-likelihood.
    pub fn feed(&mut self, line: &str) -> Result<Option<TraceRow>> {
        self.line_no += 1;

        if line.contains(ITERATION) {
            if let Some(iter_time) = self.value(line, ITERATION, 1)? {
                self.elapsed_time += iter_time;
            }
        }
        if line.contains(PERPLEXITY) {
            if let Some(perplexity) = self.value(line, PERPLEXITY, 0)? {
                self.perplexity = perplexity;
            }
        }
        if line.contains(LOGLIKELIHOOD) {
            if let Some(loglikelihood) = self.value(line, LOGLIKELIHOOD, 0)? {
                return Ok(Some(TraceRow {
                    elapsed_time: self.elapsed_time,
                    perplexity: self.perplexity,
                    loglikelihood,
                }));
            }
        }
        Ok(None)
    }

    /// Print the header, then stream one row per log-likelihood line of `reader`
    /// into `out`. Rows already written stay written if a malformed line aborts the scan.
    pub fn run<R, W>(&mut self, mut reader: R, mut out: W) -> Result<Trace>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(out, "{}", format_header())?;

        let mut rows = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(row) = self.feed(&line)? {
                writeln!(out, "{}", format_row(&row))?;
                rows.push(row);
            }
        }
        out.flush()?;

        tracing::debug!(lines = self.line_no, rows = rows.len(), "scanned log");
        Ok(Trace { rows })
    }
}

/// Every row extracted from one log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    rows: Vec<TraceRow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSummary {
    pub rows: usize,
    pub total_time: f64,
    pub final_perplexity: f64,
    pub best_loglikelihood: f64,
    /// Index of the row holding `best_loglikelihood`.
    pub best_row: usize,
}

impl Trace {
    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as a matrix whose shape is (n_rows, 3); columns are time, perplexity and
    /// log-likelihood.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), 3), |(i, j)| {
            let row = &self.rows[i];
            match j {
                0 => row.elapsed_time,
                1 => row.perplexity,
                _ => row.loglikelihood,
            }
        })
    }

    /// `None` for an empty trace.
    pub fn summary(&self) -> Option<TraceSummary> {
        let array = self.to_array();
        let n_rows = array.nrows();
        if n_rows == 0 {
            return None;
        }

        let loglikelihood = array.column(2);
        // argmax of `loglikelihood`
        let (best_row, best_loglikelihood) = loglikelihood.indexed_iter().fold(
            (0, loglikelihood[0]),
            |(max_index, max_elem), (index, &elem)| {
                if elem > max_elem {
                    (index, elem)
                } else {
                    (max_index, max_elem)
                }
            },
        );

        Some(TraceSummary {
            rows: n_rows,
            total_time: array[[n_rows - 1, 0]],
            final_perplexity: array[[n_rows - 1, 1]],
            best_loglikelihood,
            best_row,
        })
    }
}

pub fn format_header() -> String {
    HEADER.join("\t")
}

/// Columns are formatted like printf's `%5.2f`, `%10.2f` and `%e`.
pub fn format_row(row: &TraceRow) -> String {
    format!(
        "{}\t{}\t{}",
        format_fixed(row.elapsed_time, 5),
        format_fixed(row.perplexity, 10),
        format_sci(row.loglikelihood)
    )
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("nan")
    } else if value.is_infinite() {
        Some(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        None
    }
}

/// printf's `%<width>.2f`.
pub fn format_fixed(value: f64, width: usize) -> String {
    match non_finite(value) {
        Some(s) => format!("{:>width$}", s, width = width),
        None => format!("{:>width$.2}", value, width = width),
    }
}

/// printf's `%e`: six fractional digits and a signed exponent of at least two digits.
pub fn format_sci(value: f64) -> String {
    if let Some(s) = non_finite(value) {
        return s.to_string();
    }

    // Rust renders `-500.0` as `-5.000000e2`.
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}
