use crate::optimizer::RunRecord;
use serde::Serialize;

/// Mean, extremes and population standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std: var.sqrt(),
        }
    }
}

/// Cross-seed aggregates of every per-run metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub runs: usize,
    pub solution_size: Summary,
    pub reduction: Summary,
    pub reduction_pct: Summary,
    pub tssr: Summary,
    pub fdcloss: Summary,
    pub coverage_pct: Summary,
    pub iterations: Summary,
    pub improvements: Summary,
    pub elapsed_secs: Summary,
}

impl Statistics {
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let collect = |f: fn(&RunRecord) -> f64| -> Summary {
            let values: Vec<f64> = runs.iter().map(f).collect();
            Summary::of(&values)
        };

        Self {
            runs: runs.len(),
            solution_size: collect(|r| r.metrics.solution_size as f64),
            reduction: collect(|r| r.metrics.reduction as f64),
            reduction_pct: collect(|r| r.metrics.reduction_pct),
            tssr: collect(|r| r.metrics.tssr),
            fdcloss: collect(|r| r.metrics.fdcloss),
            coverage_pct: collect(|r| r.metrics.coverage_pct),
            iterations: collect(|r| r.metrics.iterations as f64),
            improvements: collect(|r| r.metrics.improvements as f64),
            elapsed_secs: collect(|r| r.elapsed_secs),
        }
    }

    /// Rows for tabular output, in display order.
    pub fn rows(&self) -> Vec<(&'static str, &Summary)> {
        vec![
            ("Solution size", &self.solution_size),
            ("Tests removed", &self.reduction),
            ("Reduction %", &self.reduction_pct),
            ("TSSR", &self.tssr),
            ("FDCLOSS", &self.fdcloss),
            ("Coverage %", &self.coverage_pct),
            ("Iterations", &self.iterations),
            ("Improvements", &self.improvements),
            ("Time (s)", &self.elapsed_secs),
        ]
    }
}
