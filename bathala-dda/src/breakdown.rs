//! Itemized, human-auditable record of one score update.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of an [`AdjustmentBreakdown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub justification: String,
    pub magnitude: f64,
    #[serde(default)]
    pub is_calibration: bool,
    #[serde(default)]
    pub is_total: bool,
}

impl BreakdownLine {
    #[must_use]
    pub fn factor(label: impl Into<String>, justification: impl Into<String>, magnitude: f64) -> Self {
        Self {
            label: label.into(),
            justification: justification.into(),
            magnitude,
            is_calibration: false,
            is_total: false,
        }
    }

    #[must_use]
    pub fn calibration(label: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            justification: justification.into(),
            magnitude: 0.0,
            is_calibration: true,
            is_total: false,
        }
    }

    #[must_use]
    pub fn total(previous: f64, new: f64, adjustment: f64) -> Self {
        Self {
            label: String::from("Total Adjustment"),
            justification: format!("{previous:.2} → {new:.2}"),
            magnitude: adjustment,
            is_calibration: false,
            is_total: true,
        }
    }

    /// Signed magnitude formatted to three decimals, e.g. `+0.350`.
    #[must_use]
    pub fn signed_value(&self) -> String {
        if self.is_calibration {
            String::new()
        } else {
            format!("{:+.3}", self.magnitude)
        }
    }
}

/// Ordered contributions behind a score change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdjustmentBreakdown {
    pub lines: Vec<BreakdownLine>,
}

impl AdjustmentBreakdown {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, line: BreakdownLine) {
        self.lines.push(line);
    }

    /// Factor rows, excluding notices and the total.
    pub fn factors(&self) -> impl Iterator<Item = &BreakdownLine> {
        self.lines
            .iter()
            .filter(|line| !line.is_calibration && !line.is_total)
    }

    #[must_use]
    pub fn total(&self) -> Option<&BreakdownLine> {
        self.lines.iter().rev().find(|line| line.is_total)
    }

    #[must_use]
    pub fn find(&self, label: &str) -> Option<&BreakdownLine> {
        self.lines.iter().find(|line| line.label == label)
    }

    #[must_use]
    pub fn has_calibration_notice(&self) -> bool {
        self.lines.iter().any(|line| line.is_calibration)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for AdjustmentBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .lines
            .iter()
            .map(|line| line.label.chars().count())
            .max()
            .unwrap_or(0);
        for line in &self.lines {
            writeln!(
                f,
                "{:<width$}  {:>7}  {}",
                line.label,
                line.signed_value(),
                line.justification
            )?;
        }
        Ok(())
    }
}
