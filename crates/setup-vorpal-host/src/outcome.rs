//! Results for best-effort setup steps.
//!
//! Optional steps never fail the run. Each one reports a [`StepOutcome`] and
//! the caller collects them in a [`SetupReport`], so "degraded" is a value
//! that can be inspected rather than a swallowed error.

use log::{info, warn};
use std::fmt;

/// Result of a single best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did its work.
    Completed,
    /// The step had nothing to do on this host.
    Skipped(String),
    /// The step failed; the run continues without it.
    Degraded(String),
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    pub fn degraded(reason: impl fmt::Display) -> Self {
        Self::Degraded(reason.to_string())
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Ordered record of best-effort step outcomes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetupReport {
    steps: Vec<(&'static str, StepOutcome)>,
}

impl SetupReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome and log it at the matching level.
    pub fn record(&mut self, step: &'static str, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Completed => info!("{step}: completed"),
            StepOutcome::Skipped(reason) => info!("{step}: skipped ({reason})"),
            StepOutcome::Degraded(reason) => warn!("{step}: degraded ({reason})"),
        }
        self.steps.push((step, outcome));
    }

    pub fn steps(&self) -> &[(&'static str, StepOutcome)] {
        &self.steps
    }

    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(name, _)| *name == step)
            .map(|(_, outcome)| outcome)
    }

    pub fn degraded_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| outcome.is_degraded())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_keeps_order_and_counts_degraded() {
        let mut report = SetupReport::new();
        report.record("package", StepOutcome::skipped("no apt"));
        report.record("policy", StepOutcome::degraded("permission denied"));
        report.record("other", StepOutcome::Completed);

        assert_eq!(report.steps().len(), 3);
        assert_eq!(report.steps()[0].0, "package");
        assert_eq!(report.degraded_count(), 1);
        assert_eq!(
            report.outcome("policy"),
            Some(&StepOutcome::Degraded("permission denied".to_string()))
        );
        assert_eq!(report.outcome("missing"), None);
    }
}
