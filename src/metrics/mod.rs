use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Running counters for resolution passes.
#[derive(Debug, Default, Clone)]
pub struct ResolverMetrics {
    passes: u64,
    successes: u64,
    failures: u64,
    elements: u64,
    rules: u64,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful pass over `elements` elements carrying `rules` rules.
    pub fn record_pass(&mut self, elements: usize, rules: usize) {
        self.passes = self.passes.saturating_add(1);
        self.successes = self.successes.saturating_add(1);
        self.elements = self.elements.saturating_add(elements as u64);
        self.rules = self.rules.saturating_add(rules as u64);
    }

    pub fn record_failure(&mut self) {
        self.passes = self.passes.saturating_add(1);
        self.failures = self.failures.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            passes: self.passes,
            successes: self.successes,
            failures: self.failures,
            elements: self.elements,
            rules: self.rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub passes: u64,
    pub successes: u64,
    pub failures: u64,
    pub elements: u64,
    pub rules: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "resolver_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("successes".to_string(), json!(self.successes));
        map.insert("failures".to_string(), json!(self.failures));
        map.insert("elements".to_string(), json!(self.elements));
        map.insert("rules".to_string(), json!(self.rules));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_accumulates_passes_and_failures() {
        let mut metrics = ResolverMetrics::new();
        metrics.record_pass(4, 6);
        metrics.record_pass(2, 1);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.passes, 3);
        assert_eq!(snapshot.successes, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.elements, 6);
        assert_eq!(snapshot.rules, 7);
    }

    #[test]
    fn snapshot_event_carries_fields() {
        let mut metrics = ResolverMetrics::new();
        metrics.record_pass(1, 0);
        let event = metrics.snapshot().to_log_event("relative_layout::metrics");
        assert_eq!(event.message, "resolver_metrics");
        assert_eq!(event.fields["passes"], json!(1));
    }
}
