//! Prometheus export for the `metrics` facade.
//!
//! The engine emits counters through `metrics::counter!`. This module installs
//! a recorder that backs each counter with a Prometheus `IntCounter` in a
//! shared [`Registry`], rendered in text exposition format at `GET /metrics`.
//!
//! # Counters
//!
//! - `shortlink_codes_created_total`
//! - `shortlink_code_collisions_total`
//! - `shortlink_code_space_exhausted_total`
//! - `shortlink_redirects_total`
//! - `shortlink_expired_removed_total`

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const COUNTERS: &[(&str, &str)] = &[
    ("shortlink_codes_created_total", "Short codes created"),
    (
        "shortlink_code_collisions_total",
        "Code draws rejected because the code was taken",
    ),
    (
        "shortlink_code_space_exhausted_total",
        "Shorten calls that ran out of attempts",
    ),
    ("shortlink_redirects_total", "Successful short code resolutions"),
    (
        "shortlink_expired_removed_total",
        "Expired records removed by cleanup",
    ),
];

/// Read side of the recorder: renders everything recorded so far.
#[derive(Clone, Default)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Encodes every registered metric in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// `metrics::Recorder` storing counters in a Prometheus registry.
///
/// Gauges and histograms are not emitted anywhere in the crate and are
/// discarded.
#[derive(Default)]
pub struct PrometheusRecorder {
    registry: Registry,
    counters: DashMap<Key, IntCounter>,
    descriptions: DashMap<String, String>,
}

impl PrometheusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MetricsHandle {
        MetricsHandle {
            registry: self.registry.clone(),
        }
    }

    fn counter(&self, key: &Key) -> Result<IntCounter, prometheus::Error> {
        if let Some(counter) = self.counters.get(key) {
            return Ok(counter.clone());
        }

        let help = self
            .descriptions
            .get(key.name())
            .map(|d| d.value().clone())
            .unwrap_or_else(|| key.name().to_string());
        let labels: HashMap<String, String> = key
            .labels()
            .map(|l| (l.key().to_string(), l.value().to_string()))
            .collect();

        // Registration happens under the shard lock so a key registers once.
        match self.counters.entry(key.clone()) {
            Entry::Occupied(slot) => Ok(slot.get().clone()),
            Entry::Vacant(slot) => {
                let opts = Opts::new(key.name(), help).const_labels(labels);
                let counter = IntCounter::with_opts(opts)?;
                self.registry.register(Box::new(counter.clone()))?;
                slot.insert(counter.clone());
                Ok(counter)
            }
        }
    }
}

struct PrometheusCounter(IntCounter);

impl CounterFn for PrometheusCounter {
    fn increment(&self, value: u64) {
        self.0.inc_by(value);
    }

    fn absolute(&self, value: u64) {
        let current = self.0.get();
        if value > current {
            self.0.inc_by(value - current);
        }
    }
}

impl Recorder for PrometheusRecorder {
    fn describe_counter(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.descriptions
            .insert(key.as_str().to_string(), description.to_string());
    }

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        match self.counter(key) {
            Ok(counter) => Counter::from_arc(Arc::new(PrometheusCounter(counter))),
            Err(e) => {
                tracing::warn!(metric = key.name(), error = %e, "Failed to register counter");
                Counter::noop()
            }
        }
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

fn describe_counters() {
    for &(name, description) in COUNTERS {
        metrics::describe_counter!(name, description);
    }
}

/// Installs the Prometheus recorder as the process-wide `metrics` recorder.
///
/// # Errors
///
/// Fails if a global recorder is already installed.
pub fn install() -> Result<MetricsHandle> {
    let recorder = PrometheusRecorder::new();
    let handle = recorder.handle();

    metrics::set_global_recorder(recorder)
        .map_err(|_| anyhow::anyhow!("A metrics recorder is already installed"))?;
    describe_counters();

    tracing::info!("Metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_exported() {
        let recorder = PrometheusRecorder::new();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("shortlink_redirects_total").increment(2);
            metrics::counter!("shortlink_redirects_total").increment(1);
        });

        let output = handle.render().unwrap();
        assert!(output.contains("shortlink_redirects_total 3"));
    }

    #[test]
    fn test_description_becomes_help_text() {
        let recorder = PrometheusRecorder::new();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counters();
            metrics::counter!("shortlink_codes_created_total").increment(1);
        });

        let output = handle.render().unwrap();
        assert!(output.contains("# HELP shortlink_codes_created_total Short codes created"));
        assert!(output.contains("# TYPE shortlink_codes_created_total counter"));
    }

    #[test]
    fn test_absolute_never_lowers_counter() {
        let recorder = PrometheusRecorder::new();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let counter = metrics::counter!("shortlink_expired_removed_total");
            counter.absolute(10);
            counter.absolute(4);
        });

        assert!(
            handle
                .render()
                .unwrap()
                .contains("shortlink_expired_removed_total 10")
        );
    }

    #[test]
    fn test_invalid_name_is_dropped() {
        let recorder = PrometheusRecorder::new();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("not a valid name").increment(1);
        });

        assert!(handle.render().unwrap().is_empty());
    }

    #[test]
    fn test_empty_registry_renders_nothing() {
        assert!(MetricsHandle::default().render().unwrap().is_empty());
    }
}
