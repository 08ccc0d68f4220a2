//! Metrics definitions for filter upserts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::counter!($def.name $(, $label => $value)*)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::histogram!($def.name $(, $label => $value)*)
    };
}

pub const UPSERT_DURATION: MetricDef = MetricDef {
    name: "filter.upsert.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete a filter upsert in seconds, lock wait included. Tagged with action.",
};

pub const LOCK_WAIT_DURATION: MetricDef = MetricDef {
    name: "filter.upsert.lock_wait",
    metric_type: MetricType::Histogram,
    description: "Time spent waiting for the upsert lock in seconds",
};

pub const UPSERT_FAILED: MetricDef = MetricDef {
    name: "filter.upsert.failed",
    metric_type: MetricType::Counter,
    description: "Number of upserts that did not write the dashboard. Tagged with reason.",
};

pub const DRIFT_SUPPRESSED: MetricDef = MetricDef {
    name: "filter.read.drift_suppressed",
    metric_type: MetricType::Counter,
    description: "Number of reads where an equivalent config kept the caller's text",
};

pub const ALL_METRICS: &[MetricDef] = &[
    UPSERT_DURATION,
    LOCK_WAIT_DURATION,
    UPSERT_FAILED,
    DRIFT_SUPPRESSED,
];

/// Registers descriptions for every metric with the installed recorder.
pub fn describe_all() {
    for def in ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }
}
