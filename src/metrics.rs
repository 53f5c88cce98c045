use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::dispute::RiskLevel;
use crate::language::Language;

pub const FEEDBACK_PROCESSED: &str = "nlp_feedback_processed_total";
pub const DISPUTES_ANALYZED: &str = "nlp_disputes_analyzed_total";
pub const CLASSIFIER_FALLBACK: &str = "nlp_classifier_fallback_total";
pub const BATCH_ITEMS: &str = "nlp_batch_items_total";
pub const REQUEST_DURATION: &str = "nlp_request_duration_ms";

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Returns `None` when a recorder
    /// is already installed (e.g. several routers built in one test binary);
    /// the `record_*` helpers keep working either way.
    pub fn try_init() -> Option<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new().install_recorder().ok()?;

        describe_counter!(FEEDBACK_PROCESSED, "Feedback texts processed, by language");
        describe_counter!(DISPUTES_ANALYZED, "Disputes analyzed, by risk level");
        describe_counter!(
            CLASSIFIER_FALLBACK,
            "Sentences scored rule-based after a classifier failure, by reason"
        );
        describe_counter!(BATCH_ITEMS, "Batch items processed, by outcome");
        describe_histogram!(REQUEST_DURATION, "Request handling time in milliseconds");

        Some(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

pub fn record_feedback(lang: Language) {
    counter!(FEEDBACK_PROCESSED, "language" => lang.code()).increment(1);
}

pub fn record_dispute(level: RiskLevel) {
    counter!(DISPUTES_ANALYZED, "risk_level" => level.as_str()).increment(1);
}

pub fn record_classifier_fallback(reason: &'static str) {
    counter!(CLASSIFIER_FALLBACK, "reason" => reason).increment(1);
}

pub fn record_batch_item(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(BATCH_ITEMS, "outcome" => outcome).increment(1);
}

pub fn record_duration(route: &'static str, millis: f64) {
    histogram!(REQUEST_DURATION, "route" => route).record(millis);
}
