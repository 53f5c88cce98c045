//! Batch processing: every item runs in its own task and fails on its own.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::metrics;
use crate::pipeline::{DisputeRequest, Engine, FeedbackRequest};
use crate::report::{DisputeAnalysis, FeedbackAnalysis};

pub const MAX_BATCH_ITEMS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult<T> {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> BatchItemResult<T> {
    fn ok(index: usize, data: T) -> Self {
        Self {
            index,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(index: usize, error: String) -> Self {
        Self {
            index,
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport<T> {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItemResult<T>>,
}

impl<T> BatchReport<T> {
    fn new(items: Vec<BatchItemResult<T>>) -> Self {
        let succeeded = items.iter().filter(|i| i.success).count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            items,
        }
    }
}

/// Payload-level check; the only way a whole batch fails.
pub fn validate_batch_len(len: usize) -> EngineResult<()> {
    if len > MAX_BATCH_ITEMS {
        return Err(EngineError::invalid(
            "items",
            format!("at most {MAX_BATCH_ITEMS} items per batch, got {len}"),
        ));
    }
    Ok(())
}

/// Spawns all jobs up front, then collects results in input order. A
/// panicking item becomes an item-level error.
async fn run_each<Req, Res, Fut, F>(items: Vec<Req>, job: F) -> BatchReport<Res>
where
    F: Fn(Req) -> Fut,
    Fut: Future<Output = EngineResult<Res>> + Send + 'static,
    Res: Send + 'static,
{
    let handles: Vec<_> = items.into_iter().map(|it| tokio::spawn(job(it))).collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let item = match handle.await {
            Ok(Ok(data)) => BatchItemResult::ok(index, data),
            Ok(Err(e)) => BatchItemResult::err(index, e.to_string()),
            Err(join) => BatchItemResult::err(index, format!("item task failed: {join}")),
        };
        if let Some(error) = &item.error {
            warn!(target: "pipeline", index, %error, "batch item failed");
        }
        metrics::record_batch_item(item.success);
        results.push(item);
    }

    BatchReport::new(results)
}

pub async fn process_feedback_batch(
    engine: Arc<Engine>,
    items: Vec<FeedbackRequest>,
) -> BatchReport<FeedbackAnalysis> {
    run_each(items, move |req| {
        let engine = Arc::clone(&engine);
        async move { engine.process_feedback(&req).await }
    })
    .await
}

pub async fn analyze_dispute_batch(
    engine: Arc<Engine>,
    items: Vec<DisputeRequest>,
) -> BatchReport<DisputeAnalysis> {
    run_each(items, move |req| {
        let engine = Arc::clone(&engine);
        async move { engine.analyze_dispute(&req).await }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_len_limit() {
        assert!(validate_batch_len(0).is_ok());
        assert!(validate_batch_len(MAX_BATCH_ITEMS).is_ok());
        assert!(validate_batch_len(MAX_BATCH_ITEMS + 1).is_err());
    }

    #[tokio::test]
    async fn invalid_item_does_not_abort_batch() {
        let engine = Arc::new(Engine::rule_based());
        let items = vec![
            DisputeRequest {
                commission_id: "C-1".into(),
                reason: "The calculation is wrong".into(),
                ..Default::default()
            },
            DisputeRequest::default(),
            DisputeRequest {
                commission_id: "C-3".into(),
                reason: "unfair".into(),
                ..Default::default()
            },
        ];
        let report = analyze_dispute_batch(engine, items).await;
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.items[1].success);
        assert!(report.items[1].error.as_deref().unwrap().contains("commission_id"));
        assert_eq!(report.items[2].index, 2);
    }
}
