use async_trait::async_trait;
use bon::Builder;
use kdam::{BarExt, tqdm};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::core::{DEFAULT_QE_MODEL, EvalError};
use crate::utils::{MemoryScoreCache, ScoreCache, ScoreKey, truncate};

/// One segment to be scored by a quality-estimation model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityRequest<'a> {
    pub model_name: &'a str,
    pub source: Option<&'a str>,
    pub hypothesis: &'a str,
    pub reference: Option<&'a str>,
}

/// Inference service that scores a single segment.
///
/// Returns the raw score value; anything other than a JSON number is treated
/// as a malformed result by [`QualityEstimator`].
#[async_trait]
pub trait QualityBackend: Send + Sync {
    async fn predict(&self, request: QualityRequest<'_>) -> Result<Value, EvalError>;
}

/// Scores segments through a hosted inference app.
///
/// Posts `{"data": [src, mt, ref, model_name]}` to
/// `<base_url>/run/run_inference_with_model` and reads the first element of
/// the returned `data` array.
#[derive(Clone, Debug)]
pub struct HttpQualityBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQualityBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/run/run_inference_with_model",
                base_url.trim_end_matches('/')
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn backend_error(error: reqwest::Error) -> EvalError {
    EvalError::Backend {
        source: error.into(),
    }
}

#[async_trait]
impl QualityBackend for HttpQualityBackend {
    #[tracing::instrument(
        name = "rmeval.qe.http",
        level = "trace",
        skip_all,
        fields(hypothesis = truncate(request.hypothesis, 40))
    )]
    async fn predict(&self, request: QualityRequest<'_>) -> Result<Value, EvalError> {
        let body = json!({
            "data": [request.source, request.hypothesis, request.reference, request.model_name],
        });
        let payload: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(backend_error)?
            .error_for_status()
            .map_err(backend_error)?
            .json()
            .await
            .map_err(backend_error)?;

        Ok(payload
            .get("data")
            .and_then(|data| data.get(0))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// Neural quality-estimation metric with a persistent per-segment memo.
///
/// Every `(model, source, hypothesis, reference)` tuple is looked up in the
/// injected [`ScoreCache`] before the backend is asked, and stored after a
/// numeric answer. Segments are scored one at a time in input order. Scores
/// are in `[0, 1]`.
///
/// Degrades instead of failing: an empty hypothesis scores 0 without any
/// lookup, a missing backend scores 0, and a corpus containing a non-numeric
/// segment result scores 0 with a warning.
#[derive(Clone, Builder)]
pub struct QualityEstimator {
    #[builder(default = DEFAULT_QE_MODEL.to_string(), into)]
    model_name: String,
    backend: Option<Arc<dyn QualityBackend>>,
    #[builder(default = Arc::new(MemoryScoreCache::default()) as Arc<dyn ScoreCache>)]
    cache: Arc<dyn ScoreCache>,
    #[builder(default = false)]
    show_progress: bool,
}

impl QualityEstimator {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Scores one segment; `Ok(None)` means the backend answered with a
    /// non-numeric value.
    pub async fn try_segment_score(
        &self,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<Option<f64>, EvalError> {
        Ok(self.score_one(source, hypothesis, reference).await?.ok())
    }

    pub async fn segment(
        &self,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<f64, EvalError> {
        self.score_one(source, hypothesis, reference)
            .await?
            .map_err(|value| EvalError::MalformedScore {
                value: value.to_string(),
            })
    }

    /// Inner `Err` carries a non-numeric backend answer.
    async fn score_one(
        &self,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<Result<f64, Value>, EvalError> {
        if hypothesis.trim().is_empty() {
            return Ok(Ok(0.0));
        }

        let key = ScoreKey::new(&self.model_name, source, hypothesis, reference);
        if let Some(score) = self.cache.get(&key).await? {
            trace!(score, "segment score served from cache");
            return Ok(Ok(score));
        }

        let Some(backend) = &self.backend else {
            trace!(reason = %EvalError::ScoringBackendUnavailable, "scoring segment as 0");
            return Ok(Ok(0.0));
        };

        let value = backend
            .predict(QualityRequest {
                model_name: &self.model_name,
                source,
                hypothesis,
                reference,
            })
            .await?;

        match value.as_f64() {
            Some(score) => {
                self.cache.insert(key, score).await?;
                Ok(Ok(score))
            }
            None => {
                warn!(value = %value, "backend returned a non-numeric segment score");
                Ok(Err(value))
            }
        }
    }

    /// Mean segment score. Segments are scored against their references only.
    #[tracing::instrument(
        name = "rmeval.qe.corpus",
        level = "debug",
        skip_all,
        fields(segments = hypotheses.len(), model = %self.model_name)
    )]
    pub async fn corpus(&self, hypotheses: &[&str], references: &[&str]) -> Result<f64, EvalError> {
        if !self.has_backend() {
            debug!(reason = %EvalError::ScoringBackendUnavailable, "uncached segments score 0");
        }

        let mut progress = self
            .show_progress
            .then(|| tqdm!(total = hypotheses.len(), desc = "Scoring segments"));

        let mut scores = Vec::with_capacity(hypotheses.len());
        for (hypothesis, reference) in hypotheses.iter().zip(references) {
            scores.push(
                self.try_segment_score(None, hypothesis, Some(*reference))
                    .await?,
            );
            if let Some(bar) = progress.as_mut() {
                let _ = bar.update(1);
            }
        }

        if scores.is_empty() {
            debug!("no segments to score");
            return Ok(0.0);
        }
        let Some(scores) = scores.into_iter().collect::<Option<Vec<f64>>>() else {
            warn!("cannot average segment scores with non-numeric entries, using 0");
            return Ok(0.0);
        };
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Closes the underlying cache. Call once at shutdown.
    pub async fn close(&self) -> Result<(), EvalError> {
        self.cache.close().await
    }
}
