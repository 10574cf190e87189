use super::variety::Variety;

/// A submission was rejected before any scoring took place.
///
/// Raised by [`Evaluation::evaluate`](crate::Evaluation::evaluate) ahead of
/// alignment, so a rejected call never produces partial results.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("variety `{0}` not recognized")]
    UnknownVariety(String),

    /// The two direction sequences of one submission differ in length.
    #[error(
        "translation directions differ in length: rm->de has {rm_to_de}, de->rm has {de_to_rm}"
    )]
    DirectionLengthMismatch { rm_to_de: usize, de_to_rm: usize },

    /// The submission cannot be positionally aligned with the reference rows.
    #[error(
        "cannot align {actual} translations with {variety} (expected {expected}, skips_bad_sources = {skips_bad_sources})"
    )]
    AlignmentError {
        variety: Variety,
        expected: usize,
        actual: usize,
        skips_bad_sources: bool,
    },
}

/// Failure from loading references, validating submissions, or scoring.
///
/// Only [`Validation`](EvalError::Validation), [`UnsupportedMetric`](EvalError::UnsupportedMetric)
/// and [`DatasetUnavailable`](EvalError::DatasetUnavailable) are expected in
/// normal operation. [`ScoringBackendUnavailable`](EvalError::ScoringBackendUnavailable)
/// and [`MalformedScore`](EvalError::MalformedScore) are produced at segment level
/// and degrade to a zero corpus score instead of aborting a batch.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("metric `{name}` not recognized; choose from 'bleu', 'chrf', 'xcomet-xl'")]
    UnsupportedMetric { name: String },

    #[error("reference dataset for {variety} is unavailable")]
    DatasetUnavailable {
        variety: Variety,
        #[source]
        source: anyhow::Error,
    },

    #[error("quality-estimation backend is not configured")]
    ScoringBackendUnavailable,

    #[error("quality-estimation backend request failed")]
    Backend {
        #[source]
        source: anyhow::Error,
    },

    #[error("scoring backend returned a non-numeric score: {value}")]
    MalformedScore { value: String },

    #[error("score cache operation failed")]
    Cache {
        #[source]
        source: anyhow::Error,
    },
}

impl EvalError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn dataset_unavailable(variety: Variety, source: impl Into<anyhow::Error>) -> Self {
        Self::DatasetUnavailable {
            variety,
            source: source.into(),
        }
    }

    pub(crate) fn cache<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Cache {
            source: anyhow::Error::new(error),
        }
    }
}
