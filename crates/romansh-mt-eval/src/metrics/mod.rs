//! Scoring backends behind one corpus/segment contract.
//!
//! Two families:
//! - **Overlap metrics** ([`Chrf`], [`Bleu`]) are stateless and deterministic,
//!   work on postprocessed strings, and support both directions.
//! - **Quality estimation** ([`QualityEstimator`]) asks a neural model through
//!   a [`QualityBackend`] and memoizes every segment in a [`ScoreCache`](crate::ScoreCache).
//!   It is only offered for Romansh→German.
//!
//! [`MetricKind`] selects a variant; [`Metric`] dispatches to it.

pub mod bleu;
pub mod chrf;
pub mod quality;
pub mod tokenize;

pub use bleu::*;
pub use chrf::*;
pub use quality::*;
pub use tokenize::*;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::core::{EvalError, LangPair};

/// Metric selector, parsed from `chrf`, `bleu` or `xcomet-xl`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum MetricKind {
    #[serde(rename = "chrf")]
    #[strum(serialize = "chrf")]
    Chrf,
    #[serde(rename = "bleu")]
    #[strum(serialize = "bleu")]
    Bleu,
    #[serde(rename = "xcomet-xl")]
    #[strum(serialize = "xcomet-xl")]
    XCometXl,
}

impl MetricKind {
    pub fn parse(name: &str) -> Result<Self, EvalError> {
        name.parse::<MetricKind>()
            .map_err(|_| EvalError::UnsupportedMetric {
                name: name.to_string(),
            })
    }

    pub fn is_quality_estimation(self) -> bool {
        matches!(self, MetricKind::XCometXl)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MetricKind::Chrf => "ChrF",
            MetricKind::Bleu => "BLEU",
            MetricKind::XCometXl => "xCOMET",
        }
    }
}

/// Uniform scoring contract shared by every metric variant.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait CorpusMetric {
    fn kind(&self) -> MetricKind;

    /// Whether the metric is offered for `lang_pair` at all.
    fn supports(&self, _lang_pair: LangPair) -> bool {
        true
    }

    /// Factor bringing corpus scores onto the 0–100 reporting scale.
    fn scale(&self) -> f64 {
        1.0
    }

    async fn corpus_score(&self, hypotheses: &[&str], references: &[&str])
    -> Result<f64, EvalError>;

    async fn segment_score(
        &self,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<f64, EvalError>;
}

impl CorpusMetric for Chrf {
    fn kind(&self) -> MetricKind {
        MetricKind::Chrf
    }

    async fn corpus_score(
        &self,
        hypotheses: &[&str],
        references: &[&str],
    ) -> Result<f64, EvalError> {
        Ok(self.corpus(hypotheses, references))
    }

    async fn segment_score(
        &self,
        _source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<f64, EvalError> {
        Ok(self.sentence(hypothesis, reference.unwrap_or_default()))
    }
}

impl CorpusMetric for Bleu {
    fn kind(&self) -> MetricKind {
        MetricKind::Bleu
    }

    async fn corpus_score(
        &self,
        hypotheses: &[&str],
        references: &[&str],
    ) -> Result<f64, EvalError> {
        Ok(self.corpus(hypotheses, references))
    }

    async fn segment_score(
        &self,
        _source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<f64, EvalError> {
        Ok(self.sentence(hypothesis, reference.unwrap_or_default()))
    }
}

impl CorpusMetric for QualityEstimator {
    fn kind(&self) -> MetricKind {
        MetricKind::XCometXl
    }

    fn supports(&self, lang_pair: LangPair) -> bool {
        lang_pair == LangPair::RmToDe
    }

    fn scale(&self) -> f64 {
        100.0
    }

    async fn corpus_score(
        &self,
        hypotheses: &[&str],
        references: &[&str],
    ) -> Result<f64, EvalError> {
        self.corpus(hypotheses, references).await
    }

    async fn segment_score(
        &self,
        source: Option<&str>,
        hypothesis: &str,
        reference: Option<&str>,
    ) -> Result<f64, EvalError> {
        self.segment(source, hypothesis, reference).await
    }
}

#[enum_dispatch(CorpusMetric)]
#[derive(Clone)]
pub enum Metric {
    Chrf(Chrf),
    Bleu(Bleu),
    QualityEstimator(QualityEstimator),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_parse() {
        assert_eq!(MetricKind::parse("chrf").unwrap(), MetricKind::Chrf);
        assert_eq!(MetricKind::parse("bleu").unwrap(), MetricKind::Bleu);
        assert_eq!(MetricKind::parse("xcomet-xl").unwrap(), MetricKind::XCometXl);
        assert_eq!(MetricKind::XCometXl.to_string(), "xcomet-xl");
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = MetricKind::parse("meteor").unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedMetric { name } if name == "meteor"));
    }

    #[test]
    fn quality_estimation_only_supports_romansh_to_german() {
        let metric = Metric::from(QualityEstimator::builder().build());
        assert!(metric.supports(LangPair::RmToDe));
        assert!(!metric.supports(LangPair::DeToRm));
        assert_eq!(metric.scale(), 100.0);

        let chrf = Metric::from(Chrf::default());
        assert!(chrf.supports(LangPair::DeToRm));
        assert_eq!(chrf.kind(), MetricKind::Chrf);
    }
}
