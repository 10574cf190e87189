use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Domain, LangPair, Variety};
use crate::metrics::MetricKind;

/// Scores of one system, variety, metric and direction.
///
/// `None` marks a score the metric does not offer for this direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub lang_pair: LangPair,
    pub sys_name: String,
    pub variety: Variety,
    pub metric: MetricKind,
    pub domain_results: IndexMap<Domain, Option<f64>>,
    /// Computed once over all scorable rows pooled together, not from
    /// `domain_results`.
    pub micro_avg: Option<f64>,
}

impl ScoreResult {
    pub fn domain(&self, domain: Domain) -> Option<f64> {
        self.domain_results.get(&domain).copied().flatten()
    }

    /// Unweighted mean of the available per-domain scores.
    ///
    /// `None` when no domain has a score (e.g. a metric that does not support
    /// this direction), rather than a NaN from dividing by zero.
    pub fn macro_avg(&self) -> Option<f64> {
        let scores = Domain::ALL
            .iter()
            .filter_map(|domain| self.domain(*domain))
            .collect::<Vec<_>>();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Both directions of one system/variety/metric evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemResult {
    pub sys_name: String,
    pub variety: Variety,
    pub metric: MetricKind,
    /// Variety whose German→Romansh output stands in for this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub de_to_rm_origin: Option<Variety>,
    pub scores_rm_to_de: ScoreResult,
    pub scores_de_to_rm: ScoreResult,
}

impl SystemResult {
    pub fn scores(&self, lang_pair: LangPair) -> &ScoreResult {
        match lang_pair {
            LangPair::RmToDe => &self.scores_rm_to_de,
            LangPair::DeToRm => &self.scores_de_to_rm,
        }
    }

    pub fn is_de_to_rm_stand_in(&self) -> bool {
        self.de_to_rm_origin
            .is_some_and(|origin| origin != self.variety)
    }
}

/// `system name -> variety -> result`, in catalog order.
pub type SystemResults = IndexMap<String, IndexMap<Variety, SystemResult>>;
