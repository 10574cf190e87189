use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::core::Variety;
use crate::data::ReferenceCorpus;
use crate::metrics::Chrf;

/// Shade of the diagonal and of the best off-diagonal cell.
const MAX_SHADE: f64 = 75.0;

/// How close the reference translations of the varieties are to each other.
///
/// Each variety's reference targets are scored with chrF against every other
/// variety's targets, bad-source rows removed. The diagonal is not computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossVarietyMatrix {
    /// `(hypothesis variety, reference variety) -> chrF`, off-diagonal only.
    pub scores: IndexMap<(Variety, Variety), f64>,
}

impl CrossVarietyMatrix {
    /// Scores every ordered pair of varieties present in `corpus`.
    #[tracing::instrument(name = "rmeval.report.cross_variety", level = "debug", skip_all)]
    pub fn compute(corpus: &ReferenceCorpus) -> Self {
        let chrf = Chrf::default();
        let targets = corpus
            .iter()
            .map(|(variety, dataset)| {
                let texts = dataset
                    .scorable_rows()
                    .map(|row| row.target.as_str())
                    .collect::<Vec<_>>();
                (*variety, texts)
            })
            .collect::<IndexMap<_, _>>();

        let mut scores = IndexMap::new();
        for (sys_variety, hypotheses) in &targets {
            for (ref_variety, references) in &targets {
                if sys_variety == ref_variety {
                    continue;
                }
                let score = chrf.corpus(hypotheses, references);
                debug!(%sys_variety, %ref_variety, score, "cross-variety chrF");
                scores.insert((*sys_variety, *ref_variety), score);
            }
        }
        Self { scores }
    }

    pub fn get(&self, sys_variety: Variety, ref_variety: Variety) -> Option<f64> {
        self.scores.get(&(sys_variety, ref_variety)).copied()
    }

    /// Lowest off-diagonal score.
    pub fn min_score(&self) -> Option<f64> {
        self.scores.values().copied().reduce(f64::min)
    }

    /// Cell shade between 0 and 75, min-max normalised against a perfect 100.
    pub fn shade(&self, score: f64) -> f64 {
        let Some(min) = self.min_score() else {
            return 0.0;
        };
        if min >= 100.0 {
            return 0.0;
        }
        let percent = ((score - min) / (100.0 - min) * 100.0).trunc();
        percent * MAX_SHADE / 100.0
    }

    /// LaTeX cell: colour plus score, or colour alone on the diagonal.
    pub fn cell(&self, sys_variety: Variety, ref_variety: Variety) -> String {
        if sys_variety == ref_variety {
            return format!(r"\cellcolor{{uzhapple!{MAX_SHADE}}}");
        }
        match self.get(sys_variety, ref_variety) {
            Some(score) => format!(r"\cellcolor{{uzhapple!{:?}}}{score:.1}", self.shade(score)),
            None => super::MISSING.to_string(),
        }
    }
}
