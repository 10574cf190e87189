use bon::Builder;
use std::collections::HashMap;

/// Character n-gram F-score.
///
/// Statistics are pooled over the whole corpus before the score is computed,
/// so a corpus score is not the mean of sentence scores. Precision and recall
/// are averaged over the n-gram orders that occur in both hypothesis and
/// reference, then combined with recall weighted `beta` times as much as
/// precision. Scores are on a 0–100 scale.
#[derive(Clone, Debug, Builder)]
pub struct Chrf {
    #[builder(default = 6)]
    pub char_order: usize,
    #[builder(default = 2.0)]
    pub beta: f64,
    /// Keep whitespace inside character n-grams.
    #[builder(default = false)]
    pub whitespace: bool,
}

impl Default for Chrf {
    fn default() -> Self {
        Chrf::builder().build()
    }
}

/// Hypothesis, reference, and matched n-gram counts for one order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct OrderStats {
    hyp: usize,
    reference: usize,
    matched: usize,
}

impl Chrf {
    pub fn corpus(&self, hypotheses: &[&str], references: &[&str]) -> f64 {
        debug_assert_eq!(hypotheses.len(), references.len());
        let mut totals = vec![OrderStats::default(); self.char_order];
        for (hypothesis, reference) in hypotheses.iter().zip(references) {
            for (total, stats) in totals
                .iter_mut()
                .zip(self.sentence_stats(hypothesis, reference))
            {
                total.hyp += stats.hyp;
                total.reference += stats.reference;
                total.matched += stats.matched;
            }
        }
        self.f_score(&totals)
    }

    pub fn sentence(&self, hypothesis: &str, reference: &str) -> f64 {
        self.f_score(&self.sentence_stats(hypothesis, reference))
    }

    fn sentence_stats(&self, hypothesis: &str, reference: &str) -> Vec<OrderStats> {
        let hypothesis = self.chars(hypothesis);
        let reference = self.chars(reference);

        (1..=self.char_order)
            .map(|order| {
                let hyp_ngrams = ngram_counts(&hypothesis, order);
                let ref_ngrams = ngram_counts(&reference, order);
                let matched = hyp_ngrams
                    .iter()
                    .map(|(ngram, count)| (*count).min(ref_ngrams.get(ngram).copied().unwrap_or(0)))
                    .sum();
                OrderStats {
                    hyp: hyp_ngrams.values().sum(),
                    reference: ref_ngrams.values().sum(),
                    matched,
                }
            })
            .collect()
    }

    fn chars(&self, text: &str) -> Vec<char> {
        if self.whitespace {
            text.chars().collect()
        } else {
            text.chars().filter(|c| !c.is_whitespace()).collect()
        }
    }

    fn f_score(&self, stats: &[OrderStats]) -> f64 {
        let factor = self.beta * self.beta;
        let mut avg_precision = 0.0;
        let mut avg_recall = 0.0;
        let mut effective_order = 0usize;

        for order in stats {
            if order.hyp > 0 && order.reference > 0 {
                avg_precision += order.matched as f64 / order.hyp as f64;
                avg_recall += order.matched as f64 / order.reference as f64;
                effective_order += 1;
            }
        }
        if effective_order == 0 {
            return 0.0;
        }

        avg_precision /= effective_order as f64;
        avg_recall /= effective_order as f64;
        if avg_precision + avg_recall == 0.0 {
            return 0.0;
        }
        100.0 * (1.0 + factor) * avg_precision * avg_recall
            / (factor * avg_precision + avg_recall)
    }
}

fn ngram_counts(chars: &[char], order: usize) -> HashMap<&[char], usize> {
    let mut counts = HashMap::new();
    if chars.len() >= order {
        for window in chars.windows(order) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}
