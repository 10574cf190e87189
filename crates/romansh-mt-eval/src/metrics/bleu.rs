use bon::Builder;
use std::collections::HashMap;

use super::tokenize::tokenize_13a;

/// Corpus BLEU with `13a` tokenization, exponential smoothing and a
/// brevity penalty, on a 0–100 scale.
#[derive(Clone, Debug, Builder)]
pub struct Bleu {
    #[builder(default = 4)]
    pub max_order: usize,
    #[builder(default = false)]
    pub lowercase: bool,
}

impl Default for Bleu {
    fn default() -> Self {
        Bleu::builder().build()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BleuStats {
    hyp_len: usize,
    ref_len: usize,
    correct: Vec<usize>,
    total: Vec<usize>,
}

impl BleuStats {
    fn zeros(max_order: usize) -> Self {
        Self {
            hyp_len: 0,
            ref_len: 0,
            correct: vec![0; max_order],
            total: vec![0; max_order],
        }
    }

    fn add(&mut self, other: &BleuStats) {
        self.hyp_len += other.hyp_len;
        self.ref_len += other.ref_len;
        for (lhs, rhs) in self.correct.iter_mut().zip(&other.correct) {
            *lhs += rhs;
        }
        for (lhs, rhs) in self.total.iter_mut().zip(&other.total) {
            *lhs += rhs;
        }
    }
}

impl Bleu {
    pub fn corpus(&self, hypotheses: &[&str], references: &[&str]) -> f64 {
        debug_assert_eq!(hypotheses.len(), references.len());
        let mut totals = BleuStats::zeros(self.max_order);
        for (hypothesis, reference) in hypotheses.iter().zip(references) {
            totals.add(&self.sentence_stats(hypothesis, reference));
        }
        self.compute(&totals, false)
    }

    /// Sentence-level BLEU; only the n-gram orders the hypothesis reaches
    /// contribute to the geometric mean.
    pub fn sentence(&self, hypothesis: &str, reference: &str) -> f64 {
        self.compute(&self.sentence_stats(hypothesis, reference), true)
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        if self.lowercase {
            tokenize_13a(&text.to_lowercase())
        } else {
            tokenize_13a(text)
        }
    }

    fn sentence_stats(&self, hypothesis: &str, reference: &str) -> BleuStats {
        let hypothesis = self.tokens(hypothesis);
        let reference = self.tokens(reference);
        let mut stats = BleuStats::zeros(self.max_order);
        stats.hyp_len = hypothesis.len();
        stats.ref_len = reference.len();

        for order in 1..=self.max_order {
            let hyp_ngrams = ngram_counts(&hypothesis, order);
            let ref_ngrams = ngram_counts(&reference, order);
            stats.total[order - 1] = hypothesis.len().saturating_sub(order - 1);
            stats.correct[order - 1] = hyp_ngrams
                .iter()
                .map(|(ngram, count)| (*count).min(ref_ngrams.get(ngram).copied().unwrap_or(0)))
                .sum();
        }
        stats
    }

    fn compute(&self, stats: &BleuStats, effective_order: bool) -> f64 {
        let brevity_penalty = if stats.hyp_len < stats.ref_len {
            if stats.hyp_len == 0 {
                0.0
            } else {
                (1.0 - stats.ref_len as f64 / stats.hyp_len as f64).exp()
            }
        } else {
            1.0
        };

        if stats.correct.iter().all(|correct| *correct == 0) {
            return 0.0;
        }

        let mut precisions = vec![0.0; self.max_order];
        let mut smooth = 1.0;
        let mut order_used = self.max_order;
        for n in 0..self.max_order {
            if stats.total[n] == 0 {
                break;
            }
            if effective_order {
                order_used = n + 1;
            }
            precisions[n] = if stats.correct[n] == 0 {
                smooth *= 2.0;
                100.0 / (smooth * stats.total[n] as f64)
            } else {
                100.0 * stats.correct[n] as f64 / stats.total[n] as f64
            };
        }

        let used = &precisions[..order_used];
        if used.iter().any(|precision| *precision <= 0.0) {
            return 0.0;
        }
        let log_mean = used.iter().map(|precision| precision.ln()).sum::<f64>() / order_used as f64;
        brevity_penalty * log_mean.exp()
    }
}

fn ngram_counts(tokens: &[String], order: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= order {
        for window in tokens.windows(order) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}
