use anyhow::{Result, bail};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::dataset::DatasetRow;
use crate::core::Domain;

static TOKEN_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").unwrap());

/// Counts tokens as word runs plus single punctuation characters.
pub fn count_tokens(text: &str) -> usize {
    TOKEN_PAT.find_iter(text).count()
}

/// Segment and token counts of one text column, per domain.
///
/// Only non-empty texts count as segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub segments: IndexMap<Domain, usize>,
    pub tokens: IndexMap<Domain, usize>,
}

impl TextStats {
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = (Domain, &'a str)>) -> Self {
        let zeros: IndexMap<Domain, usize> = Domain::ALL.iter().map(|domain| (*domain, 0)).collect();
        let mut stats = Self {
            segments: zeros.clone(),
            tokens: zeros,
        };
        for (domain, text) in texts {
            if text.trim().is_empty() {
                continue;
            }
            *stats.segments.entry(domain).or_default() += 1;
            *stats.tokens.entry(domain).or_default() += count_tokens(text);
        }
        stats
    }

    pub fn total_segments(&self) -> usize {
        self.segments.values().sum()
    }

    pub fn total_tokens(&self) -> usize {
        self.tokens.values().sum()
    }
}

/// Row, document and token counts of one reference set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub bad_sources: usize,
    pub documents: usize,
    pub domain_rows: IndexMap<Domain, usize>,
    /// German side.
    pub source: TextStats,
    /// Romansh side.
    pub target: TextStats,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[DatasetRow]) -> Self {
        let mut domain_rows: IndexMap<Domain, usize> =
            Domain::ALL.iter().map(|domain| (*domain, 0)).collect();
        let mut documents = HashSet::new();
        for row in rows {
            if let Some(domain) = row.domain {
                *domain_rows.entry(domain).or_default() += 1;
            }
            documents.insert(row.document_id.as_str());
        }

        Self {
            rows: rows.len(),
            bad_sources: rows.iter().filter(|row| row.is_bad_source).count(),
            documents: documents.len(),
            domain_rows,
            source: TextStats::from_texts(
                rows.iter().filter_map(|row| Some((row.domain?, row.source.as_str()))),
            ),
            target: TextStats::from_texts(
                rows.iter().filter_map(|row| Some((row.domain?, row.target.as_str()))),
            ),
        }
    }

    pub fn scorable_rows(&self) -> usize {
        self.rows - self.bad_sources
    }
}

/// Published shape of a reference set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedShape {
    pub rows: usize,
    pub bad_sources: usize,
    pub domain_rows: [(Domain, usize); 4],
}

impl ExpectedShape {
    /// Every variety of WMT24++ Romansh.
    pub const WMT24PP_RM: ExpectedShape = ExpectedShape {
        rows: 998,
        bad_sources: 38,
        domain_rows: [
            (Domain::Literary, 206),
            (Domain::News, 149),
            (Domain::Social, 531),
            (Domain::Speech, 111),
        ],
    };

    pub fn verify(&self, summary: &DatasetSummary) -> Result<()> {
        if summary.rows != self.rows {
            bail!("expected {} rows, found {}", self.rows, summary.rows);
        }
        if summary.bad_sources != self.bad_sources {
            bail!(
                "expected {} bad-source rows, found {}",
                self.bad_sources,
                summary.bad_sources
            );
        }
        for (domain, expected) in self.domain_rows {
            let found = summary.domain_rows.get(&domain).copied().unwrap_or_default();
            if found != expected {
                bail!("expected {expected} `{domain}` rows, found {found}");
            }
        }
        Ok(())
    }
}
