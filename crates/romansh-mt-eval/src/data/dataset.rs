use anyhow::{Context, anyhow};
use hf_hub::{Repo, RepoType, api::tokio::Api};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::stats::{DatasetSummary, ExpectedShape};
use crate::core::{Domain, EvalError, Variety, postprocess};

pub const DEFAULT_DATASET_REPO: &str = "ZurichNLP/wmt24pp-rm";

/// One segment of the parallel German–Romansh test set.
///
/// `source` holds the German text and `target` the Romansh reference of the
/// dataset's variety. Rows outside the four domains (the canary row) have no
/// `domain`; they count towards the pooled score only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub lp: String,
    #[serde(default, deserialize_with = "lenient_domain")]
    pub domain: Option<Domain>,
    pub document_id: String,
    pub segment_id: i64,
    #[serde(default)]
    pub is_bad_source: bool,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn lenient_domain<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Domain>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|domain| domain.parse().ok()))
}

/// Where reference rows are read from. Both sources use one
/// `de_DE-<variety>.jsonl` file per variety.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    Hub { repo: String, revision: String },
    Local(PathBuf),
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Hub {
            repo: DEFAULT_DATASET_REPO.to_string(),
            revision: "main".to_string(),
        }
    }
}

impl DatasetSource {
    pub fn file_name(variety: Variety) -> String {
        format!("{}.jsonl", variety.dataset_config())
    }

    async fn resolve(&self, variety: Variety) -> anyhow::Result<PathBuf> {
        let file_name = Self::file_name(variety);
        match self {
            DatasetSource::Hub { repo, revision } => {
                let api = Api::new().context("failed to initialise hub client")?;
                let repo = api.repo(Repo::with_revision(
                    repo.clone(),
                    RepoType::Dataset,
                    revision.clone(),
                ));
                let path = repo
                    .get(&file_name)
                    .await
                    .with_context(|| format!("failed to fetch `{file_name}` from the hub"))?;
                Ok(path)
            }
            DatasetSource::Local(dir) => {
                let path = dir.join(&file_name);
                if !path.is_file() {
                    return Err(anyhow!("`{}` does not exist", path.display()));
                }
                Ok(path)
            }
        }
    }
}

/// The immutable, postprocessed reference rows of one variety.
///
/// Cloning is cheap; clones share the same row storage, which is never
/// mutated after construction.
#[derive(Clone, Debug)]
pub struct ReferenceDataset {
    variety: Variety,
    rows: Arc<[DatasetRow]>,
}

impl ReferenceDataset {
    /// Normalizes `source` and `target` of every row and freezes the set.
    pub fn from_rows(variety: Variety, rows: Vec<DatasetRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| DatasetRow {
                source: postprocess(&row.source),
                target: postprocess(&row.target),
                ..row
            })
            .collect::<Vec<_>>();
        Self {
            variety,
            rows: rows.into(),
        }
    }

    #[tracing::instrument(name = "rmeval.dataset.load", level = "debug", skip(source))]
    pub async fn load(source: &DatasetSource, variety: Variety) -> Result<Self, EvalError> {
        let path = source
            .resolve(variety)
            .await
            .map_err(|err| EvalError::dataset_unavailable(variety, err))?;
        Self::from_jsonl(variety, &path)
    }

    pub fn from_jsonl(variety: Variety, path: &Path) -> Result<Self, EvalError> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))
            .map_err(|err| EvalError::dataset_unavailable(variety, err))?;

        let rows = data
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<DatasetRow>(line)
                    .with_context(|| format!("malformed row on line {} of `{}`", idx + 1, path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|err| EvalError::dataset_unavailable(variety, err))?;

        debug!(rows = rows.len(), path = %path.display(), "reference rows parsed");
        Ok(Self::from_rows(variety, rows))
    }

    pub fn variety(&self) -> Variety {
        self.variety
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn bad_source_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_bad_source).count()
    }

    /// Rows that take part in scoring.
    pub fn scorable_rows(&self) -> impl Iterator<Item = &DatasetRow> {
        self.rows.iter().filter(|row| !row.is_bad_source)
    }

    /// Number of translations a submission must provide.
    pub fn expected_translations(&self, skips_bad_sources: bool) -> usize {
        if skips_bad_sources {
            self.len() - self.bad_source_count()
        } else {
            self.len()
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_rows(self.rows())
    }
}

/// Reference datasets for every loaded variety.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCorpus {
    datasets: IndexMap<Variety, ReferenceDataset>,
}

impl ReferenceCorpus {
    /// Loads all six varieties. With `expected` set, a variety whose shape
    /// deviates is reported as unavailable.
    pub async fn load(
        source: &DatasetSource,
        expected: Option<&ExpectedShape>,
    ) -> Result<Self, EvalError> {
        let mut datasets = IndexMap::new();
        for variety in Variety::ALL {
            let dataset = ReferenceDataset::load(source, variety).await?;
            if let Some(expected) = expected {
                expected
                    .verify(&dataset.summary())
                    .map_err(|err| EvalError::dataset_unavailable(variety, err))?;
            }
            datasets.insert(variety, dataset);
        }
        Ok(Self { datasets })
    }

    pub fn insert(&mut self, dataset: ReferenceDataset) {
        if self.datasets.contains_key(&dataset.variety()) {
            warn!(variety = %dataset.variety(), "replacing loaded reference dataset");
        }
        self.datasets.insert(dataset.variety(), dataset);
    }

    pub fn get(&self, variety: Variety) -> Option<&ReferenceDataset> {
        self.datasets.get(&variety)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variety, &ReferenceDataset)> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl FromIterator<ReferenceDataset> for ReferenceCorpus {
    fn from_iter<T: IntoIterator<Item = ReferenceDataset>>(iter: T) -> Self {
        let mut corpus = ReferenceCorpus::default();
        for dataset in iter {
            corpus.insert(dataset);
        }
        corpus
    }
}
