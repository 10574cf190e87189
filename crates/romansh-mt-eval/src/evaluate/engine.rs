use bon::Builder;
use indexmap::IndexMap;
use kdam::{BarExt, tqdm};
use std::sync::Arc;
use tracing::{debug, info};

use super::align::{AlignedRow, align};
use super::results::{ScoreResult, SystemResult, SystemResults};
use crate::core::{
    DEFAULT_QE_MODEL, Domain, EvalError, EvalSettings, LangPair, ValidationError,
};
use crate::data::{ExpectedShape, ReferenceCorpus, ReferenceDataset, SystemTranslations};
use crate::metrics::{
    Bleu, Chrf, CorpusMetric, HttpQualityBackend, Metric, MetricKind, QualityBackend,
    QualityEstimator,
};
use crate::utils::{DiskScoreCache, MemoryScoreCache, ScoreCache};

/// Scores system submissions against the reference corpus.
///
/// Holds the immutable reference datasets of every variety plus the
/// dependencies of the quality-estimation metric. One instance serves any
/// number of [`evaluate`](Evaluation::evaluate) calls; each call joins the
/// submission with the shared rows into a fresh [`AlignedRow`] set, so nothing
/// carries over between calls.
///
/// ```no_run
/// # async fn run() -> Result<(), romansh_mt_eval::EvalError> {
/// use romansh_mt_eval::{EvalSettings, Evaluation, MetricKind, SystemTranslations, Variety};
///
/// let evaluation = Evaluation::from_settings(&EvalSettings::from_env()).await?;
/// let n = evaluation.corpus().get(Variety::Puter).map_or(0, |d| d.len());
/// let translations = SystemTranslations::new("echo", Variety::Puter, vec![String::new(); n], vec![String::new(); n]);
/// let result = evaluation.evaluate(translations, MetricKind::Chrf).await?;
/// println!("{:?}", result.scores_rm_to_de.micro_avg);
/// evaluation.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Builder)]
pub struct Evaluation {
    corpus: ReferenceCorpus,
    #[builder(default = DEFAULT_QE_MODEL.to_string(), into)]
    qe_model: String,
    qe_backend: Option<Arc<dyn QualityBackend>>,
    #[builder(default = Arc::new(MemoryScoreCache::default()) as Arc<dyn ScoreCache>)]
    score_cache: Arc<dyn ScoreCache>,
    #[builder(default = false)]
    show_progress: bool,
}

impl Evaluation {
    /// Loads all six reference datasets and opens the persistent score cache.
    #[tracing::instrument(name = "rmeval.evaluation.from_settings", level = "info", skip_all)]
    pub async fn from_settings(settings: &EvalSettings) -> Result<Self, EvalError> {
        let expected = settings
            .verify_reference_shape
            .then_some(&ExpectedShape::WMT24PP_RM);
        let corpus = ReferenceCorpus::load(&settings.dataset, expected).await?;
        let score_cache = DiskScoreCache::open(&settings.cache_dir).await?;
        let qe_backend = settings
            .qe_api_url
            .as_deref()
            .map(|url| Arc::new(HttpQualityBackend::new(url)) as Arc<dyn QualityBackend>);
        if qe_backend.is_none() {
            info!("no quality-estimation backend configured, uncached segments score 0");
        }

        Ok(Evaluation::builder()
            .corpus(corpus)
            .qe_model(settings.qe_model.clone())
            .maybe_qe_backend(qe_backend)
            .score_cache(Arc::new(score_cache))
            .show_progress(settings.show_progress)
            .build())
    }

    pub fn corpus(&self) -> &ReferenceCorpus {
        &self.corpus
    }

    pub fn metric(&self, kind: MetricKind) -> Metric {
        match kind {
            MetricKind::Chrf => Chrf::default().into(),
            MetricKind::Bleu => Bleu::default().into(),
            MetricKind::XCometXl => QualityEstimator::builder()
                .model_name(self.qe_model.clone())
                .maybe_backend(self.qe_backend.clone())
                .cache(self.score_cache.clone())
                .show_progress(self.show_progress)
                .build()
                .into(),
        }
    }

    /// Checks that a submission can be aligned with its variety's rows.
    pub fn validate(&self, translations: &SystemTranslations) -> Result<&ReferenceDataset, EvalError> {
        let dataset = self.corpus.get(translations.variety).ok_or_else(|| {
            EvalError::dataset_unavailable(
                translations.variety,
                anyhow::anyhow!("variety is not part of the loaded corpus"),
            )
        })?;

        let rm_to_de = translations.translations_rm_to_de.len();
        let de_to_rm = translations.translations_de_to_rm.len();
        if rm_to_de != de_to_rm {
            return Err(ValidationError::DirectionLengthMismatch { rm_to_de, de_to_rm }.into());
        }

        let expected = dataset.expected_translations(translations.skips_bad_sources);
        if rm_to_de != expected {
            return Err(ValidationError::AlignmentError {
                variety: translations.variety,
                expected,
                actual: rm_to_de,
                skips_bad_sources: translations.skips_bad_sources,
            }
            .into());
        }
        Ok(dataset)
    }

    /// Like [`evaluate`](Evaluation::evaluate), selecting the metric by name.
    pub async fn evaluate_named(
        &self,
        translations: SystemTranslations,
        metric: &str,
    ) -> Result<SystemResult, EvalError> {
        let kind = MetricKind::parse(metric)?;
        self.evaluate(translations, kind).await
    }

    /// Scores both directions of one submission, per domain and pooled.
    ///
    /// Fails before any scoring if the submission cannot be aligned.
    #[tracing::instrument(
        name = "rmeval.evaluation.evaluate",
        level = "debug",
        skip(self, translations),
        fields(sys_name = %translations.sys_name, variety = %translations.variety)
    )]
    pub async fn evaluate(
        &self,
        translations: SystemTranslations,
        kind: MetricKind,
    ) -> Result<SystemResult, EvalError> {
        let dataset = self.validate(&translations)?;
        let metric = self.metric(kind);

        let translations = translations.postprocessed();
        let sys_name = translations.sys_name.clone();
        let variety = translations.variety;
        let de_to_rm_origin = translations.de_to_rm_origin;
        let aligned = align(dataset, translations);
        debug!(rows = aligned.len(), "submission aligned with scorable rows");

        let score_result = async |lang_pair: LangPair| -> Result<ScoreResult, EvalError> {
            let (domain_results, micro_avg) = score_direction(&metric, &aligned, lang_pair).await?;
            Ok(ScoreResult {
                lang_pair,
                sys_name: sys_name.clone(),
                variety,
                metric: kind,
                domain_results,
                micro_avg,
            })
        };
        let scores_rm_to_de = score_result(LangPair::RmToDe).await?;
        let scores_de_to_rm = score_result(LangPair::DeToRm).await?;

        Ok(SystemResult {
            sys_name,
            variety,
            metric: kind,
            de_to_rm_origin,
            scores_rm_to_de,
            scores_de_to_rm,
        })
    }

    /// Evaluates many submissions with one metric, grouped by system then
    /// variety in input order.
    #[tracing::instrument(name = "rmeval.evaluation.evaluate_all", level = "info", skip_all, fields(metric = %kind))]
    pub async fn evaluate_all(
        &self,
        submissions: impl IntoIterator<Item = SystemTranslations>,
        kind: MetricKind,
    ) -> Result<SystemResults, EvalError> {
        let submissions = submissions.into_iter().collect::<Vec<_>>();
        let mut progress = self
            .show_progress
            .then(|| tqdm!(total = submissions.len(), desc = "Evaluating systems"));

        let mut results = SystemResults::new();
        for translations in submissions {
            let result = self.evaluate(translations, kind).await?;
            results
                .entry(result.sys_name.clone())
                .or_default()
                .insert(result.variety, result);
            if let Some(bar) = progress.as_mut() {
                let _ = bar.update(1);
            }
        }
        Ok(results)
    }

    /// Closes the score cache. Call once before the process exits.
    pub async fn close(&self) -> Result<(), EvalError> {
        self.score_cache.close().await
    }
}

type DirectionScores = (IndexMap<Domain, Option<f64>>, Option<f64>);

async fn score_direction(
    metric: &Metric,
    aligned: &[AlignedRow<'_>],
    lang_pair: LangPair,
) -> Result<DirectionScores, EvalError> {
    if !metric.supports(lang_pair) {
        debug!(%lang_pair, metric = %metric.kind(), "direction not supported, recording nulls");
        let domains = Domain::ALL.into_iter().map(|domain| (domain, None)).collect();
        return Ok((domains, None));
    }

    let mut domains = IndexMap::new();
    for domain in Domain::ALL {
        let rows = aligned.iter().filter(|row| row.row.domain == Some(domain));
        let score = corpus_score(metric, rows, lang_pair).await?;
        domains.insert(domain, Some(score));
    }
    let micro_avg = corpus_score(metric, aligned.iter(), lang_pair).await?;
    Ok((domains, Some(micro_avg)))
}

async fn corpus_score<'r, 'a: 'r>(
    metric: &Metric,
    rows: impl Iterator<Item = &'r AlignedRow<'a>>,
    lang_pair: LangPair,
) -> Result<f64, EvalError> {
    let (hypotheses, references): (Vec<&str>, Vec<&str>) = rows
        .map(|row| (row.hypothesis(lang_pair), row.reference(lang_pair)))
        .unzip();
    Ok(metric.corpus_score(&hypotheses, &references).await? * metric.scale())
}
