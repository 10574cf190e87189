mod common;

use common::{
    BAD_SOURCES, CountingBackend, ROWS, domain_of, fixture_corpus, fixture_dataset,
    perfect_translations,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use romansh_mt_eval::{
    Domain, EvalError, Evaluation, LangPair, MemoryScoreCache, MetricKind, ReferenceCorpus,
    ScoreCache, SystemTranslations, ValidationError, Variety,
};
use serde_json::json;
use std::sync::Arc;

fn evaluation() -> Evaluation {
    Evaluation::builder().corpus(fixture_corpus()).build()
}

fn assert_all_perfect(result: &romansh_mt_eval::SystemResult) {
    for lang_pair in LangPair::ALL {
        let scores = result.scores(lang_pair);
        assert_eq!(scores.micro_avg, Some(100.0), "{lang_pair} micro");
        for domain in Domain::ALL {
            assert_eq!(scores.domain(domain), Some(100.0), "{lang_pair} {domain}");
        }
        assert_eq!(scores.macro_avg(), Some(100.0));
    }
}

#[rstest]
#[case::full_length(false)]
#[case::skipping(true)]
#[tokio::test]
async fn perfect_translations_align_for_either_flag(#[case] skips_bad_sources: bool) {
    let evaluation = evaluation();
    let translations = perfect_translations(Variety::Sursilvan, skips_bad_sources);
    let expected_len = if skips_bad_sources {
        ROWS as usize - BAD_SOURCES.len()
    } else {
        ROWS as usize
    };
    assert_eq!(translations.len(), expected_len);

    let result = evaluation.evaluate(translations, MetricKind::Chrf).await.unwrap();
    assert_all_perfect(&result);
    assert_eq!(result.sys_name, "oracle");
    assert_eq!(result.variety, Variety::Sursilvan);
}

#[tokio::test]
async fn full_length_submission_misaligned_by_skip_flag_scores_below_perfect() {
    let evaluation = evaluation();
    // Only the first bad source is left out, so every row after the second
    // one is paired with its predecessor's translation.
    let mut translations = perfect_translations(Variety::Puter, false);
    translations.translations_rm_to_de.remove(BAD_SOURCES[0] as usize);
    translations.translations_de_to_rm.remove(BAD_SOURCES[0] as usize);
    translations.translations_rm_to_de.pop();
    translations.translations_de_to_rm.pop();
    let translations = translations.skipping_bad_sources(true);

    let result = evaluation.evaluate(translations, MetricKind::Chrf).await.unwrap();
    let micro = result.scores_rm_to_de.micro_avg.unwrap();
    assert!(micro < 100.0, "shifted rows must not score perfectly, got {micro}");
}

#[tokio::test]
async fn skipping_submission_must_leave_out_bad_sources() {
    let evaluation = evaluation();
    let full = perfect_translations(Variety::Vallader, false).skipping_bad_sources(true);

    let err = evaluation.evaluate(full, MetricKind::Chrf).await.unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        err,
        EvalError::Validation(ValidationError::AlignmentError {
            variety: Variety::Vallader,
            expected: 10,
            actual: 12,
            skips_bad_sources: true,
        })
    ));

    let skipping = perfect_translations(Variety::Vallader, true);
    assert!(evaluation.evaluate(skipping, MetricKind::Chrf).await.is_ok());
}

#[tokio::test]
async fn direction_lengths_must_match() {
    let evaluation = evaluation();
    let mut translations = perfect_translations(Variety::Surmiran, false);
    translations.translations_de_to_rm.pop();

    let err = evaluation.evaluate(translations, MetricKind::Bleu).await.unwrap_err();
    assert!(matches!(
        err,
        EvalError::Validation(ValidationError::DirectionLengthMismatch {
            rm_to_de: 12,
            de_to_rm: 11,
        })
    ));
}

#[tokio::test]
async fn unknown_metric_name_is_rejected() {
    let evaluation = evaluation();
    let translations = perfect_translations(Variety::Puter, false);
    let err = evaluation
        .evaluate_named(translations, "meteor")
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedMetric { ref name } if name == "meteor"));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn variety_outside_loaded_corpus_is_unavailable() {
    let evaluation = Evaluation::builder()
        .corpus(ReferenceCorpus::from_iter([fixture_dataset(Variety::Puter)]))
        .build();
    let translations = perfect_translations(Variety::Sutsilvan, false);
    let err = evaluation.evaluate(translations, MetricKind::Chrf).await.unwrap_err();
    assert!(matches!(err, EvalError::DatasetUnavailable { variety: Variety::Sutsilvan, .. }));
}

#[tokio::test]
async fn placeholder_translations_still_score() {
    let evaluation = evaluation();
    let translations = SystemTranslations::new(
        "placeholder",
        Variety::RumantschGrischun,
        vec!["x".to_string(); ROWS as usize],
        vec!["x".to_string(); ROWS as usize],
    );
    let chrf = evaluation
        .evaluate(translations.clone(), MetricKind::Chrf)
        .await
        .unwrap();
    let micro = chrf.scores_rm_to_de.micro_avg.unwrap();
    assert!(micro.is_finite() && (0.0..100.0).contains(&micro));

    // No reference contains the token "x".
    let bleu = evaluation.evaluate(translations, MetricKind::Bleu).await.unwrap();
    assert_eq!(bleu.scores_rm_to_de.micro_avg, Some(0.0));
    assert_eq!(bleu.scores_de_to_rm.micro_avg, Some(0.0));
    assert!(bleu.scores_rm_to_de.domain_results.values().all(|score| *score == Some(0.0)));
}

#[tokio::test]
async fn micro_and_macro_averages_differ() {
    let evaluation = evaluation();
    let mut translations = perfect_translations(Variety::Puter, false);
    // Only literary rows are translated.
    for (segment_id, (rm_to_de, de_to_rm)) in translations
        .translations_rm_to_de
        .iter_mut()
        .zip(translations.translations_de_to_rm.iter_mut())
        .enumerate()
    {
        if domain_of(segment_id as i64) != Domain::Literary {
            rm_to_de.clear();
            de_to_rm.clear();
        }
    }

    let result = evaluation.evaluate(translations, MetricKind::Chrf).await.unwrap();
    let scores = &result.scores_rm_to_de;
    assert_eq!(scores.domain(Domain::Literary), Some(100.0));
    assert_eq!(scores.domain(Domain::News), Some(0.0));

    let domain_values = Domain::ALL
        .iter()
        .filter_map(|domain| scores.domain(*domain))
        .collect::<Vec<_>>();
    let mean = domain_values.iter().sum::<f64>() / domain_values.len() as f64;
    assert_eq!(scores.macro_avg(), Some(mean));
    assert_eq!(mean, 25.0);

    let micro = scores.micro_avg.unwrap();
    assert!((micro - mean).abs() > 1e-6, "micro {micro} equals macro");
}

#[tokio::test]
async fn quality_estimation_skips_german_to_romansh() {
    let backend = Arc::new(CountingBackend::new(json!(0.5)));
    let evaluation = Evaluation::builder()
        .corpus(fixture_corpus())
        .qe_model("test/qe")
        .qe_backend(backend.clone())
        .build();

    let result = evaluation
        .evaluate(perfect_translations(Variety::Puter, true), MetricKind::XCometXl)
        .await
        .unwrap();

    assert_eq!(result.scores_de_to_rm.micro_avg, None);
    assert_eq!(result.scores_de_to_rm.macro_avg(), None);
    assert!(result.scores_de_to_rm.domain_results.values().all(Option::is_none));

    assert_eq!(result.scores_rm_to_de.micro_avg, Some(50.0));
    assert_eq!(result.scores_rm_to_de.macro_avg(), Some(50.0));

    // Ten distinct German references, each scored once; the domain pass fills
    // the cache for the pooled pass.
    assert_eq!(backend.calls(), 10);
    let requests = backend.requests.lock().unwrap();
    assert!(requests.iter().all(|(model, source, _, reference)| {
        model == "test/qe" && source.is_none() && reference.is_some()
    }));
}

#[tokio::test]
async fn quality_estimation_without_backend_scores_zero() {
    let cache = Arc::new(MemoryScoreCache::default());
    let evaluation = Evaluation::builder()
        .corpus(fixture_corpus())
        .score_cache(cache.clone() as Arc<dyn ScoreCache>)
        .build();

    let result = evaluation
        .evaluate(perfect_translations(Variety::Puter, false), MetricKind::XCometXl)
        .await
        .unwrap();
    assert_eq!(result.scores_rm_to_de.micro_avg, Some(0.0));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn repeated_evaluations_do_not_leak_into_each_other() {
    let evaluation = evaluation();
    let first = evaluation
        .evaluate(perfect_translations(Variety::Sutsilvan, false), MetricKind::Chrf)
        .await
        .unwrap();

    let noisy = SystemTranslations::new(
        "noise",
        Variety::Sutsilvan,
        vec!["bla".to_string(); ROWS as usize],
        vec!["bla".to_string(); ROWS as usize],
    );
    let second = evaluation.evaluate(noisy, MetricKind::Chrf).await.unwrap();
    assert!(second.scores_rm_to_de.micro_avg.unwrap() < 100.0);

    let third = evaluation
        .evaluate(perfect_translations(Variety::Sutsilvan, false), MetricKind::Chrf)
        .await
        .unwrap();
    assert_eq!(first, third);

    let rows = evaluation.corpus().get(Variety::Sutsilvan).unwrap().rows();
    assert_eq!(rows.len(), ROWS as usize);
    assert_eq!(rows[0].source, "Er sagte: \"Guten Morgen\".");
}

#[tokio::test]
async fn submissions_are_postprocessed_before_scoring() {
    let evaluation = evaluation();
    let mut translations = perfect_translations(Variety::RumantschGrischun, false);
    translations.translations_rm_to_de[0] = "  Er sagte: «Guten\nMorgen».  ".to_string();
    translations.translations_de_to_rm[0] = "El ha ditg: “Bun di”. (RG)".to_string();

    let result = evaluation.evaluate(translations, MetricKind::Chrf).await.unwrap();
    assert_all_perfect(&result);
}

#[tokio::test]
async fn evaluate_all_groups_by_system_then_variety() {
    let evaluation = evaluation();
    let mut submissions = Vec::new();
    for sys_name in ["first", "second"] {
        for variety in [Variety::Puter, Variety::Vallader] {
            let mut translations = perfect_translations(variety, false);
            translations.sys_name = sys_name.to_string();
            submissions.push(translations);
        }
    }

    let results = evaluation.evaluate_all(submissions, MetricKind::Bleu).await.unwrap();
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["first", "second"]);
    assert_eq!(
        results["second"].keys().copied().collect::<Vec<_>>(),
        vec![Variety::Puter, Variety::Vallader]
    );
    assert_eq!(results["first"][&Variety::Puter].metric, MetricKind::Bleu);
}
