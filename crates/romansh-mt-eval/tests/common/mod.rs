#![allow(dead_code)]

use async_trait::async_trait;
use romansh_mt_eval::{
    DatasetRow, Domain, EvalError, QualityBackend, QualityRequest, ReferenceCorpus,
    ReferenceDataset, SystemTranslations, Variety,
};
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ROWS: i64 = 12;
/// Segment ids flagged as bad sources.
pub const BAD_SOURCES: [i64; 2] = [2, 7];

const GERMAN: [&str; 12] = [
    "Er sagte: “Guten Morgen”.",
    "Die Regierung hat das Budget genehmigt.",
    "lol das ist so lustig",
    "Meine Damen und Herren, willkommen.",
    "Der Wind strich über die Berge.",
    "Der Zug fährt um acht Uhr ab.",
    "Hat jemand das Spiel gesehen?",
    "Vielen Dank für Ihre Aufmerksamkeit.",
    "Sie öffnete das Fenster langsam.",
    "Die Wahlen finden im Herbst statt.",
    "Morgen gehen wir wandern!",
    "Wir kommen nun zum nächsten Punkt.",
];

const ROMANSH: [&str; 12] = [
    "El ha ditg: «Bun di».",
    "La regenza ha approvà il budget.",
    "lol quai è uschè divertent",
    "Stimadas donnas e stimads signurs, bainvegni.",
    "Il vent ha travers las muntognas.",
    "Il tren parta a las otg.",
    "Ha insatgi vis il gieu?",
    "Grazia fitg per Vossa attenziun.",
    "Ella ha avert plaunsieu la fanestra.",
    "Las elecziuns han lieu l'atun.",
    "Damaun giain nus a spass!",
    "Nus vegnin ussa al proxim punct.",
];

pub fn domain_of(segment_id: i64) -> Domain {
    Domain::ALL[segment_id as usize % Domain::ALL.len()]
}

/// Twelve rows cycling through the four domains, two of them bad sources.
///
/// Romansh targets carry the variety code so the varieties differ.
pub fn fixture_rows(variety: Variety) -> Vec<DatasetRow> {
    (0..ROWS)
        .map(|segment_id| DatasetRow {
            lp: variety.dataset_config(),
            domain: Some(domain_of(segment_id)),
            document_id: format!("doc-{}", segment_id / 3),
            segment_id,
            is_bad_source: BAD_SOURCES.contains(&segment_id),
            source: GERMAN[segment_id as usize].to_string(),
            target: format!("{} ({})", ROMANSH[segment_id as usize], variety.short_name().trim()),
            comment: None,
        })
        .collect()
}

pub fn fixture_dataset(variety: Variety) -> ReferenceDataset {
    ReferenceDataset::from_rows(variety, fixture_rows(variety))
}

pub fn fixture_corpus() -> ReferenceCorpus {
    Variety::ALL.into_iter().map(fixture_dataset).collect()
}

/// Submission reproducing the references exactly; bad-source slots hold
/// junk when they are not skipped.
pub fn perfect_translations(variety: Variety, skips_bad_sources: bool) -> SystemTranslations {
    let dataset = fixture_dataset(variety);
    let (rm_to_de, de_to_rm): (Vec<String>, Vec<String>) = dataset
        .rows()
        .iter()
        .filter(|row| !(skips_bad_sources && row.is_bad_source))
        .map(|row| {
            if row.is_bad_source {
                ("###".to_string(), "###".to_string())
            } else {
                (row.source.clone(), row.target.clone())
            }
        })
        .unzip();
    SystemTranslations::new("oracle", variety, rm_to_de, de_to_rm)
        .skipping_bad_sources(skips_bad_sources)
}

/// Quality backend answering every request with the same value and counting
/// the requests it receives.
pub struct CountingBackend {
    answer: Value,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<(String, Option<String>, String, Option<String>)>>,
}

impl CountingBackend {
    pub fn new(answer: Value) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QualityBackend for CountingBackend {
    async fn predict(&self, request: QualityRequest<'_>) -> Result<Value, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((
            request.model_name.to_string(),
            request.source.map(str::to_string),
            request.hypothesis.to_string(),
            request.reference.map(str::to_string),
        ));
        Ok(self.answer.clone())
    }
}

/// Backend whose transport always fails.
pub struct FailingBackend;

#[async_trait]
impl QualityBackend for FailingBackend {
    async fn predict(&self, _request: QualityRequest<'_>) -> Result<Value, EvalError> {
        Err(EvalError::Backend {
            source: anyhow::anyhow!("connection refused"),
        })
    }
}
