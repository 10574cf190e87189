use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::{Domain, LangPair, Variety};
use crate::evaluate::SystemResults;
use crate::metrics::MetricKind;

/// Flat, serialisable view of one direction's scores, macro average included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub sys_name: String,
    pub variety: Variety,
    pub lang_pair: LangPair,
    pub metric: MetricKind,
    pub domain_results: Vec<(Domain, Option<f64>)>,
    pub micro_avg: Option<f64>,
    pub macro_avg: Option<f64>,
    pub de_to_rm_stand_in: bool,
}

/// One record per system, variety and direction, in result order.
pub fn score_records(results: &SystemResults) -> Vec<ScoreRecord> {
    results
        .values()
        .flat_map(|by_variety| by_variety.values())
        .flat_map(|result| {
            LangPair::ALL.into_iter().map(move |lang_pair| {
                let scores = result.scores(lang_pair);
                ScoreRecord {
                    sys_name: result.sys_name.clone(),
                    variety: result.variety,
                    lang_pair,
                    metric: result.metric,
                    domain_results: scores
                        .domain_results
                        .iter()
                        .map(|(domain, score)| (*domain, *score))
                        .collect(),
                    micro_avg: scores.micro_avg,
                    macro_avg: scores.macro_avg(),
                    de_to_rm_stand_in: result.is_de_to_rm_stand_in(),
                }
            })
        })
        .collect()
}

/// Writes the score records as pretty-printed JSON.
pub fn write_json(results: &SystemResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&score_records(results))?;
    fs::write(path, json).with_context(|| format!("failed to write `{}`", path.display()))
}

/// Stores full results so tables can be rebuilt without rescoring.
pub fn write_results(results: &SystemResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string(results)?;
    fs::write(path, json).with_context(|| format!("failed to write `{}`", path.display()))
}

/// Reads results stored by [`write_results`].
pub fn read_results(path: &Path) -> Result<SystemResults> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("malformed results in `{}`", path.display()))
}
