use itertools::Itertools;
use serde::Serialize;

use crate::core::{Domain, LangPair, Variety};
use crate::evaluate::{ScoreResult, SystemResult, SystemResults};
use crate::loaders::{SystemCatalog, SystemEntry};

pub const MISSING: &str = "-";
/// Keeps single-metric cells aligned with `chrF / xCOMET` cells.
const PAIR_PHANTOM: &str = r"\phantom{0.00 / }";

/// One score of one metric, before combination with other metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreCell {
    pub score: Option<f64>,
    pub bold: bool,
}

impl ScoreCell {
    pub fn new(score: Option<f64>) -> Self {
        Self { score, bold: false }
    }

    pub fn render(&self) -> String {
        match self.score {
            None => MISSING.to_string(),
            Some(score) if self.bold => format!(r"\textbf{{{score:.1}}}"),
            Some(score) => format!("{score:.1}"),
        }
    }
}

/// Rounds to the one decimal shown in the tables.
pub fn round1(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Bolds every score that ties with the column maximum after rounding.
pub fn mark_best(cells: &mut [ScoreCell]) {
    let best = cells
        .iter()
        .filter_map(|cell| cell.score.map(round1))
        .fold(None, |best: Option<f64>, score| Some(best.map_or(score, |best| best.max(score))));
    let Some(best) = best else {
        return;
    };
    for cell in cells {
        cell.bold = cell.score.is_some_and(|score| round1(score) == best);
    }
}

pub fn gray(text: &str) -> String {
    format!(r"\textcolor{{graycolor}}{{{text}}}")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableRow {
    /// Label-only row introducing a group.
    Heading { label: String },
    Rule,
    Scores { label: String, cells: Vec<String> },
}

/// A system × column grid of rendered LaTeX cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultsTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl ResultsTable {
    /// Rendered cells of the row labelled `label`.
    pub fn cells(&self, label: &str) -> Option<&[String]> {
        self.rows.iter().find_map(|row| match row {
            TableRow::Scores { label: row_label, cells } if row_label == label => Some(cells.as_slice()),
            _ => None,
        })
    }
}

/// What a table shows for one system in one column.
#[derive(Clone, Copy, Debug, Default)]
struct Lookup {
    score: Option<f64>,
    gray: bool,
}

fn result_for<'r>(results: &'r SystemResults, entry: &SystemEntry, variety: Variety) -> Option<&'r SystemResult> {
    results.get(entry.name()).and_then(|by_variety| by_variety.get(&variety))
}

/// Headline score of one direction: micro average, except the macro average
/// for quality estimation from Romansh into German.
pub fn headline_score(scores: &ScoreResult) -> Option<f64> {
    if scores.lang_pair == LangPair::RmToDe && scores.metric.is_quality_estimation() {
        scores.macro_avg()
    } else {
        scores.micro_avg
    }
}

fn layout(
    entries: &[&SystemEntry],
    columns: Vec<String>,
    metrics: usize,
    padded: bool,
    lookup: impl Fn(usize, &SystemEntry, usize) -> Lookup,
) -> ResultsTable {
    let width = columns.len();
    let mut grids = Vec::with_capacity(metrics);
    let mut grayed = vec![vec![false; width]; entries.len()];
    for metric in 0..metrics {
        let mut grid = vec![vec![ScoreCell::default(); entries.len()]; width];
        for (row, entry) in entries.iter().enumerate() {
            for (column, cells) in grid.iter_mut().enumerate() {
                let found = lookup(metric, entry, column);
                cells[row] = ScoreCell::new(found.score);
                grayed[row][column] |= found.gray;
            }
        }
        grid.iter_mut().for_each(|column| mark_best(column));
        grids.push(grid);
    }

    let mut rows = Vec::new();
    let mut previous_group = None;
    for (row, entry) in entries.iter().enumerate() {
        if previous_group != Some(entry.group) {
            if previous_group.is_some() {
                rows.push(TableRow::Rule);
            }
            if let Some(heading) = entry.group.heading() {
                rows.push(TableRow::Heading {
                    label: heading.to_string(),
                });
            }
            previous_group = Some(entry.group);
        }

        let cells = (0..width)
            .map(|column| {
                let parts = grids.iter().map(|grid| grid[column][row]).collect::<Vec<_>>();
                let mut text = if parts.iter().all(|cell| cell.score.is_none()) {
                    MISSING.to_string()
                } else {
                    parts.iter().map(ScoreCell::render).join(" / ")
                };
                if padded {
                    text = format!("{PAIR_PHANTOM}{text}");
                }
                if grayed[row][column] {
                    text = gray(&text);
                }
                text
            })
            .collect();
        rows.push(TableRow::Scores {
            label: entry.label.clone(),
            cells,
        });
    }

    ResultsTable { columns, rows }
}

/// Systems × varieties table of headline scores for one direction.
///
/// Each entry of `metrics` holds the results of one metric; their scores are
/// joined with ` / ` in every cell, and each metric is bolded independently.
/// German→Romansh cells are padded to line up with two-metric tables, and
/// cells that reuse another variety's output are grayed.
pub fn variety_table(
    catalog: &SystemCatalog,
    lang_pair: LangPair,
    metrics: &[&SystemResults],
) -> ResultsTable {
    let entries = catalog
        .entries()
        .iter()
        .filter(|entry| lang_pair == LangPair::DeToRm || entry.translates_rm_to_de)
        .collect::<Vec<_>>();
    let columns = Variety::ALL
        .iter()
        .map(|variety| variety.display_name().to_string())
        .collect();

    layout(
        &entries,
        columns,
        metrics.len(),
        lang_pair == LangPair::DeToRm,
        |metric, entry, column| {
            result_for(metrics[metric], entry, Variety::ALL[column])
                .map(|result| Lookup {
                    score: headline_score(result.scores(lang_pair)),
                    gray: lang_pair == LangPair::DeToRm && result.is_de_to_rm_stand_in(),
                })
                .unwrap_or_default()
        },
    )
}

/// Systems × domains table for one variety, with a macro-average column.
///
/// Systems whose German→Romansh output was produced for another variety are
/// left out of German→Romansh tables.
pub fn domain_table(
    catalog: &SystemCatalog,
    lang_pair: LangPair,
    variety: Variety,
    metrics: &[&SystemResults],
) -> ResultsTable {
    let entries = catalog
        .entries()
        .iter()
        .filter(|entry| match lang_pair {
            LangPair::RmToDe => entry.translates_rm_to_de,
            LangPair::DeToRm => !metrics.iter().any(|results| {
                result_for(results, entry, variety).is_some_and(SystemResult::is_de_to_rm_stand_in)
            }),
        })
        .collect::<Vec<_>>();
    let mut columns = Domain::ALL
        .iter()
        .map(|domain| domain.display_name().to_string())
        .collect::<Vec<_>>();
    columns.push("Macro-Average".to_string());

    layout(
        &entries,
        columns,
        metrics.len(),
        lang_pair == LangPair::DeToRm,
        |metric, entry, column| {
            let score = result_for(metrics[metric], entry, variety).and_then(|result| {
                let scores = result.scores(lang_pair);
                match Domain::ALL.get(column) {
                    Some(domain) => scores.domain(*domain),
                    None => scores.macro_avg(),
                }
            });
            Lookup { score, gray: false }
        },
    )
}
