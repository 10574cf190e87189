use anyhow::{Context, Result};
use itertools::Itertools;
use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use strum::Display;
use tracing::{info, warn};

use super::cross_variety::CrossVarietyMatrix;
use super::table::{ResultsTable, domain_table};
use crate::core::{Domain, LangPair, Variety};
use crate::data::{ExpectedShape, ReferenceCorpus, TextStats};
use crate::evaluate::SystemResults;
use crate::loaders::SystemCatalog;

const RESULTS_TABLE: &str = r"\begin{tabularx}{\textwidth}{@{}X{{ colspec }}@{}}
\toprule
\textbf{System}{% for column in columns %} & \textbf{ {{- column -}} }{% endfor %} \\
\midrule
{% for row in rows %}
{% if row.kind == 'rule' %}
\midrule
{% elif row.kind == 'heading' %}
{{ row.label }}{% for column in columns %} &{% endfor %} \\
{% else %}
{{ row.label }}{% for cell in row.cells %} & {{ cell }}{% endfor %} \\
{% endif %}
{% endfor %}
\bottomrule
\end{tabularx}";

const DOMAIN_SECTIONS: &str = r"{% for section in sections %}
\subsection{ {{- section.title -}} }

\begin{table}[H]
\centering
{{ section.table }}
\caption{ {{- section.caption -}} }
\end{table}
{% if section.break_after %}
\vfill
\clearpage
{% endif %}
{% endfor %}";

const CROSS_VARIETY: &str = r"\begin{tabularx}{\columnwidth}{@{}X|*{6}{>{\raggedleft\arraybackslash}p{0.65cm}}}
\multirow[b]{2}{*}{$\downarrow$~\textbf{sys}}
& \multicolumn{6}{l}{$\textbf{ref}$~$\rightarrow$} \\
{% for column in columns %} & {{ column }}{% endfor %} \\
\midrule
{% for row in rows %}
{{ row.label }}{% for cell in row.cells %} & {{ cell }}{% endfor %} \\
{% endfor %}
\bottomrule
\end{tabularx}";

const DATASET_STATS: &str = r"\begin{tabularx}{\textwidth}{@{}X{{ colspec }}@{}}
\toprule
\textbf{Variety} & \multicolumn{ {{- width -}} }{c}{\textbf{Segments}} & \multicolumn{ {{- width -}} }{c}{\textbf{Tokens}} \\
\cmidrule(lr){2-{{ width + 1 }}}\cmidrule(lr){ {{- width + 2 -}} -{{ 2 * width + 1 }}}
{% for part in ['segments', 'tokens'] %}{% for column in columns %} & \textbf{ {{- column -}} }{% endfor %}{% endfor %} \\
\midrule
{% for row in rows %}
{{ row.label }}{% for cell in row.cells %} & {{ cell }}{% endfor %} \\
{% if loop.first %}
\midrule
{% endif %}
{% endfor %}
\bottomrule
\end{tabularx}";

/// Files under `latex/include/` of the paper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PaperTable {
    ResultsRmToDe,
    ResultsDeToRm,
    ResultsRmToDeDetailed,
    ResultsDeToRmDetailed,
    CrossVarietyScores,
    DatasetStats,
}

impl PaperTable {
    pub fn file_name(self) -> String {
        format!("{self}.tex")
    }
}

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("results_table.tex", RESULTS_TABLE)?;
    env.add_template("domain_sections.tex", DOMAIN_SECTIONS)?;
    env.add_template("cross_variety.tex", CROSS_VARIETY)?;
    env.add_template("dataset_stats.tex", DATASET_STATS)?;
    Ok(env)
}

/// Renders a results table as a `tabularx` environment.
pub fn render_table(table: &ResultsTable) -> Result<String> {
    let env = environment()?;
    let colspec = "r".repeat(table.columns.len());
    Ok(env.get_template("results_table.tex")?.render(context! {
        colspec,
        columns => &table.columns,
        rows => &table.rows,
    })?)
}

#[derive(Serialize)]
struct Section {
    title: String,
    table: String,
    caption: String,
    break_after: bool,
}

/// One subsection with a domain table per variety.
///
/// Romansh→German pages break after every third variety.
pub fn render_domain_tables(
    catalog: &SystemCatalog,
    lang_pair: LangPair,
    metrics: &[&SystemResults],
) -> Result<String> {
    let metric_names = metrics
        .iter()
        .filter_map(|results| {
            let first = results.values().flat_map(|by_variety| by_variety.values()).next()?;
            Some(first.metric.display_name())
        })
        .join(" / ");

    let sections = Variety::ALL
        .iter()
        .enumerate()
        .map(|(idx, variety)| -> Result<Section> {
            let name = variety.display_name();
            let (title, direction) = match lang_pair {
                LangPair::RmToDe => (
                    format!("{name} to German"),
                    format!("from {name} into German"),
                ),
                LangPair::DeToRm => (
                    format!("German to {name}"),
                    format!("from German into {name}"),
                ),
            };
            Ok(Section {
                title,
                table: render_table(&domain_table(catalog, lang_pair, *variety, metrics))?,
                caption: format!("{metric_names} scores for translation {direction}."),
                break_after: lang_pair == LangPair::RmToDe && idx % 3 == 2,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let env = environment()?;
    Ok(env
        .get_template("domain_sections.tex")?
        .render(context! { sections })?)
}

#[derive(Serialize)]
struct LabelledRow {
    label: String,
    cells: Vec<String>,
}

/// Shaded variety × variety chrF matrix.
pub fn render_cross_variety(matrix: &CrossVarietyMatrix) -> Result<String> {
    let columns = Variety::ALL
        .iter()
        .map(|variety| variety.short_name())
        .collect::<Vec<_>>();
    let rows = Variety::ALL
        .iter()
        .map(|sys_variety| LabelledRow {
            label: sys_variety.short_name().trim_end_matches(r"\ ").to_string(),
            cells: Variety::ALL
                .iter()
                .map(|ref_variety| matrix.cell(*sys_variety, *ref_variety))
                .collect(),
        })
        .collect::<Vec<_>>();

    let env = environment()?;
    Ok(env
        .get_template("cross_variety.tex")?
        .render(context! { columns, rows })?)
}

/// Thousands separated by a thin space.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::new();
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push_str(r"\,");
        }
        out.push(digit);
    }
    out
}

fn stats_cells(stats: &TextStats, italic: bool) -> Vec<String> {
    let format = |count: usize| {
        let count = format_count(count);
        if italic { format!(r"\textit{{{count}}}") } else { count }
    };
    let segments = Domain::ALL
        .iter()
        .map(|domain| stats.segments.get(domain).copied().unwrap_or_default())
        .chain([stats.total_segments()]);
    let tokens = Domain::ALL
        .iter()
        .map(|domain| stats.tokens.get(domain).copied().unwrap_or_default())
        .chain([stats.total_tokens()]);
    segments.chain(tokens).map(format).collect()
}

/// Segment and token counts per domain, German first.
///
/// The German side is taken from the source column of the standard variety.
/// Varieties with fewer translated segments than the full test set are
/// printed in italics.
pub fn render_dataset_stats(corpus: &ReferenceCorpus) -> Result<String> {
    let german = corpus
        .get(Variety::STANDARD)
        .or_else(|| corpus.iter().next().map(|(_, dataset)| dataset))
        .context("no reference dataset loaded")?
        .summary();

    let mut rows = vec![LabelledRow {
        label: r"German \mbox{\cite{deutsch2025wmt24expandinglanguagecoverage}}".to_string(),
        cells: stats_cells(&german.source, false),
    }];
    for (variety, dataset) in corpus.iter() {
        let summary = dataset.summary();
        let label = match variety {
            Variety::RumantschGrischun => "RG",
            other => other.display_name(),
        };
        let italic = summary.target.total_segments() < ExpectedShape::WMT24PP_RM.rows;
        rows.push(LabelledRow {
            label: label.to_string(),
            cells: stats_cells(&summary.target, italic),
        });
    }

    let columns = ["Lit.", "News", "Soc.", "Speech", "Total"];
    let width = columns.len();
    let env = environment()?;
    Ok(env.get_template("dataset_stats.tex")?.render(context! {
        colspec => "r".repeat(2 * width),
        width,
        columns,
        rows,
    })?)
}

/// Writes `content` to `<paper_dir>/latex/include/<table>.tex`.
///
/// Nothing is written unless the include directory already exists, so a
/// misconfigured `PAPER_DIR` cannot scatter files. Returns the written path.
pub fn write_to_paper_dir(paper_dir: &Path, table: PaperTable, content: &str) -> Result<Option<PathBuf>> {
    let include_dir = paper_dir.join("latex").join("include");
    if !include_dir.is_dir() {
        warn!(dir = %include_dir.display(), "paper include directory missing, not writing {table}");
        return Ok(None);
    }
    let path = include_dir.join(table.file_name());
    fs::write(&path, content).with_context(|| format!("failed to write `{}`", path.display()))?;
    info!(path = %path.display(), "table written");
    Ok(Some(path))
}
