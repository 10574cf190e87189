use anyhow::Result;
use romansh_mt_eval::{
    EvalSettings, Evaluation, LangPair, MetricKind, PaperTable, SystemCatalog, init_tracing,
    render_domain_tables, render_table, variety_table, write_json, write_results,
    write_to_paper_dir,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let settings = EvalSettings::from_env();
    let catalog = SystemCatalog::default_catalog(&settings.systems_dir);
    let evaluation = Evaluation::from_settings(&settings).await?;
    let submissions = catalog.load_all()?;

    let chrf = evaluation
        .evaluate_all(submissions.clone(), MetricKind::Chrf)
        .await?;
    let xcomet = evaluation
        .evaluate_all(submissions, MetricKind::XCometXl)
        .await?;
    evaluation.close().await?;

    write_results(&chrf, Path::new("results_chrf.json"))?;
    write_results(&xcomet, Path::new("results_xcomet.json"))?;
    write_json(&chrf, Path::new("scores_chrf.json"))?;

    let tables = [
        (
            PaperTable::ResultsRmToDe,
            render_table(&variety_table(&catalog, LangPair::RmToDe, &[&chrf, &xcomet]))?,
        ),
        (
            PaperTable::ResultsDeToRm,
            render_table(&variety_table(&catalog, LangPair::DeToRm, &[&chrf]))?,
        ),
        (
            PaperTable::ResultsRmToDeDetailed,
            render_domain_tables(&catalog, LangPair::RmToDe, &[&chrf, &xcomet])?,
        ),
        (
            PaperTable::ResultsDeToRmDetailed,
            render_domain_tables(&catalog, LangPair::DeToRm, &[&chrf])?,
        ),
    ];

    for (table, latex) in tables {
        match &settings.paper_dir {
            Some(paper_dir) => {
                write_to_paper_dir(paper_dir, table, &latex)?;
            }
            None => println!("% {}\n{latex}\n", table.file_name()),
        }
    }
    Ok(())
}
