use anyhow::Result;
use romansh_mt_eval::{
    EvalSettings, ExpectedShape, PaperTable, ReferenceCorpus, init_tracing, render_dataset_stats,
    write_to_paper_dir,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let settings = EvalSettings::from_env();
    let expected = settings
        .verify_reference_shape
        .then_some(&ExpectedShape::WMT24PP_RM);
    let corpus = ReferenceCorpus::load(&settings.dataset, expected).await?;

    for (variety, dataset) in corpus.iter() {
        let summary = dataset.summary();
        println!(
            "{variety}: {} rows, {} bad sources, {} documents, {} target tokens",
            summary.rows,
            summary.bad_sources,
            summary.documents,
            summary.target.total_tokens()
        );
    }

    let latex = render_dataset_stats(&corpus)?;
    match &settings.paper_dir {
        Some(paper_dir) => {
            write_to_paper_dir(paper_dir, PaperTable::DatasetStats, &latex)?;
        }
        None => println!("{latex}"),
    }
    Ok(())
}
