use anyhow::Result;
use romansh_mt_eval::{
    CrossVarietyMatrix, EvalSettings, PaperTable, ReferenceCorpus, Variety, init_tracing,
    render_cross_variety, write_to_paper_dir,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let settings = EvalSettings::from_env();
    let corpus = ReferenceCorpus::load(&settings.dataset, None).await?;
    let matrix = CrossVarietyMatrix::compute(&corpus);

    for sys_variety in Variety::ALL {
        let row = Variety::ALL
            .iter()
            .map(|ref_variety| {
                matrix
                    .get(sys_variety, *ref_variety)
                    .map_or("  -  ".to_string(), |score| format!("{score:5.1}"))
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<12} {row}", sys_variety.code());
    }

    let latex = render_cross_variety(&matrix)?;
    if let Some(paper_dir) = &settings.paper_dir {
        write_to_paper_dir(paper_dir, PaperTable::CrossVarietyScores, &latex)?;
    }
    Ok(())
}
