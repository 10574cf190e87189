use anyhow::Result;
use romansh_mt_eval::{
    EvalSettings, Evaluation, LangPair, SystemCatalog, headline_score, init_tracing,
};

/// Usage: `cargo run --example 01-evaluate-system -- [system] [metric]`
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let sys_name = args.next().unwrap_or_else(|| "GPT-4o".to_string());
    let metric = args.next().unwrap_or_else(|| "chrf".to_string());

    let settings = EvalSettings::from_env();
    let catalog = SystemCatalog::default_catalog(&settings.systems_dir);
    let evaluation = Evaluation::from_settings(&settings).await?;

    for translations in catalog.load(&sys_name)? {
        let result = evaluation.evaluate_named(translations, &metric).await?;
        for lang_pair in LangPair::ALL {
            let scores = result.scores(lang_pair);
            let show = |score: Option<f64>| score.map_or("-".to_string(), |s| format!("{s:.1}"));
            println!(
                "{sys_name} {} {lang_pair}: headline {} (micro {}, macro {})",
                result.variety,
                show(headline_score(scores)),
                show(scores.micro_avg),
                show(scores.macro_avg()),
            );
        }
    }

    evaluation.close().await?;
    Ok(())
}
