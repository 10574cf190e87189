use romansh_mt_eval::{
    MadladLoader, MadladMode, SpreadsheetLoader, SystemCatalog, SystemEntry, SystemGroup,
    TranslationLoader, TranslaturiaLoader, Variety, WmtLinesLoader,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_jsonl(path: &Path, targets: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let lines = targets
        .iter()
        .map(|target| serde_json::json!({ "source": "src", "target": target }).to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(path, lines).unwrap();
}

fn write_madlad(systems_dir: &Path) {
    let dir = systems_dir.join("madlad").join("translations");
    for variety in Variety::ALL {
        write_jsonl(
            &dir.join(format!("madlad400-10b-mt-direct-{variety}-to-de.jsonl")),
            &[variety.code(), "Hallo"],
        );
    }
    write_jsonl(&dir.join("madlad400-10b-mt-direct-de-to-rm.jsonl"), &["Allegra", "Bun di"]);
}

fn write_wmt_lines(systems_dir: &Path, sys_name: &str) {
    let dir = systems_dir.join(sys_name);
    fs::create_dir_all(&dir).unwrap();
    for variety in Variety::ALL {
        fs::write(dir.join(WmtLinesLoader::rm_to_de_file(variety)), "Guten Tag\nDanke\n").unwrap();
        fs::write(
            dir.join(WmtLinesLoader::de_to_rm_file(variety)),
            format!("Bun di {variety}\nGrazia\n"),
        )
        .unwrap();
    }
}

#[test]
fn madlad_shares_the_standard_output() {
    let root = tempdir().unwrap();
    write_madlad(root.path());

    let submissions = MadladLoader::new(MadladMode::Direct).load(root.path()).unwrap();
    assert_eq!(submissions.len(), 6);
    for (submission, variety) in submissions.iter().zip(Variety::ALL) {
        assert_eq!(submission.sys_name, "madlad400-10b-mt_direct");
        assert_eq!(submission.variety, variety);
        assert_eq!(submission.translations_rm_to_de, vec![variety.code(), "Hallo"]);
        assert_eq!(submission.translations_de_to_rm, vec!["Allegra", "Bun di"]);
        assert_eq!(submission.is_de_to_rm_stand_in(), variety != Variety::STANDARD);
        assert!(!submission.skips_bad_sources);
    }
}

#[test]
fn madlad_missing_variety_file_fails() {
    let root = tempdir().unwrap();
    write_madlad(root.path());
    let err = MadladLoader::new(MadladMode::PivotEn).load(root.path()).unwrap_err();
    assert!(format!("{err:#}").contains("pivot-en"));
}

#[test]
fn translaturia_scores_empty_romansh_to_german() {
    let root = tempdir().unwrap();
    write_jsonl(&TranslaturiaLoader::path(root.path()), &["Allegra", "Grazia fitg", "Adia"]);

    let submissions = TranslaturiaLoader.load(root.path()).unwrap();
    assert_eq!(submissions.len(), 6);
    for submission in &submissions {
        assert_eq!(submission.sys_name, "translaturia");
        assert_eq!(submission.translations_rm_to_de, vec![""; 3]);
        assert_eq!(submission.translations_de_to_rm.len(), 3);
    }
    assert_eq!(
        submissions.iter().filter(|submission| submission.is_de_to_rm_stand_in()).count(),
        5
    );
}

#[test]
fn wmt_lines_keep_per_variety_outputs() {
    let root = tempdir().unwrap();
    write_wmt_lines(root.path(), "GPT-4o");

    let submissions = WmtLinesLoader::new("GPT-4o").load(root.path()).unwrap();
    assert_eq!(submissions.len(), 6);
    let puter = submissions
        .iter()
        .find(|submission| submission.variety == Variety::Puter)
        .unwrap();
    assert_eq!(puter.translations_de_to_rm, vec!["Bun di rm-puter", "Grazia"]);
    assert!(submissions.iter().all(|submission| !submission.is_de_to_rm_stand_in()));
}

#[test]
fn wmt_lines_reject_uneven_directions() {
    let root = tempdir().unwrap();
    write_wmt_lines(root.path(), "GPT-4o");
    fs::write(
        root.path()
            .join("GPT-4o")
            .join(WmtLinesLoader::de_to_rm_file(Variety::Surmiran)),
        "nur eine Zeile\n",
    )
    .unwrap();

    let err = WmtLinesLoader::new("GPT-4o").load(root.path()).unwrap_err();
    assert!(err.to_string().contains("rm-surmiran"));
}

#[test]
fn csv_exports_skip_bad_sources() {
    let root = tempdir().unwrap();
    let dir = root.path().join("exports");
    fs::create_dir_all(&dir).unwrap();
    for variety in Variety::ALL {
        fs::write(dir.join(format!("{variety}.csv")), "Target\nHallo\n\nWelt\n").unwrap();
    }
    fs::write(dir.join("rm.csv"), "Target\nAllegra\nMunds\n").unwrap();

    let loader = SpreadsheetLoader {
        sys_name: "export".to_string(),
        dir: "exports".to_string(),
        rm_to_de_template: "{variety}.csv".to_string(),
        de_to_rm_file: "rm.csv".to_string(),
        skips_bad_sources: true,
    };
    let submissions = loader.load(root.path()).unwrap();
    assert_eq!(submissions.len(), 6);
    assert!(submissions.iter().all(|submission| submission.skips_bad_sources));
    assert_eq!(submissions[3].translations_rm_to_de, vec!["Hallo", "Welt"]);
    assert_eq!(submissions[3].translations_de_to_rm, vec!["Allegra", "Munds"]);
    assert_eq!(submissions[3].de_to_rm_origin, Some(Variety::STANDARD));
}

#[test]
fn catalog_loads_entries_in_order() {
    let root = tempdir().unwrap();
    write_madlad(root.path());
    write_wmt_lines(root.path(), "Gemini-2.5-Flash");

    let catalog = SystemCatalog::new(
        root.path(),
        vec![
            SystemEntry::new(WmtLinesLoader::new("Gemini-2.5-Flash"), "Gemini", SystemGroup::Llm),
            SystemEntry::new(MadladLoader::new(MadladMode::Direct), "direct", SystemGroup::Madlad),
        ],
    );
    let all = catalog.load_all().unwrap();
    assert_eq!(all.len(), 12);
    assert_eq!(all[0].sys_name, "Gemini-2.5-Flash");
    assert_eq!(all[6].sys_name, "madlad400-10b-mt_direct");
    assert_eq!(catalog.load("Gemini-2.5-Flash").unwrap().len(), 6);
}

#[test]
fn catalog_names_the_failing_system() {
    let root = tempdir().unwrap();
    let catalog = SystemCatalog::default_catalog(root.path());
    let err = catalog.load_all().unwrap_err();
    assert!(err.to_string().contains("madlad400-10b-mt_direct"));
}
