//! Readers for the on-disk outputs of each benchmarked system.
//!
//! Every loader returns one [`SystemTranslations`] per variety in
//! [`Variety::ALL`] order. Systems that only translate German into the
//! standard variety get that output copied into every variety slot, with
//! [`SystemTranslations::de_to_rm_origin`] recording the copy.

pub mod catalog;
pub mod jsonl;
pub mod lines;
pub mod spreadsheet;

pub use catalog::*;
pub use jsonl::*;
pub use lines::*;
pub use spreadsheet::*;

use anyhow::Result;
use enum_dispatch::enum_dispatch;
use std::path::Path;

use crate::core::Variety;
use crate::data::SystemTranslations;

#[enum_dispatch]
pub trait TranslationLoader {
    fn sys_name(&self) -> &str;

    /// Reads all varieties from below `systems_dir`.
    fn load(&self, systems_dir: &Path) -> Result<Vec<SystemTranslations>>;
}

#[enum_dispatch(TranslationLoader)]
#[derive(Clone, Debug)]
pub enum SystemLoader {
    Madlad(MadladLoader),
    Translaturia(TranslaturiaLoader),
    Spreadsheet(SpreadsheetLoader),
    WmtLines(WmtLinesLoader),
}

/// Builds per-variety submissions that share one German→Romansh output
/// produced for `origin`.
pub fn with_shared_de_to_rm(
    sys_name: &str,
    rm_to_de: impl IntoIterator<Item = (Variety, Vec<String>)>,
    de_to_rm: Vec<String>,
    origin: Variety,
) -> Vec<SystemTranslations> {
    rm_to_de
        .into_iter()
        .map(|(variety, rm_to_de)| {
            let mut translations =
                SystemTranslations::new(sys_name, variety, rm_to_de, de_to_rm.clone());
            translations.de_to_rm_origin = (variety != origin).then_some(origin);
            translations
        })
        .collect()
}

/// Copies one submission into every variety slot.
pub fn replicate_to_all_varieties(translations: &SystemTranslations) -> Vec<SystemTranslations> {
    Variety::ALL
        .into_iter()
        .map(|variety| translations.stand_in_for(variety))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_output_is_marked_as_stand_in_outside_origin() {
        let submissions = with_shared_de_to_rm(
            "sys",
            Variety::ALL.map(|variety| (variety, vec![variety.code().to_string()])),
            vec!["Bun di".to_string()],
            Variety::RumantschGrischun,
        );
        assert_eq!(submissions.len(), 6);
        assert!(!submissions[0].is_de_to_rm_stand_in());
        assert_eq!(submissions[0].de_to_rm_origin, None);
        for submission in &submissions[1..] {
            assert!(submission.is_de_to_rm_stand_in());
            assert_eq!(submission.translations_de_to_rm, vec!["Bun di".to_string()]);
            assert_eq!(submission.translations_rm_to_de, vec![submission.variety.code().to_string()]);
        }
    }

    #[test]
    fn replication_keeps_all_text() {
        let base = SystemTranslations::new(
            "sys",
            Variety::RumantschGrischun,
            vec![String::new()],
            vec!["Allegra".to_string()],
        )
        .skipping_bad_sources(true);
        let copies = replicate_to_all_varieties(&base);
        assert_eq!(copies.iter().map(|copy| copy.variety).collect::<Vec<_>>(), Variety::ALL);
        assert!(copies.iter().all(|copy| copy.skips_bad_sources));
        assert_eq!(copies.iter().filter(|copy| copy.is_de_to_rm_stand_in()).count(), 5);
    }
}
