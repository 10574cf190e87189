use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{TranslationLoader, replicate_to_all_varieties, with_shared_de_to_rm};
use crate::core::Variety;
use crate::data::SystemTranslations;

#[derive(Deserialize)]
struct TranslationRecord {
    target: String,
}

/// Reads the `target` field of every record in a JSON-lines file.
pub fn read_jsonl_targets(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let targets = data
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<TranslationRecord>(line)
                .map(|record| record.target)
                .with_context(|| format!("malformed record on line {} of `{}`", idx + 1, path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(records = targets.len(), path = %path.display(), "translations read");
    Ok(targets)
}

/// How the MADLAD-400 outputs were produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MadladMode {
    Direct,
    /// Translated into English first.
    PivotEn,
}

/// MADLAD-400 10B outputs under `madlad/translations/`.
///
/// German→Romansh exists only for Rumantsch Grischun.
#[derive(Clone, Debug)]
pub struct MadladLoader {
    pub mode: MadladMode,
}

impl MadladLoader {
    pub fn new(mode: MadladMode) -> Self {
        Self { mode }
    }

    fn rm_to_de_file(&self, variety: Variety) -> String {
        match self.mode {
            MadladMode::Direct => format!("madlad400-10b-mt-direct-{variety}-to-de.jsonl"),
            MadladMode::PivotEn => format!("madlad400-10b-mt-{variety}-pivot-en-to-de.jsonl"),
        }
    }

    fn de_to_rm_file(&self) -> &'static str {
        match self.mode {
            MadladMode::Direct => "madlad400-10b-mt-direct-de-to-rm.jsonl",
            MadladMode::PivotEn => "madlad400-10b-mt-pivot-en-to-rm.jsonl",
        }
    }
}

impl TranslationLoader for MadladLoader {
    fn sys_name(&self) -> &str {
        match self.mode {
            MadladMode::Direct => "madlad400-10b-mt_direct",
            MadladMode::PivotEn => "madlad400-10b-mt_pivot_en",
        }
    }

    fn load(&self, systems_dir: &Path) -> Result<Vec<SystemTranslations>> {
        let dir = systems_dir.join("madlad").join("translations");
        let rm_to_de = Variety::ALL
            .into_iter()
            .map(|variety| -> Result<_> {
                Ok((variety, read_jsonl_targets(&dir.join(self.rm_to_de_file(variety)))?))
            })
            .collect::<Result<Vec<_>>>()?;
        let de_to_rm = read_jsonl_targets(&dir.join(self.de_to_rm_file()))?;
        Ok(with_shared_de_to_rm(
            self.sys_name(),
            rm_to_de,
            de_to_rm,
            Variety::STANDARD,
        ))
    }
}

/// Translatur-ia outputs, German→Rumantsch Grischun only.
///
/// The Romansh→German side is filled with empty strings, which every metric
/// scores as 0.
#[derive(Clone, Debug, Default)]
pub struct TranslaturiaLoader;

impl TranslaturiaLoader {
    pub fn path(systems_dir: &Path) -> PathBuf {
        systems_dir
            .join("translaturia")
            .join("translations")
            .join(format!("{}.jsonl", Variety::STANDARD.dataset_config()))
    }
}

impl TranslationLoader for TranslaturiaLoader {
    fn sys_name(&self) -> &str {
        "translaturia"
    }

    fn load(&self, systems_dir: &Path) -> Result<Vec<SystemTranslations>> {
        let de_to_rm = read_jsonl_targets(&Self::path(systems_dir))?;
        let standard = SystemTranslations::new(
            self.sys_name(),
            Variety::STANDARD,
            vec![String::new(); de_to_rm.len()],
            de_to_rm,
        );
        Ok(replicate_to_all_varieties(&standard))
    }
}
