use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{
    MadladLoader, MadladMode, SpreadsheetLoader, SystemLoader, TranslationLoader,
    TranslaturiaLoader, WmtLinesLoader,
};
use crate::data::SystemTranslations;

/// Row groups of the results tables, separated by a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemGroup {
    /// Open multilingual translation model, shown under a shared heading.
    Madlad,
    /// Dedicated commercial or public Romansh translators.
    Dedicated,
    Llm,
}

impl SystemGroup {
    /// LaTeX heading row printed above the group, if any.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            SystemGroup::Madlad => Some(r"\mbox{MADLAD-400 (10.7B)}"),
            SystemGroup::Dedicated | SystemGroup::Llm => None,
        }
    }
}

/// One benchmarked system.
#[derive(Clone, Debug)]
pub struct SystemEntry {
    pub loader: SystemLoader,
    /// LaTeX row label.
    pub label: String,
    pub group: SystemGroup,
    /// `false` for systems that only translate German→Romansh.
    pub translates_rm_to_de: bool,
}

impl SystemEntry {
    pub fn new(loader: impl Into<SystemLoader>, label: &str, group: SystemGroup) -> Self {
        Self {
            loader: loader.into(),
            label: label.to_string(),
            group,
            translates_rm_to_de: true,
        }
    }

    pub fn name(&self) -> &str {
        self.loader.sys_name()
    }
}

/// Benchmarked systems in presentation order, with the root they load from.
#[derive(Clone, Debug)]
pub struct SystemCatalog {
    systems_dir: PathBuf,
    entries: Vec<SystemEntry>,
}

impl SystemCatalog {
    pub fn new(systems_dir: impl Into<PathBuf>, entries: Vec<SystemEntry>) -> Self {
        Self {
            systems_dir: systems_dir.into(),
            entries,
        }
    }

    /// The seven systems of the WMT24++ Romansh benchmark.
    pub fn default_catalog(systems_dir: impl Into<PathBuf>) -> Self {
        let entries = vec![
            SystemEntry::new(
                MadladLoader::new(MadladMode::Direct),
                r"\mbox{– direct}",
                SystemGroup::Madlad,
            ),
            SystemEntry::new(
                MadladLoader::new(MadladMode::PivotEn),
                r"\mbox{– pivoting via English}",
                SystemGroup::Madlad,
            ),
            SystemEntry {
                translates_rm_to_de: false,
                ..SystemEntry::new(TranslaturiaLoader, r"\mbox{Translatur-ia}", SystemGroup::Dedicated)
            },
            SystemEntry::new(SpreadsheetLoader::supertext(), "Supertext", SystemGroup::Dedicated),
            SystemEntry::new(
                WmtLinesLoader::new("Llama-3.3-70b"),
                r"\mbox{Llama 3.3 (70B)}",
                SystemGroup::Llm,
            ),
            SystemEntry::new(WmtLinesLoader::new("GPT-4o"), "GPT-4o", SystemGroup::Llm),
            SystemEntry::new(
                WmtLinesLoader::new("Gemini-2.5-Flash"),
                r"\mbox{Gemini 2.5 Flash}",
                SystemGroup::Llm,
            ),
        ];
        Self::new(systems_dir, entries)
    }

    pub fn systems_dir(&self) -> &Path {
        &self.systems_dir
    }

    pub fn entries(&self) -> &[SystemEntry] {
        &self.entries
    }

    pub fn get(&self, sys_name: &str) -> Option<&SystemEntry> {
        self.entries.iter().find(|entry| entry.name() == sys_name)
    }

    /// Loads one system's submissions for all varieties.
    pub fn load(&self, sys_name: &str) -> Result<Vec<SystemTranslations>> {
        let entry = self
            .get(sys_name)
            .with_context(|| format!("system `{sys_name}` is not in the catalog"))?;
        entry
            .loader
            .load(&self.systems_dir)
            .with_context(|| format!("failed to load translations of `{sys_name}`"))
    }

    /// Loads every system in catalog order.
    #[tracing::instrument(name = "rmeval.catalog.load_all", level = "info", skip(self), fields(dir = %self.systems_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<SystemTranslations>> {
        let mut all = Vec::new();
        for entry in &self.entries {
            let submissions = self.load(entry.name())?;
            info!(sys_name = entry.name(), varieties = submissions.len(), "system translations loaded");
            all.extend(submissions);
        }
        Ok(all)
    }
}
