use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::Path;

use super::TranslationLoader;
use crate::core::Variety;
use crate::data::SystemTranslations;

/// One translation per line, as written by the WMT collection tooling.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    Ok(data.lines().map(str::to_string).collect())
}

/// LLM outputs collected with the WMT test-set tooling, stored under
/// `<systems_dir>/<sys_name>/`.
#[derive(Clone, Debug)]
pub struct WmtLinesLoader {
    pub sys_name: String,
}

impl WmtLinesLoader {
    pub fn new(sys_name: impl Into<String>) -> Self {
        Self {
            sys_name: sys_name.into(),
        }
    }

    pub fn rm_to_de_file(variety: Variety) -> String {
        format!(
            "wmttest2024.src.{}-de.xml.no-testsuites.{variety}",
            variety.wmt_code()
        )
    }

    pub fn de_to_rm_file(variety: Variety) -> String {
        format!("wmttest2024.src.de-{}.xml.no-testsuites.de", variety.wmt_code())
    }
}

impl TranslationLoader for WmtLinesLoader {
    fn sys_name(&self) -> &str {
        &self.sys_name
    }

    fn load(&self, systems_dir: &Path) -> Result<Vec<SystemTranslations>> {
        let dir = systems_dir.join(&self.sys_name);
        Variety::ALL
            .into_iter()
            .map(|variety| -> Result<SystemTranslations> {
                let rm_to_de = read_lines(&dir.join(Self::rm_to_de_file(variety)))?;
                let de_to_rm = read_lines(&dir.join(Self::de_to_rm_file(variety)))?;
                ensure!(
                    rm_to_de.len() == de_to_rm.len(),
                    "{} {variety}: {} rm->de lines but {} de->rm lines",
                    self.sys_name,
                    rm_to_de.len(),
                    de_to_rm.len()
                );
                Ok(SystemTranslations::new(&self.sys_name, variety, rm_to_de, de_to_rm))
            })
            .collect()
    }
}
