use anyhow::{Context, Result};
use calamine::{Reader, open_workbook_auto};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

use super::{TranslationLoader, with_shared_de_to_rm};
use crate::core::Variety;
use crate::data::SystemTranslations;

/// Collects every non-empty cell of a spreadsheet, trimmed.
///
/// Cells are read row by row, sheet by sheet, skipping the first row of each
/// sheet as a header. Gaps are dropped, so the result only lines up with the
/// dataset if the export kept segment order. `.csv` files are read as a single
/// sheet; any other extension goes through the workbook reader.
pub fn non_empty_cells(path: &Path) -> Result<Vec<String>> {
    let is_csv = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));
    let cells = if is_csv {
        csv_cells(path)
    } else {
        workbook_cells(path)
    }
    .with_context(|| format!("failed to read spreadsheet `{}`", path.display()))?;
    debug!(cells = cells.len(), path = %path.display(), "spreadsheet cells collected");
    Ok(cells)
}

fn keep(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

fn workbook_cells(path: &Path) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)?;
    let mut cells = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet)?;
        for row in range.rows().skip(1) {
            cells.extend(row.iter().filter_map(|cell| keep(&cell.to_string())));
        }
    }
    Ok(cells)
}

fn csv_cells(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut cells = Vec::new();
    for record in reader.records() {
        cells.extend(record?.iter().filter_map(keep));
    }
    Ok(cells)
}

/// Spreadsheet exports of a commercial system, one file per Romansh variety
/// for Romansh→German and one Rumantsch Grischun file for German→Romansh.
///
/// File names are built from templates where `{variety}` is replaced by the
/// variety code. The exports leave out bad-source segments.
#[derive(Clone, Debug)]
pub struct SpreadsheetLoader {
    pub sys_name: String,
    /// Directory below the systems root.
    pub dir: String,
    pub rm_to_de_template: String,
    pub de_to_rm_file: String,
    pub skips_bad_sources: bool,
}

impl SpreadsheetLoader {
    pub fn supertext() -> Self {
        Self {
            sys_name: "supertext".to_string(),
            dir: "supertext/outputs".to_string(),
            rm_to_de_template: "output_{variety}-de-CH.xlsx".to_string(),
            de_to_rm_file: "output_rm.xlsx".to_string(),
            skips_bad_sources: true,
        }
    }

    pub fn rm_to_de_file(&self, variety: Variety) -> String {
        self.rm_to_de_template.replace("{variety}", variety.code())
    }
}

impl TranslationLoader for SpreadsheetLoader {
    fn sys_name(&self) -> &str {
        &self.sys_name
    }

    fn load(&self, systems_dir: &Path) -> Result<Vec<SystemTranslations>> {
        let dir = systems_dir.join(&self.dir);
        let rm_to_de = Variety::ALL
            .into_iter()
            .map(|variety| -> Result<_> {
                Ok((variety, non_empty_cells(&dir.join(self.rm_to_de_file(variety)))?))
            })
            .collect::<Result<Vec<_>>>()?;
        let de_to_rm = non_empty_cells(&dir.join(&self.de_to_rm_file))?;
        Ok(
            with_shared_de_to_rm(&self.sys_name, rm_to_de, de_to_rm, Variety::STANDARD)
                .into_iter()
                .map(|translations| translations.skipping_bad_sources(self.skips_bad_sources))
                .collect(),
        )
    }
}
