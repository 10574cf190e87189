use crate::core::LangPair;
use crate::data::{DatasetRow, ReferenceDataset, SystemTranslations};

/// A scorable reference row joined with the system's two outputs for it.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedRow<'a> {
    pub row: &'a DatasetRow,
    pub rm_to_de: String,
    pub de_to_rm: String,
}

impl AlignedRow<'_> {
    pub fn hypothesis(&self, lang_pair: LangPair) -> &str {
        match lang_pair {
            LangPair::RmToDe => &self.rm_to_de,
            LangPair::DeToRm => &self.de_to_rm,
        }
    }

    /// German references the `source` field, Romansh the `target` field.
    pub fn reference(&self, lang_pair: LangPair) -> &str {
        match lang_pair {
            LangPair::RmToDe => &self.row.source,
            LangPair::DeToRm => &self.row.target,
        }
    }
}

/// Joins translations with reference rows by position, dropping bad sources.
///
/// A submission that skips bad sources only lines up with the remaining rows,
/// so those are filtered before zipping. A full-length submission is zipped
/// against every row first and its bad-source entries are dropped afterwards.
/// Lengths must already be validated.
pub fn align(dataset: &ReferenceDataset, translations: SystemTranslations) -> Vec<AlignedRow<'_>> {
    let outputs = translations
        .translations_rm_to_de
        .into_iter()
        .zip(translations.translations_de_to_rm);

    let joined: Box<dyn Iterator<Item = (&DatasetRow, (String, String))> + '_> =
        if translations.skips_bad_sources {
            Box::new(dataset.scorable_rows().zip(outputs))
        } else {
            Box::new(
                dataset
                    .rows()
                    .iter()
                    .zip(outputs)
                    .filter(|(row, _)| !row.is_bad_source),
            )
        };

    joined
        .map(|(row, (rm_to_de, de_to_rm))| AlignedRow {
            row,
            rm_to_de,
            de_to_rm,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Domain, Variety};

    fn dataset() -> ReferenceDataset {
        let rows = (0..5)
            .map(|idx| DatasetRow {
                lp: "de_DE-rm-rumgr".to_string(),
                domain: Some(Domain::News),
                document_id: "doc".to_string(),
                segment_id: idx,
                is_bad_source: idx == 1,
                source: format!("de {idx}"),
                target: format!("rm {idx}"),
                comment: None,
            })
            .collect();
        ReferenceDataset::from_rows(Variety::RumantschGrischun, rows)
    }

    fn outputs(ids: &[i64]) -> Vec<String> {
        ids.iter().map(|idx| format!("out {idx}")).collect()
    }

    #[test]
    fn full_length_submission_drops_bad_rows_after_zipping() {
        let dataset = dataset();
        let translations = SystemTranslations::new(
            "sys",
            Variety::RumantschGrischun,
            outputs(&[0, 1, 2, 3, 4]),
            outputs(&[0, 1, 2, 3, 4]),
        );
        let aligned = align(&dataset, translations);
        let pairs = aligned
            .iter()
            .map(|row| (row.row.segment_id, row.rm_to_de.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0, "out 0"), (2, "out 2"), (3, "out 3"), (4, "out 4")]);
    }

    #[test]
    fn skipping_submission_aligns_with_remaining_rows() {
        let dataset = dataset();
        let translations = SystemTranslations::new(
            "sys",
            Variety::RumantschGrischun,
            outputs(&[0, 2, 3, 4]),
            outputs(&[0, 2, 3, 4]),
        )
        .skipping_bad_sources(true);
        let aligned = align(&dataset, translations);
        for row in &aligned {
            assert_eq!(row.de_to_rm, format!("out {}", row.row.segment_id));
            assert_eq!(row.reference(LangPair::DeToRm), format!("rm {}", row.row.segment_id));
            assert_eq!(row.reference(LangPair::RmToDe), format!("de {}", row.row.segment_id));
        }
        assert_eq!(aligned.len(), 4);
    }
}
