use serde::{Deserialize, Serialize};

use crate::core::{Variety, postprocess_all};

/// One system's output for one variety, in both directions.
///
/// Both sequences are positionally aligned with the variety's reference rows.
/// When `skips_bad_sources` is set the system never translated the bad-source
/// rows, so the sequences are shorter by exactly that many entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemTranslations {
    pub sys_name: String,
    pub variety: Variety,
    pub translations_rm_to_de: Vec<String>,
    pub translations_de_to_rm: Vec<String>,
    #[serde(default)]
    pub skips_bad_sources: bool,
    /// Variety whose German→Romansh output was copied into this slot, when the
    /// system only produces one Romansh variety.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub de_to_rm_origin: Option<Variety>,
}

impl SystemTranslations {
    pub fn new(
        sys_name: impl Into<String>,
        variety: Variety,
        translations_rm_to_de: Vec<String>,
        translations_de_to_rm: Vec<String>,
    ) -> Self {
        Self {
            sys_name: sys_name.into(),
            variety,
            translations_rm_to_de,
            translations_de_to_rm,
            skips_bad_sources: false,
            de_to_rm_origin: None,
        }
    }

    pub fn skipping_bad_sources(mut self, skips_bad_sources: bool) -> Self {
        self.skips_bad_sources = skips_bad_sources;
        self
    }

    /// Copy of this submission filed under `variety`, keeping the German→Romansh
    /// output and recording where it came from.
    pub fn stand_in_for(&self, variety: Variety) -> Self {
        let origin = self.de_to_rm_origin.unwrap_or(self.variety);
        Self {
            variety,
            de_to_rm_origin: (origin != variety).then_some(origin),
            ..self.clone()
        }
    }

    /// `true` if the German→Romansh output targets a different variety.
    pub fn is_de_to_rm_stand_in(&self) -> bool {
        self.de_to_rm_origin
            .is_some_and(|origin| origin != self.variety)
    }

    pub fn len(&self) -> usize {
        self.translations_rm_to_de.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations_rm_to_de.is_empty()
    }

    pub(crate) fn postprocessed(self) -> Self {
        Self {
            translations_rm_to_de: postprocess_all(self.translations_rm_to_de),
            translations_de_to_rm: postprocess_all(self.translations_de_to_rm),
            ..self
        }
    }
}
