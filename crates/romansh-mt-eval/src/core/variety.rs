use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::errors::{EvalError, ValidationError};

/// One of the six standardized written forms of Romansh.
///
/// The string form (`rm-rumgr`, `rm-sursilv`, ...) is the canonical identifier
/// used by the WMT24++ Romansh dataset configs and by every on-disk file name.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Variety {
    #[serde(rename = "rm-rumgr")]
    #[strum(serialize = "rm-rumgr")]
    RumantschGrischun,
    #[serde(rename = "rm-sursilv")]
    #[strum(serialize = "rm-sursilv")]
    Sursilvan,
    #[serde(rename = "rm-sutsilv")]
    #[strum(serialize = "rm-sutsilv")]
    Sutsilvan,
    #[serde(rename = "rm-surmiran")]
    #[strum(serialize = "rm-surmiran")]
    Surmiran,
    #[serde(rename = "rm-puter")]
    #[strum(serialize = "rm-puter")]
    Puter,
    #[serde(rename = "rm-vallader")]
    #[strum(serialize = "rm-vallader")]
    Vallader,
}

impl Variety {
    /// All varieties in presentation order.
    pub const ALL: [Variety; 6] = [
        Variety::RumantschGrischun,
        Variety::Sursilvan,
        Variety::Sutsilvan,
        Variety::Surmiran,
        Variety::Puter,
        Variety::Vallader,
    ];

    /// The standard variety that single-output systems translate into.
    pub const STANDARD: Variety = Variety::RumantschGrischun;

    /// Parses a canonical identifier such as `rm-puter`.
    pub fn parse(code: &str) -> Result<Self, EvalError> {
        code.parse::<Variety>()
            .map_err(|_| ValidationError::UnknownVariety(code.to_string()).into())
    }

    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Variety::RumantschGrischun => "Rumantsch Grischun",
            Variety::Sursilvan => "Sursilvan",
            Variety::Sutsilvan => "Sutsilvan",
            Variety::Surmiran => "Surmiran",
            Variety::Puter => "Puter",
            Variety::Vallader => "Vallader",
        }
    }

    /// Compact label for matrix headers.
    pub fn short_name(self) -> &'static str {
        match self {
            Variety::RumantschGrischun => "RG",
            Variety::Sursilvan => r"Surs.\ ",
            Variety::Sutsilvan => r"Suts.\ ",
            Variety::Surmiran => "Surm.",
            Variety::Puter => "Puter",
            Variety::Vallader => "Vall.",
        }
    }

    /// Dataset config name, e.g. `de_DE-rm-sursilv`.
    pub fn dataset_config(self) -> String {
        format!("de_DE-{}", self.code())
    }

    /// Identifier with underscores, as used in WMT test-set file names.
    pub fn wmt_code(self) -> String {
        self.code().replace('-', "_")
    }
}

/// Content genre used for stratified reporting.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Domain {
    Literary,
    News,
    Social,
    Speech,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Literary, Domain::News, Domain::Social, Domain::Speech];

    pub fn display_name(self) -> &'static str {
        match self {
            Domain::Literary => "Literary",
            Domain::News => "News",
            Domain::Social => "Social",
            Domain::Speech => "Speech",
        }
    }
}

/// Translation direction between a Romansh variety and German.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum LangPair {
    #[serde(rename = "rm-de")]
    #[strum(serialize = "rm-de")]
    RmToDe,
    #[serde(rename = "de-rm")]
    #[strum(serialize = "de-rm")]
    DeToRm,
}

impl LangPair {
    pub const ALL: [LangPair; 2] = [LangPair::RmToDe, LangPair::DeToRm];
}
