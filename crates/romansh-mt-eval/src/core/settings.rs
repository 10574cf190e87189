use bon::Builder;
use std::path::PathBuf;

use crate::data::DatasetSource;

pub const DEFAULT_CACHE_DIR: &str = ".comet_client_cache";
pub const DEFAULT_QE_MODEL: &str = "Unbabel/XCOMET-XL";
pub const DEFAULT_SYSTEMS_DIR: &str = "systems";

/// Process-level configuration for an evaluation run.
///
/// Build explicitly with [`EvalSettings::builder`] or pick up the environment
/// with [`EvalSettings::from_env`].
#[derive(Clone, Debug, Builder)]
pub struct EvalSettings {
    /// Where the reference corpus is read from.
    #[builder(default)]
    pub dataset: DatasetSource,
    /// Directory of the persistent quality-estimation score cache.
    #[builder(default = PathBuf::from(DEFAULT_CACHE_DIR), into)]
    pub cache_dir: PathBuf,
    /// Model identifier sent to the quality-estimation backend and used in cache keys.
    #[builder(default = DEFAULT_QE_MODEL.to_string(), into)]
    pub qe_model: String,
    /// Base URL of the quality-estimation inference service. `None` runs offline.
    #[builder(into)]
    pub qe_api_url: Option<String>,
    /// Root directory holding per-system translation outputs.
    #[builder(default = PathBuf::from(DEFAULT_SYSTEMS_DIR), into)]
    pub systems_dir: PathBuf,
    /// Paper checkout receiving rendered tables under `latex/include/`.
    #[builder(into)]
    pub paper_dir: Option<PathBuf>,
    /// Reject reference sets that do not match the published WMT24++ shape.
    #[builder(default = true)]
    pub verify_reference_shape: bool,
    /// Show a progress bar while scoring segments with the QE backend.
    #[builder(default = false)]
    pub show_progress: bool,
}

impl Default for EvalSettings {
    fn default() -> Self {
        EvalSettings::builder().build()
    }
}

impl EvalSettings {
    /// Defaults overlaid with `RMEVAL_DATASET_DIR`, `RMEVAL_CACHE_DIR`,
    /// `RMEVAL_SYSTEMS_DIR`, `COMET_API_URL` and `PAPER_DIR`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(dir) = env_var("RMEVAL_DATASET_DIR") {
            settings.dataset = DatasetSource::Local(dir.into());
        }
        if let Some(dir) = env_var("RMEVAL_CACHE_DIR") {
            settings.cache_dir = dir.into();
        }
        if let Some(dir) = env_var("RMEVAL_SYSTEMS_DIR") {
            settings.systems_dir = dir.into();
        }
        settings.qe_api_url = env_var("COMET_API_URL");
        settings.paper_dir = env_var("PAPER_DIR").map(PathBuf::from);
        settings
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
