use crate::layout::DASHBOARD_TITLE;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/NBC_KPI_Data.csv";

/// Front-end settings. The engine itself takes none of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
    pub page_size: usize,
    pub histogram_bins: usize,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            export_dir: PathBuf::from("."),
            page_size: 10,
            histogram_bins: 20,
            title: DASHBOARD_TITLE.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then `NBC_DATA_PATH` / `NBC_EXPORT_DIR`, then the first
    /// positional argument as the data path.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var("NBC_DATA_PATH").ok(),
            std::env::var("NBC_EXPORT_DIR").ok(),
            std::env::args().nth(1),
        )
    }

    fn resolve(
        env_data: Option<String>,
        env_export: Option<String>,
        arg_data: Option<String>,
    ) -> Self {
        let mut cfg = Self::default();
        if let Some(p) = env_data.filter(|s| !s.trim().is_empty()) {
            cfg.data_path = PathBuf::from(p);
        }
        if let Some(p) = env_export.filter(|s| !s.trim().is_empty()) {
            cfg.export_dir = PathBuf::from(p);
        }
        if let Some(p) = arg_data {
            cfg.data_path = PathBuf::from(p);
        }
        cfg
    }
}
