use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "quill")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("quill_config.json"))
    }

    /// Default destination for exported attempt logs
    pub fn export_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "quill").map(|pd| pd.data_local_dir().join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_json() {
        assert_eq!(
            AppDirs::config_path().extension().and_then(|e| e.to_str()),
            Some("json")
        );
    }
}
