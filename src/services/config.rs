use crate::models::config::SearchTuning;
use std::fs;
use std::path::PathBuf;

/// Manager for the on-disk tuning file
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager instance
    ///
    /// This will create the config directory if it doesn't exist.
    /// Returns an error if directory creation fails.
    pub fn new() -> Result<Self, String> {
        let config_dir = dirs::config_dir()
            .ok_or("Failed to determine config directory")?
            .join("fury-cutter");

        fs::create_dir_all(&config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        let config_path = config_dir.join("tuning.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Save tuning to disk
    pub fn save(&self, tuning: &SearchTuning) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        let json = serde_json::to_string_pretty(tuning)
            .map_err(|e| format!("Failed to serialize tuning: {}", e))?;

        fs::write(&self.config_path, json)
            .map_err(|e| format!("Failed to write tuning file: {}", e))?;

        Ok(())
    }

    /// Load tuning from disk
    ///
    /// If the file doesn't exist, returns the default tuning.
    pub fn load(&self) -> Result<SearchTuning, String> {
        if !self.config_exists() {
            return Ok(SearchTuning::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| format!("Failed to read tuning file: {}", e))?;

        let tuning: SearchTuning = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse tuning file: {}", e))?;

        tuning.validate()?;
        Ok(tuning)
    }

    /// Get the tuning file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if the tuning file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_manager() -> ConfigManager {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "fury-cutter-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&temp_dir);

        ConfigManager {
            config_dir: temp_dir.clone(),
            config_path: temp_dir.join("tuning.json"),
        }
    }

    fn cleanup(manager: &ConfigManager) {
        let _ = fs::remove_dir_all(&manager.config_dir);
    }

    #[test]
    fn test_load_default_when_missing() {
        let manager = create_test_manager();
        assert!(!manager.config_exists());

        let tuning = manager.load().unwrap();
        assert_eq!(tuning, SearchTuning::default());

        cleanup(&manager);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let manager = create_test_manager();

        let mut tuning = SearchTuning::default();
        tuning.transition_jump = 480;
        tuning.early_interval = 240;

        manager.save(&tuning).unwrap();
        assert!(manager.config_exists());

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, tuning);
        assert_eq!(loaded.transition_jump, 480);

        cleanup(&manager);
    }

    #[test]
    fn test_load_rejects_invalid_tuning() {
        let manager = create_test_manager();

        let mut bad = SearchTuning::default();
        bad.transition_jump = 0;
        manager.save(&bad).unwrap();

        assert!(manager.load().is_err());

        cleanup(&manager);
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let manager = create_test_manager();

        let mut first = SearchTuning::default();
        first.normal_interval = 960;
        manager.save(&first).unwrap();

        let mut second = SearchTuning::default();
        second.normal_interval = 2880;
        manager.save(&second).unwrap();

        assert_eq!(manager.load().unwrap().normal_interval, 2880);

        cleanup(&manager);
    }

    #[test]
    fn test_config_file_path() {
        let manager = create_test_manager();
        assert!(manager
            .config_file_path()
            .to_str()
            .unwrap()
            .ends_with("tuning.json"));
        cleanup(&manager);
    }
}
