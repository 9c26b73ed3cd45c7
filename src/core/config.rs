/*
 * Application settings that outlive a session. Today that is the last workspace the
 * user opened, which the desktop host offers again on the next start.
 *
 * `ConfigManagerOperations` abstracts the storage so the router can be tested with
 * a mock; `CoreConfigManager` keeps the value in a text file inside the platform's
 * local configuration directory (see `path_utils`).
 */
use crate::core::path_utils;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "VeritNote";
const LAST_WORKSPACE_PATH_FILENAME: &str = "last_workspace_path.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    NoProjectDirectory,
    Utf8Error(std::string::FromUtf8Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for ConfigError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ConfigError::Utf8Error(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine the application configuration directory")
            }
            ConfigError::Utf8Error(e) => write!(f, "Configuration file UTF-8 error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Utf8Error(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_last_workspace_path(&self, app_name: &str) -> Result<Option<String>>;
    fn save_last_workspace_path(&self, app_name: &str, workspace: Option<&str>) -> Result<()>;
}

/*
 * File-backed settings. `config_dir_override` pins the directory instead of asking
 * `directories`; the Android host uses it with the activity's files directory.
 */
pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    pub fn with_config_dir(dir: &Path) -> Self {
        CoreConfigManager {
            config_dir_override: Some(dir.to_path_buf()),
        }
    }

    fn settings_file(&self, app_name: &str) -> Result<PathBuf> {
        let config_dir = match &self.config_dir_override {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => path_utils::get_base_app_config_local_dir(app_name)
                .ok_or(ConfigError::NoProjectDirectory)?,
        };
        Ok(config_dir.join(LAST_WORKSPACE_PATH_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * Reads the stored workspace identifier. A missing or blank file means nothing
     * has been stored yet and is reported as `Ok(None)`.
     */
    fn load_last_workspace_path(&self, app_name: &str) -> Result<Option<String>> {
        log::trace!("CoreConfigManager: Loading last workspace path for app '{app_name}'");
        let file_path = self.settings_file(app_name)?;

        if !file_path.exists() {
            log::debug!("CoreConfigManager: Last workspace file {file_path:?} does not exist.");
            return Ok(None);
        }

        let mut file = File::open(&file_path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let contents = String::from_utf8(bytes)?;

        let workspace = contents.trim();
        if workspace.is_empty() {
            log::debug!("CoreConfigManager: Last workspace file {file_path:?} is empty.");
            Ok(None)
        } else {
            log::debug!(
                "CoreConfigManager: Loaded last workspace '{workspace}' from {file_path:?}."
            );
            Ok(Some(workspace.to_string()))
        }
    }

    // Passing `None` clears the stored value.
    fn save_last_workspace_path(&self, app_name: &str, workspace: Option<&str>) -> Result<()> {
        log::trace!(
            "CoreConfigManager: Saving last workspace '{:?}' for app '{app_name}'",
            workspace
        );
        let file_path = self.settings_file(app_name)?;

        let mut file = File::create(&file_path)?;
        file.write_all(workspace.unwrap_or_default().as_bytes())?;
        log::debug!(
            "CoreConfigManager: Saved last workspace '{:?}' to {file_path:?}.",
            workspace
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_core_config_manager_save_and_load_with_default_dir() {
        // Arrange
        let unique_app_name = format!("TestApp_VeritConfig_{}", rand::random::<u64>());
        let manager = CoreConfigManager::new();
        let workspace = format!("/tmp/{unique_app_name}/workspace");

        // Act & Assert Save
        assert!(
            manager
                .save_last_workspace_path(&unique_app_name, Some(&workspace))
                .is_ok(),
            "Saving last workspace path should succeed."
        );

        // Act & Assert Load
        match manager.load_last_workspace_path(&unique_app_name) {
            Ok(Some(loaded)) => assert_eq!(loaded, workspace),
            Ok(None) => panic!("Expected to load a workspace path, but got None."),
            Err(e) => panic!("Failed to load workspace path: {e:?}"),
        }

        // Cleanup the test app's config directory
        if let Some(config_local_dir) = path_utils::get_base_app_config_local_dir(&unique_app_name)
        {
            if let Err(e) = fs::remove_dir_all(&config_local_dir) {
                eprintln!("Test cleanup failed for config_local_dir {config_local_dir:?}: {e}");
            }
        }
    }

    #[test]
    fn test_load_without_file_returns_none() {
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_config_dir(dir.path());

        match manager.load_last_workspace_path("AnyApp") {
            Ok(None) => {}
            Ok(Some(p)) => panic!("Expected None when file doesn't exist, got {p}"),
            Err(e) => panic!("Unexpected error when file doesn't exist: {e:?}"),
        }
    }

    #[test]
    fn test_load_blank_file_returns_none() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LAST_WORKSPACE_PATH_FILENAME), "  \n").unwrap();
        let manager = CoreConfigManager::with_config_dir(dir.path());

        assert!(manager.load_last_workspace_path("AnyApp").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_and_clears() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_config_dir(dir.path());

        // Act & Assert
        manager
            .save_last_workspace_path("AnyApp", Some("content://tree/one"))
            .unwrap();
        manager
            .save_last_workspace_path("AnyApp", Some("content://tree/two"))
            .unwrap();
        assert_eq!(
            manager.load_last_workspace_path("AnyApp").unwrap().as_deref(),
            Some("content://tree/two")
        );

        manager.save_last_workspace_path("AnyApp", None).unwrap();
        assert!(manager.load_last_workspace_path("AnyApp").unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LAST_WORKSPACE_PATH_FILENAME), [0xff, 0xfe, 0x00]).unwrap();
        let manager = CoreConfigManager::with_config_dir(dir.path());

        assert!(matches!(
            manager.load_last_workspace_path("AnyApp"),
            Err(ConfigError::Utf8Error(_))
        ));
    }
}
