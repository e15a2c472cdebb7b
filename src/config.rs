use crate::settings::Settings;
use eyre::Result;
use std::{fs, path::PathBuf};

const APP_NAME: &str = "storyshelf";
const CONFIG_FILE: &str = "configuration.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    filepath: PathBuf,
}

impl Config {
    /// Loads `configuration.json` from the app data directory, writing one
    /// with default settings if none exists yet.
    pub fn new() -> Result<Self> {
        let prefix = get_app_data_prefix()?;
        let filepath = prefix.join(CONFIG_FILE);

        if filepath.exists() {
            return Self::load_from(filepath);
        }

        let config = Self {
            settings: Settings::default(),
            filepath,
        };
        config.save()?;
        Ok(config)
    }

    /// Load configuration from a custom path. A missing or malformed file
    /// yields default settings.
    pub fn load_from(filepath: PathBuf) -> Result<Self> {
        let mut settings = Settings::default();

        if filepath.exists() {
            let config_str = fs::read_to_string(&filepath)?;
            match serde_json::from_str::<serde_json::Value>(&config_str) {
                Ok(user_config) => {
                    if let Some(user_settings) = user_config.get("Setting") {
                        match serde_json::from_value::<Settings>(user_settings.clone()) {
                            Ok(user_settings) => settings.merge(user_settings),
                            Err(err) => log::warn!(
                                "Ignoring invalid settings in {}: {}",
                                filepath.display(),
                                err
                            ),
                        }
                    }
                }
                Err(err) => log::warn!("Could not parse {}: {}", filepath.display(), err),
            }
        }

        Ok(Self { settings, filepath })
    }

    pub fn with_settings(settings: Settings, filepath: PathBuf) -> Self {
        Self { settings, filepath }
    }

    pub fn filepath(&self) -> &PathBuf {
        &self.filepath
    }

    pub fn save(&self) -> Result<()> {
        let config_json = serde_json::json!({
            "Setting": self.settings,
        });
        let config_str = serde_json::to_string_pretty(&config_json)?;

        if let Some(parent) = self.filepath.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.filepath, config_str)?;
        Ok(())
    }
}

pub fn get_app_data_prefix() -> Result<PathBuf> {
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(config_home).join(APP_NAME));
    } else if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(&home).join(".config").join(APP_NAME);
        if path.exists() {
            return Ok(path);
        } else {
            return Ok(PathBuf::from(home).join(format!(".{}", APP_NAME)));
        }
    } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
        return Ok(PathBuf::from(user_profile).join(format!(".{}", APP_NAME)));
    }

    Err(eyre::eyre!("Could not determine application data directory"))
}
