use serde::{Deserialize, Serialize};

/// Installer configuration from `NML Installer.yaml`
///
/// Remembers the selected game directory and user preferences between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    #[serde(rename = "NML_Settings")]
    pub settings: NmlSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NmlSettings {
    #[serde(rename = "Game Directory", default)]
    pub game_dir: String,

    #[serde(rename = "Update Check", default = "default_update_check")]
    pub update_check: bool,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Last Installed Tag", default)]
    pub last_installed_tag: String,
}

impl Default for NmlSettings {
    fn default() -> Self {
        Self {
            game_dir: String::new(),
            update_check: true,
            debug_mode: false,
            last_installed_tag: String::new(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            settings: NmlSettings::default(),
        }
    }
}

fn default_update_check() -> bool {
    true
}
