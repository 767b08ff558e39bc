use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

static CONFIG: OnceLock<Config> = OnceLock::new();

const APP_DIR: &str = "sp404ctl";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub presets: PresetConfig,
    pub surface: SurfaceConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Substring of the MIDI port name identifying the device.
    pub name: String,
    pub client_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            name: "SP-404MKII".into(),
            client_name: APP_DIR.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Top of the X/Y pad is 127.
    pub invert_y: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig { invert_y: true }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

pub fn default_preset_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("presets.json")
}

/// Read a config file. A missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(anyhow::anyhow!("reading {}: {e}", path.display())),
    };
    toml::from_str(&content).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}

pub fn init(config: Config) {
    CONFIG.set(config).ok();
}

fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

pub fn device_name() -> &'static str {
    &get().device.name
}

pub fn client_name() -> &'static str {
    &get().device.client_name
}

pub fn preset_path() -> PathBuf {
    get()
        .presets
        .path
        .clone()
        .unwrap_or_else(default_preset_path)
}

pub fn invert_y() -> bool {
    get().surface.invert_y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.device.name, "SP-404MKII");
        assert!(config.surface.invert_y);
        assert!(config.presets.path.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[device]\nname = \"SP-404\"\n\n[presets]\npath = \"/tmp/p.json\"\n")
            .unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.device.name, "SP-404");
        assert_eq!(config.device.client_name, "sp404ctl");
        assert_eq!(config.presets.path, Some(PathBuf::from("/tmp/p.json")));
        assert!(config.surface.invert_y);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[device\nname=").unwrap();
        assert!(load(&path).is_err());
    }
}
