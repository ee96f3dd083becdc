use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

use super::{Config, API_KEY_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

const HEADER: &str = "# serial-weather config\n";

/// Load the per-user config, writing a default file on first run.
pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        save_to_path(&cfg, &path)?;
        log::info!("wrote default config to {}", path.display());
        return finish(cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return finish(Config::default());
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("cannot serialise config: {e}")))?;
    fs::write(path, format!("{HEADER}{body}"))?;
    Ok(())
}

pub fn parse(raw: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
    finish(cfg)
}

pub fn config_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| Error::InvalidArgs("HOME not set; cannot locate config directory".into()))?;
    Ok(dirs.home_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn finish(mut cfg: Config) -> Result<Config> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            cfg.api_key = key;
        }
    }
    super::validate(&cfg)?;
    Ok(cfg)
}
