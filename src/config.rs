use std::path::PathBuf;
use std::{env, fs, io};

use anyhow::{Context, Result};
use clap::Args;
use log::warn;
use serde::de::DeserializeOwned;

use crate::dirs::{self, ensure_dir_exists};

/// Config and data directories. Resolution order for each one: command line,
/// environment, then a default that depends on whether we run as root.
pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// The config directory, default is `~/.config/egg-hatcher`, or
    /// `/etc/egg-hatcher` when running as root.
    #[arg(long, short)]
    pub config_path: Option<String>,

    /// The data directory, default is `~/.local/share/egg-hatcher`, or
    /// `/var/lib/egg-hatcher` when running as root.
    #[arg(long, short)]
    pub data_path: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(
            self.config_path.as_ref().map(PathBuf::from),
            self.data_path.as_ref().map(PathBuf::from),
        )
    }
}

impl PathSet {
    const CONFIG_ENV: &'static str = "EGG_HATCHER_CONFIG";
    const DATA_ENV: &'static str = "EGG_HATCHER_DATA";

    pub fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        let is_root = dirs::is_root();

        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var(Self::CONFIG_ENV) {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/etc/egg-hatcher")
        } else {
            dirs::home_dir()?.join(".config").join("egg-hatcher")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var(Self::DATA_ENV) {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/var/lib/egg-hatcher")
        } else {
            dirs::home_dir()?
                .join(".local")
                .join("share")
                .join("egg-hatcher")
        };

        ensure_dir_exists(&config_path)
            .with_context(|| format!("ensure config directory: {}", config_path.display()))?;
        ensure_dir_exists(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;

        Ok(Self {
            config_path,
            data_path,
        })
    }

    /// Load `<config_path>/<name>.toml`. A missing file is not an error, the
    /// defaults are used instead. The result is always completed.
    pub fn load_config<T, F>(&self, name: &str, default_func: F) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.config_path.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("parse config toml: {}", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file for {name} not found, using defaults");
                default_func()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}
