use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuildConfig {
    /// The build script, relative paths are resolved against the checkout.
    #[serde(default = "BuildConfig::default_script")]
    pub script: String,

    /// The file the build script leaves in the checkout.
    #[serde(default = "BuildConfig::default_artifact")]
    pub artifact: String,

    /// Download names are `<download_prefix>-<revision>.<download_ext>`.
    #[serde(default = "BuildConfig::default_download_prefix")]
    pub download_prefix: String,

    #[serde(default = "BuildConfig::default_download_ext")]
    pub download_ext: String,

    /// Stripped from tag names for display and download names.
    #[serde(default = "BuildConfig::default_tag_prefixes")]
    pub tag_prefixes: Vec<String>,
}

impl CommonConfig for BuildConfig {
    fn default() -> Self {
        Self {
            script: Self::default_script(),
            artifact: Self::default_artifact(),
            download_prefix: Self::default_download_prefix(),
            download_ext: Self::default_download_ext(),
            tag_prefixes: Self::default_tag_prefixes(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.script = expandenv("script", &self.script)?;
        if self.script.is_empty() {
            bail!("script cannot be empty");
        }

        if self.artifact.is_empty() {
            bail!("artifact cannot be empty");
        }
        if self.download_prefix.is_empty() {
            bail!("download_prefix cannot be empty");
        }
        if self.download_ext.is_empty() {
            bail!("download_ext cannot be empty");
        }

        self.tag_prefixes.retain(|p| !p.is_empty());

        Ok(())
    }
}

impl BuildConfig {
    pub fn default_script() -> String {
        String::from("./build_client_egg.sh")
    }

    pub fn default_artifact() -> String {
        String::from("insights.zip")
    }

    pub fn default_download_prefix() -> String {
        String::from("insights-core")
    }

    pub fn default_download_ext() -> String {
        String::from("egg")
    }

    pub fn default_tag_prefixes() -> Vec<String> {
        vec![String::from("insights-core-"), String::from("falafel-")]
    }
}
