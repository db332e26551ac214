use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_with::serde_as;
use serde_with::DisplayFromStr;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use crate::logging::LogFormat;

pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;
    let config: Config = serde_yaml::from_reader(file)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct IdentityConfig {
    #[serde(default = "IdentityConfig::default_resolve_names")]
    pub resolve_names: bool,
}

impl IdentityConfig {
    fn default_resolve_names() -> bool {
        true
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            resolve_names: Self::default_resolve_names(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct SearchConfig {
    #[serde(default)]
    pub report_skipped: bool,
}
