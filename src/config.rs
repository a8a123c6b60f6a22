use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use strum_macros::{Display, EnumString};

/// Flavor of the hosting runtime used to run the managed extension side.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Display, EnumString, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostRuntimeFlavor {
    /// Never bring up a hosting runtime; the session stays on the fallback
    /// host.
    #[strum(serialize = "none")]
    None,
    #[default]
    #[strum(serialize = "net-core")]
    NetCore,
    #[strum(serialize = "net-fx")]
    NetFx,
}

/// Hosting runtime selection. Read by bootstrap implementations when
/// bringing the hosting runtime up; `major`/`minor` zero means any version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostingConfig {
    #[serde(default)]
    pub flavor: HostRuntimeFlavor,
    #[serde(default)]
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
    #[serde(default)]
    pub runtime_directory: Option<PathBuf>,
}

impl HostingConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

static CONFIG: LazyLock<Mutex<HostingConfig>> = LazyLock::new(Mutex::default);

/// Override the hosting runtime selection. Takes effect on the next hosting
/// bootstrap; a host that is already resolved is unaffected.
pub fn set(config: HostingConfig) {
    *CONFIG.lock().unwrap() = config;
}

/// Return the current hosting runtime selection.
pub fn current() -> HostingConfig {
    CONFIG.lock().unwrap().clone()
}
