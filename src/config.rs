use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};

use crate::control::{clean_who, Authority, DEFAULT_DENIAL_NOTICE};
use crate::provider::{Error, ErrorKind, Result};
use crate::render::DEFAULT_ERA;

const CONFIG_PATH_ENV_VAR: &str = "ALMANAC_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env: Option<PathBuf> = if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        Some(PathBuf::from(path))
    } else {
        None
    };

    let home = if let Some(dir) = dirs::home_dir() {
        dir
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "Unable to find home directory",
        ));
    };

    let home_config = home.join(".almanac.toml");

    let config_xdg = if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from_iter([dir, "almanac".to_string(), "config.toml".to_string()].iter())
    } else {
        PathBuf::from_iter(
            [
                home.as_path(),
                Path::new(".config"),
                Path::new("almanac"),
                Path::new("config.toml"),
            ]
            .iter(),
        )
    };

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("almanac")
        .join("state.json")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub state_file: PathBuf,
    /// Names allowed to run calendar-changing commands.
    pub privileged: Vec<String>,
    pub era: String,
    pub denial_notice: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            state_file: default_state_file(),
            privileged: vec!["GM".to_owned()],
            era: DEFAULT_ERA.to_owned(),
            denial_notice: DEFAULT_DENIAL_NOTICE.to_owned(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        Config::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }
}

impl Authority for Config {
    fn is_privileged(&self, caller: &str) -> bool {
        let caller = clean_who(caller);
        self.privileged
            .iter()
            .any(|name| clean_who(name).eq_ignore_ascii_case(&caller))
    }
}

/// Loads `path` if given, otherwise the first config file found in the
/// usual locations, otherwise the defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(Error::new(
                ErrorKind::ConfigMissing,
                &format!("Config file '{}' does not exist", path.display()),
            ));
        }
        log::info!("Loading config from '{}'", path.display());
        return Config::from_file(path);
    }

    for location in find_configfile_locations()? {
        if location.exists() {
            log::info!("Loading config from '{}'", location.display());
            return Config::from_file(&location);
        }
    }

    log::info!("No config file found, using defaults");
    Ok(Config::default())
}
