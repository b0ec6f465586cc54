use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use crate::{
    errors::{IntakeError, Result},
    storage::CounterScope,
    utils::paths::{app_data_dir, config_file_in, ensure_dir},
};

pub const TRIAGE_STORE_FILE: &str = "pacientes_registro.csv";
pub const INTAKE_STORE_FILE: &str = "ficha_ingreso.csv";

/// Which wizard runs when the binary is started without a flow argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    #[default]
    #[serde(rename = "triaje")]
    Triage,
    #[serde(rename = "ficha")]
    Intake,
}

impl Flow {
    pub fn name(self) -> &'static str {
        match self {
            Flow::Triage => "triaje",
            Flow::Intake => "ficha",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flow {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "triaje" | "triage" => Ok(Flow::Triage),
            "ficha" | "intake" => Ok(Flow::Intake),
            other => Err(IntakeError::InvalidInput(format!(
                "unknown flow `{other}` (expected `triaje` or `ficha`)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flow: Flow,
    /// Directory holding the CSV stores; the application home when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub triage_store_file: String,
    pub intake_store_file: String,
    pub counter_scope: CounterScope,
    pub plain_mode: bool,
    pub screen_reader_mode: bool,
    pub high_contrast_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flow: Flow::default(),
            data_dir: None,
            triage_store_file: TRIAGE_STORE_FILE.into(),
            intake_store_file: INTAKE_STORE_FILE.into(),
            counter_scope: CounterScope::default(),
            plain_mode: false,
            screen_reader_mode: false,
            high_contrast_mode: false,
        }
    }
}

impl Config {
    fn data_dir_or(&self, home: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| home.to_path_buf())
    }

    pub fn triage_store_path(&self, home: &Path) -> PathBuf {
        self.data_dir_or(home).join(&self.triage_store_file)
    }

    pub fn intake_store_path(&self, home: &Path) -> PathBuf {
        self.data_dir_or(home).join(&self.intake_store_file)
    }
}

/// Loads `config.json` inside the application home.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.triage_store_path(dir.path()),
            dir.path().join("pacientes_registro.csv")
        );
    }

    #[test]
    fn flow_and_scope_load_from_their_file_names() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            config_file_in(dir.path()),
            r#"{ "flow": "ficha", "counter_scope": "year", "plain_mode": true }"#,
        )
        .unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.flow, Flow::Intake);
        assert_eq!(config.counter_scope, CounterScope::Year);
        assert!(config.plain_mode);
        assert!(!config.screen_reader_mode);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(config_file_in(dir.path()), r#"{ "data_dir": "/srv/clinica" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.flow, Flow::Triage);
        assert_eq!(
            config.intake_store_path(dir.path()),
            PathBuf::from("/srv/clinica/ficha_ingreso.csv")
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(config_file_in(dir.path()), "{ not json").unwrap();
        assert!(matches!(manager.load(), Err(IntakeError::ConfigError(_))));
    }

    #[test]
    fn flows_parse_from_cli_names() {
        assert_eq!("triaje".parse::<Flow>().unwrap(), Flow::Triage);
        assert_eq!("FICHA".parse::<Flow>().unwrap(), Flow::Intake);
        assert!("otro".parse::<Flow>().is_err());
    }
}
