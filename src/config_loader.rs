use crate::errors::{RiskError, RiskResult};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "mrl_risk.toml";
pub const DEFAULT_MODEL_PATH: &str = "model/amu_predictor.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_filter: "mrl_risk=info,tower_http=info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> RiskResult<()> {
        if self.host.trim().is_empty() {
            return Err(RiskError::config("host must be set"));
        }
        if self.port == 0 {
            return Err(RiskError::config("port must be non-zero"));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(RiskError::config("model_path must be set"));
        }
        Ok(())
    }
}

/// Layer defaults, the TOML file, `ML_SERVICE_PORT` and `MRL_*` variables,
/// in that order. The file path comes from the argument, then
/// `MRL_CONFIG_PATH`, then `mrl_risk.toml` in the working directory.
pub fn load_config(path: Option<&Path>) -> RiskResult<ServiceConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("MRL_CONFIG_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let figment = Figment::from(Serialized::defaults(ServiceConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::raw().only(&["ML_SERVICE_PORT"]).map(|_| "port".into()))
        .merge(Env::prefixed("MRL_"));

    let config: ServiceConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}
