use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("studyhive".to_string())
}

fn default_token_secret() -> String {
    env::var("ACCESS_TOKEN_SECRET").unwrap_or("studyhive-dev-secret".to_string())
}

fn default_production() -> bool {
    env::var("APP_ENV").map(|v| v == "production").unwrap_or(false)
}

fn default_allowed_origins() -> Vec<String> {
    env::var("CORS_ALLOWED_ORIGINS")
        .map(|v| v.split(',').map(|origin| origin.trim().to_string()).collect())
        .unwrap_or_else(|_| vec![String::from("http://localhost:5173")])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    /// Secret used to sign and verify access tokens.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    /// Switches credential cookies to cross-site (SameSite=None; Secure).
    #[serde(default = "default_production")]
    pub production: bool,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            token_secret: default_token_secret(),
            production: default_production(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let dir = config_dir();
        let found = ["settings.yml", "settings.yaml"]
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists());
        let config_file = found.ok_or(ConfigurationError::NotFound(dir))?;

        let file = File::open(config_file)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}
