//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración desde argumentos CLI y variables de entorno, con un archivo
//! TOML opcional que fija `port` y `www_path`.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./minihttpd --port 8080 --www-root ./www --max-workers 128
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 WWW_ROOT=./www ./minihttpd
//! ```
//!
//! ### Archivo
//! ```toml
//! [server]
//! port = 8080
//! www_path = "./www"
//! ```
//! ```bash
//! ./minihttpd --config ./config.toml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

/// Formato de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Legible para humanos
    Pretty,
    /// Una línea JSON por evento
    Json,
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "minihttpd")]
#[command(about = "Servidor HTTP/1.1 minimo con router y archivos estaticos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Document root para los archivos estáticos
    #[arg(long = "www-root", default_value = "./www", env = "WWW_ROOT")]
    pub www_root: PathBuf,

    /// Archivo TOML con la sección [server]; sus valores reemplazan a los de la CLI
    #[arg(short, long = "config", env = "HTTP_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Máximo de conexiones atendidas en paralelo
    #[arg(long = "max-workers", default_value = "256", env = "MAX_WORKERS")]
    pub max_workers: usize,

    /// Espera entre intentos de accept cuando no hay conexiones pendientes
    #[arg(long = "poll-interval-ms", default_value = "100", env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    #[arg(long = "log-format", value_enum, default_value = "pretty", env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Forma del archivo de configuración
#[derive(Debug, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    port: Option<u16>,
    www_path: Option<PathBuf>,
    max_workers: Option<usize>,
}

impl Config {
    /// Parsea argumentos CLI / variables de entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Aplica el archivo de configuración (si hay uno) y valida
    pub fn resolve(self) -> Result<Self, ConfigError> {
        let config = match self.config_file.clone() {
            Some(path) => self.merge_file(&path)?,
            None => self,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuración por defecto + el archivo dado, ya validada
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::default().merge_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// `server.port` y `server.www_path` son obligatorios en el archivo
    fn merge_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&contents)?;
        let server = file.server.ok_or(ConfigError::MissingKey("server"))?;

        self.port = server.port.ok_or(ConfigError::MissingKey("server.port"))?;
        self.www_root = server.www_path.ok_or(ConfigError::MissingKey("server.www_path"))?;
        if let Some(max_workers) = server.max_workers {
            self.max_workers = max_workers;
        }
        self.config_file = Some(path.to_path_buf());

        Ok(self)
    }

    /// Valida la configuración; un error aquí impide arrancar el servidor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.www_root.exists() {
            return Err(ConfigError::WwwRootNotFound(self.www_root.clone()));
        }
        if !self.www_root.is_dir() {
            return Err(ConfigError::InvalidValue {
                key: "www_root",
                reason: format!("'{}' is not a directory", self.www_root.display()),
            });
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_workers",
                reason: "must be >= 1".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Dirección para bind: todas las interfaces
    ///
    /// # Ejemplo
    /// ```rust
    /// use minihttpd::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Resumen de la configuración en el log
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            www_root = %self.www_root.display(),
            max_workers = self.max_workers,
            poll_interval_ms = self.poll_interval_ms,
            config_file = ?self.config_file,
            "server configuration"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            www_root: PathBuf::from("./www"),
            config_file: None,
            max_workers: 256,
            poll_interval_ms: 100,
            log_format: LogFormat::Pretty,
        }
    }
}
