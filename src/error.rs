//! # Errores del Servidor
//! src/error.rs
//!
//! Dos familias de errores:
//!
//! - Fatales al arrancar ([`ConfigError`], [`ServerError`]): el proceso no
//!   llega a escuchar.
//! - Por conexión ([`DispatchError`]): se convierten en una respuesta HTTP en
//!   el borde de la conexión y nunca llegan al listener.

use std::io;
use std::path::PathBuf;

use serde_json::json;
use thiserror::Error;

use crate::http::{Method, ParseError, Response, ResponseBuilder, StatusCode};

/// Body HTML fijo para 404
pub const NOT_FOUND_HTML: &str = "<h1>404 - File Not Found</h1>";

/// Body HTML fijo para 500
pub const INTERNAL_ERROR_HTML: &str = "<h1>500 - Internal Server Error</h1>";

/// Body HTML fijo para 503 (todos los workers ocupados)
pub const SERVICE_UNAVAILABLE_HTML: &str = "<h1>503 - Service Unavailable</h1>";

/// Configuración inválida o incompleta
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required config value: {0}")]
    MissingKey(&'static str),

    #[error("WWW path '{}' does not exist", .0.display())]
    WwwRootNotFound(PathBuf),

    #[error("Invalid config value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Errores que impiden arrancar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Listener I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resultado fallido de despachar un request
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Malformed request: {0}")]
    Malformed(#[from] ParseError),

    #[error("No endpoint registered for {path}")]
    RouteNotFound { path: String },

    #[error("Method {method} is not allowed on URI {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Handler failed: {0}")]
    HandlerFailure(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound { .. } | DispatchError::FileNotFound(_) => StatusCode::NotFound,
            DispatchError::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            DispatchError::Malformed(_)
            | DispatchError::FileRead { .. }
            | DispatchError::HandlerFailure(_) => StatusCode::InternalServerError,
        }
    }

    /// Respuesta que recibe el cliente para este error
    pub fn into_response(self) -> Response {
        match self {
            DispatchError::RouteNotFound { .. } => ResponseBuilder::new()
                .json_with_status(&json!({"error": "Endpoint not found"}), StatusCode::NotFound)
                .build(),
            DispatchError::MethodNotAllowed { method, path, allowed } => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let message = format!("Method {} is not allowed on URI {}", method, path);

                ResponseBuilder::new()
                    .json_with_status(&json!({ "error": message }), StatusCode::MethodNotAllowed)
                    .header("Allow", allow)
                    .build()
            }
            DispatchError::FileNotFound(_) => ResponseBuilder::not_found().html(NOT_FOUND_HTML).build(),
            DispatchError::Malformed(_)
            | DispatchError::FileRead { .. }
            | DispatchError::HandlerFailure(_) => internal_error(),
        }
    }
}

/// Respuesta 500 genérica
pub fn internal_error() -> Response {
    ResponseBuilder::new()
        .status(StatusCode::InternalServerError)
        .html(INTERNAL_ERROR_HTML)
        .build()
}
