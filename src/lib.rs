//! # minihttpd
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo escrito sobre `std::net`: un request por
//! conexión, router por path y método, y archivos estáticos desde un
//! document root.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests, construcción de responses, status y MIME
//! - `router`: tabla de endpoints `(path, métodos, handler)`
//! - `static_files`: heurística de archivo y lectura bajo el document root
//! - `server`: listener, límite de workers y manejo de cada conexión
//! - `config`: CLI, variables de entorno y archivo TOML
//! - `error`: errores de arranque y de cada request
//! - `handlers`: endpoints de ejemplo que usa el binario
//! - `logging`: subscriber de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use minihttpd::config::Config;
//! use minihttpd::http::ResponseBuilder;
//! use minihttpd::router::RouterBuilder;
//!
//! let router = RouterBuilder::new()
//!     .get("/hello", |_req| Ok(ResponseBuilder::ok().text("hello").build()))
//!     .build();
//!
//! minihttpd::server::start(router, &Config::default()).expect("server failed");
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod static_files;
