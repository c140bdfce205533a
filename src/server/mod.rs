//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `listener`: socket de escucha y loop de accept
//! - `supervisor`: límite de workers concurrentes
//! - `connection`: un request, una respuesta, cierre
//!
//! Un thread por conexión. El router se comparte con `Arc` y no cambia
//! después de [`Server::bind`].

pub mod connection;
pub mod listener;
pub mod supervisor;

pub use connection::{dispatch, handle_connection, MAX_REQUEST_SIZE};
pub use listener::{start, Server};
pub use supervisor::{ConnectionLimiter, Permit};
