//! # Módulo HTTP
//!
//! Implementación a mano del subconjunto de HTTP/1.1 que usa el servidor:
//!
//! - Parsing de requests (una sola lectura, un request por conexión)
//! - Construcción y serialización de responses
//! - Status codes y tabla de tipos MIME
//!
//! No hay keep-alive, pipelining ni chunked transfer encoding: el servidor
//! cierra la conexión después de escribir la respuesta.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 12\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"ok": true}
//! ```

pub mod method;    // GET, POST, PUT, DELETE
pub mod mime;      // Extensión -> media type
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

pub use method::Method;
pub use request::{ParseError, Request};
pub use response::{Body, Response, ResponseBuilder};
pub use status::StatusCode;
