//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Un [`Response`] se arma con un [`ResponseBuilder`] (cada setter retorna el
//! builder) y luego se serializa a bytes con [`Response::to_bytes`].
//!
//! ## Formato en el cable
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 13\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use minihttpd::http::{ResponseBuilder, StatusCode};
//!
//! let response = ResponseBuilder::new()
//!     .status(StatusCode::Ok)
//!     .content_type("text/plain")
//!     .body("Hello")
//!     .build();
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nHello"));
//! ```

use std::collections::BTreeMap;

use super::{mime, StatusCode};

/// Cuerpo de una respuesta
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// Sin body: no se escribe nada después de la línea vacía
    #[default]
    Empty,

    /// Texto, se escribe como UTF-8
    Text(String),

    /// Bytes crudos (imágenes, archivos comprimidos, etc.)
    Binary(Vec<u8>),
}

impl Body {
    /// Bytes que se escriben en el socket
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Respuesta HTTP terminada e inmutable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,

    /// Ordenados por nombre para que la serialización sea determinista
    headers: BTreeMap<String, String>,

    body: Body,
}

impl Response {
    /// Atajo para `ResponseBuilder::new()`
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Convierte la respuesta a los bytes exactos que van al socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Name: Value\r\n` (los headers con valor vacío se omiten)
    /// - Línea vacía: `\r\n`
    /// - Body: bytes crudos, sin framing adicional
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);

        for (name, value) in self.headers.iter().filter(|(_, value)| !value.is_empty()) {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let body = self.body.as_bytes();
        let mut result = Vec::with_capacity(head.len() + body.len());
        result.extend_from_slice(head.as_bytes());
        result.extend_from_slice(body);
        result
    }
}

/// Acumulador fluido de [`Response`]
///
/// Todos los setters sobrescriben el valor anterior. Los setters de body además
/// recalculan `Content-Length`.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    /// Builder vacío: 200 OK, sin headers ni body
    pub fn new() -> Self {
        Self {
            response: Response {
                status: StatusCode::Ok,
                headers: BTreeMap::new(),
                body: Body::Empty,
            },
        }
    }

    pub fn ok() -> Self {
        Self::new().status(StatusCode::Ok)
    }

    pub fn created() -> Self {
        Self::new().status(StatusCode::Created)
    }

    pub fn bad_request() -> Self {
        Self::new().status(StatusCode::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::new().status(StatusCode::NotFound)
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.response.status = status;
        self
    }

    /// Agrega un header; si ya existe se sobrescribe
    ///
    /// # Ejemplo
    /// ```
    /// use minihttpd::http::ResponseBuilder;
    ///
    /// let response = ResponseBuilder::ok()
    ///     .header("X-Custom", "first")
    ///     .header("X-Custom", "second")
    ///     .build();
    /// assert_eq!(response.header("X-Custom"), Some("second"));
    /// ```
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response.headers.insert(name.into(), value.into());
        self
    }

    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header("Content-Type", content_type)
    }

    /// Body de texto
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.response.body = Body::Text(body.into());
        self.update_content_length()
    }

    /// Body binario
    pub fn binary_body(mut self, body: Vec<u8>) -> Self {
        self.response.body = Body::Binary(body);
        self.update_content_length()
    }

    pub fn text(self, body: impl Into<String>) -> Self {
        self.content_type(mime::TEXT_PLAIN).body(body)
    }

    pub fn html(self, body: impl Into<String>) -> Self {
        self.content_type(mime::TEXT_HTML).body(body)
    }

    /// Body JSON serializado, con `Content-Type: application/json`
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.content_type(mime::APPLICATION_JSON).body(value.to_string())
    }

    /// Status, content type JSON y body en una sola llamada
    ///
    /// # Ejemplo
    /// ```
    /// use minihttpd::http::{ResponseBuilder, StatusCode};
    /// use serde_json::json;
    ///
    /// let response = ResponseBuilder::new()
    ///     .json_with_status(&json!({"error": "nope"}), StatusCode::BadRequest)
    ///     .build();
    /// assert_eq!(response.status(), StatusCode::BadRequest);
    /// assert_eq!(response.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn json_with_status(self, value: &serde_json::Value, status: StatusCode) -> Self {
        self.status(status).json(value)
    }

    pub fn build(self) -> Response {
        self.response
    }

    fn update_content_length(self) -> Self {
        let length = self.response.body.len();
        self.header("Content-Length", length.to_string())
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_text(response: &Response) -> String {
        String::from_utf8(response.to_bytes()).unwrap()
    }

    #[test]
    fn test_new_response() {
        let response = ResponseBuilder::new().build();
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert_eq!(response.body(), &Body::Empty);
    }

    #[test]
    fn test_empty_body_serialization() {
        let response = ResponseBuilder::new().status(StatusCode::NoContent).build();
        assert_eq!(as_text(&response), "HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[test]
    fn test_exact_wire_format() {
        let response = ResponseBuilder::ok()
            .content_type("text/plain")
            .body("Test")
            .build();

        assert_eq!(
            as_text(&response),
            "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nContent-Type: text/plain\r\n\r\nTest"
        );
    }

    #[test]
    fn test_header_setter_is_idempotent() {
        let response = ResponseBuilder::ok()
            .header("X-Custom", "one")
            .header("X-Custom", "two")
            .build();

        let text = as_text(&response);
        assert_eq!(text.matches("X-Custom:").count(), 1);
        assert!(text.contains("X-Custom: two\r\n"));
    }

    #[test]
    fn test_body_setter_recomputes_content_length() {
        let response = ResponseBuilder::ok().body("a longer body").body("short").build();

        assert_eq!(response.header("Content-Length"), Some("5"));
        assert_eq!(response.body(), &Body::Text("short".to_string()));
    }

    #[test]
    fn test_content_length_counts_bytes_not_chars() {
        let response = ResponseBuilder::ok().body("ñandú").build();
        assert_eq!(response.header("Content-Length"), Some("7"));
    }

    #[test]
    fn test_binary_body() {
        let binary_data = vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF];
        let response = ResponseBuilder::ok().binary_body(binary_data.clone()).build();

        assert_eq!(response.header("Content-Length"), Some("6"));
        assert!(response.to_bytes().ends_with(&binary_data));
    }

    #[test]
    fn test_empty_header_values_are_omitted() {
        let response = ResponseBuilder::ok().header("X-Empty", "").build();
        assert!(!as_text(&response).contains("X-Empty"));
    }

    #[test]
    fn test_json_response() {
        let value = json!({"status": "ok"});
        let response = ResponseBuilder::ok().json(&value).build();
        let expected = value.to_string();

        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body().as_bytes(), expected.as_bytes());
        assert_eq!(response.header("Content-Length"), Some(expected.len().to_string().as_str()));
    }

    #[test]
    fn test_json_with_status() {
        let response = ResponseBuilder::new()
            .json_with_status(&json!({"error": "x"}), StatusCode::MethodNotAllowed)
            .build();

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert!(as_text(&response).starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[test]
    fn test_html_and_text_shortcuts() {
        let html = ResponseBuilder::not_found().html("<h1>x</h1>").build();
        let text = ResponseBuilder::bad_request().text("x").build();

        assert_eq!(html.status(), StatusCode::NotFound);
        assert_eq!(html.header("Content-Type"), Some("text/html"));
        assert_eq!(text.status(), StatusCode::BadRequest);
        assert_eq!(text.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_request_headers_survive_response_serialization() {
        use crate::http::Request;

        let raw = "GET /echo HTTP/1.1\r\n\
                   Host: localhost:8080\r\n\
                   X-Trailing: spaced value  \r\n\
                   X-Time: 10:30:00\r\n\
                   \r\n";
        let request = Request::parse(raw.as_bytes()).unwrap();

        let mut builder = ResponseBuilder::ok();
        for (name, value) in request.headers() {
            builder = builder.header(name.clone(), value.clone());
        }
        let wire = as_text(&builder.text("ok").build());

        let (head, body) = wire.split_once("\r\n\r\n").unwrap();
        assert_eq!(body, "ok");

        let echoed: Vec<(&str, &str)> = head
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(": "))
            .collect();
        for (name, value) in request.headers() {
            assert!(
                echoed.contains(&(name.as_str(), value.as_str())),
                "header {} lost or altered: {:?}",
                name,
                echoed
            );
        }
        assert!(echoed.contains(&("Host", "localhost:8080")));
        assert!(echoed.contains(&("X-Trailing", "spaced value  ")));
        assert!(echoed.contains(&("X-Time", "10:30:00")));
    }
}
