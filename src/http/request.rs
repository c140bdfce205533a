//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.x escrito a mano. Convierte el buffer leído del socket en un
//! [`Request`] inmutable, o falla con [`ParseError`] si el buffer no parece
//! un request HTTP.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /path?param1=value1&param2=value2 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! body de una sola línea
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.1`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: separa headers del body
//! 4. **Body**: (Opcional) solo la primera línea después de los headers.
//!    `Content-Length` no se consulta: el request completo tiene que llegar
//!    en una sola lectura.

use std::collections::HashMap;

use thiserror::Error;

use super::Method;

/// Request HTTP parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP (GET, POST, PUT, DELETE)
    method: Method,

    /// Path sin query string (ej: "/param_test")
    path: String,

    /// Query parameters (ej: {"name": "ana"}); el último valor gana
    query_params: HashMap<String, String>,

    /// Headers tal como llegaron, nombre sensible a mayúsculas
    headers: HashMap<String, String>,

    /// Versión numérica extraída del token de versión (ej: "1.1")
    version: String,

    /// Primera línea después del bloque de headers, si existe
    body: Option<String>,
}

/// Errores de parsing: el buffer no es un request HTTP válido
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Request is not valid UTF-8")]
    InvalidEncoding,

    /// La primera línea no contiene el token "HTTP"
    #[error("Request line does not contain an HTTP marker: {0}")]
    MissingHttpMarker(String),

    /// La request line no tiene exactamente METHOD TARGET VERSION
    #[error("Invalid request line format: {0}")]
    InvalidRequestLine(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),
}

impl Request {
    /// Parsea un request desde el buffer leído del socket
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use minihttpd::http::{Method, Request};
    ///
    /// let raw = b"GET /param_test?name=ana HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/param_test");
    /// assert_eq!(request.query_param("name"), Some("ana"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let request_str = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidEncoding)?;

        if request_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // split_inclusive no produce un segmento vacío al final del buffer,
        // así "...\r\n\r\n" no genera un body vacío
        let mut lines = request_str.split_inclusive('\n').map(strip_line_ending);

        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;

        let headers = Self::parse_headers(&mut lines);
        let body = lines.next().map(str::to_string);

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
            body,
        })
    }

    /// Parsea la request line: `METHOD TARGET VERSION`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        if !line.contains("HTTP") {
            return Err(ParseError::MissingHttpMarker(line.to_string()));
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let [method, target, version] = parts.as_slice() else {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        };

        let method: Method = method.parse()?;
        let (path, query_params) = Self::parse_path_and_query(target);
        let version = Self::parse_version(version)?;

        Ok((method, path, query_params, version))
    }

    /// Separa el path de la query string en el primer '?'
    ///
    /// Ejemplo: "/param_test?name=ana&email=a@b.c"
    /// Retorna: ("/param_test", {"name": "ana", "email": "a@b.c"})
    fn parse_path_and_query(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (target.to_string(), HashMap::new()),
        }
    }

    /// Pares `key=value` separados por '&'. Un par que no tenga exactamente
    /// un '=' se descarta. Los valores no se decodifican.
    fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| pair.matches('=').count() == 1)
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    /// Solo se conservan dígitos y '.': "HTTP/1.1" -> "1.1"
    fn parse_version(token: &str) -> Result<String, ParseError> {
        let version: String = token
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if !version.chars().any(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidHttpVersion(token.to_string()));
        }
        Ok(version)
    }

    /// Lee headers hasta la línea vacía. Cada línea se corta en el primer ':';
    /// las líneas sin ':' se ignoran.
    fn parse_headers<'a>(lines: &mut impl Iterator<Item = &'a str>) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                headers.insert(name.to_string(), value.trim_start().to_string());
            }
        }

        headers
    }

    // === Accesores ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    ///
    /// # Ejemplo
    /// ```
    /// use minihttpd::http::Request;
    ///
    /// let raw = b"GET /test?num=42 HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.query_param("num"), Some("42"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Búsqueda exacta, sensible a mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Indica si el path apunta a un archivo bajo el document root
    pub fn requests_file(&self) -> bool {
        crate::static_files::is_file_request(&self.path)
    }
}

/// Quita el "\n" final y un "\r" previo si lo hay
fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "1.1");
        assert!(request.query_params().is_empty());
        assert!(request.headers().is_empty());
        assert_eq!(request.body(), None);
    }

    #[test]
    fn test_parse_all_methods() {
        for method in Method::ALL {
            let raw = format!("{} /items HTTP/1.1\r\n\r\n", method);
            let request = Request::parse(raw.as_bytes()).unwrap();
            assert_eq!(request.method(), method);
        }
    }

    #[test]
    fn test_parse_multiple_query_params() {
        let raw = b"GET /test?num=42&text=hello&fast=true HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/test");
        assert_eq!(request.query_param("num"), Some("42"));
        assert_eq!(request.query_param("text"), Some("hello"));
        assert_eq!(request.query_param("fast"), Some("true"));
    }

    #[test]
    fn test_query_pairs_without_single_equals_are_skipped() {
        let raw = b"GET /q?flag&a=1&b=2=3&=empty HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("flag"), None);
        assert_eq!(request.query_param("a"), Some("1"));
        assert_eq!(request.query_param("b"), None);
        assert_eq!(request.query_param(""), Some("empty"));
        assert_eq!(request.query_params().len(), 2);
    }

    #[test]
    fn test_duplicate_query_key_last_wins() {
        let request = Request::parse(b"GET /q?k=1&k=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.query_param("k"), Some("2"));
    }

    #[test]
    fn test_query_values_are_not_decoded() {
        let request = Request::parse(b"GET /q?text=hello%20world HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.query_param("text"), Some("hello%20world"));
    }

    #[test]
    fn test_only_first_question_mark_splits() {
        let request = Request::parse(b"GET /q?a=1?b HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/q");
        assert_eq!(request.query_param("a"), Some("1?b"));
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent:   test\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:8080"));
        assert_eq!(request.header("User-Agent"), Some("test"));
        assert_eq!(request.header("host"), None);
    }

    #[test]
    fn test_header_lines_without_colon_are_ignored() {
        let raw = b"GET / HTTP/1.1\r\nnot a header\r\nX-Ok: yes\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("X-Ok"), Some("yes"));
    }

    #[test]
    fn test_unknown_headers_are_kept() {
        let raw = b"GET / HTTP/1.1\r\nX-Totally-Custom: 1\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("X-Totally-Custom"), Some("1"));
    }

    #[test]
    fn test_body_is_first_line_after_headers() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world\r\nsecond line";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.body(), Some("hello world"));
    }

    #[test]
    fn test_body_without_trailing_newline() {
        let raw = b"PUT /items HTTP/1.1\r\n\r\n{\"id\":1}";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), Some("{\"id\":1}"));
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let raw = b"GET /a?x=1 HTTP/1.0\nHost: h\n\nbody";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/a");
        assert_eq!(request.version(), "1.0");
        assert_eq!(request.header("Host"), Some("h"));
        assert_eq!(request.body(), Some("body"));
    }

    #[test]
    fn test_version_keeps_only_digits_and_dots() {
        let request = Request::parse(b"GET / HTTP/2\r\n\r\n").unwrap();
        assert_eq!(request.version(), "2");
    }

    #[test]
    fn test_missing_http_marker() {
        let result = Request::parse(b"GET / FTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MissingHttpMarker(_))));
    }

    #[test]
    fn test_invalid_request_line() {
        let result = Request::parse(b"GET HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidRequestLine(_))));

        let result = Request::parse(b"GET / extra HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidRequestLine(_))));
    }

    #[test]
    fn test_unsupported_method() {
        let result = Request::parse(b"PATCH / HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::UnsupportedMethod("PATCH".to_string())));
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / HTTP/x\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b""), Err(ParseError::EmptyRequest));
        assert_eq!(Request::parse(b"\r\n\r\n"), Err(ParseError::EmptyRequest));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = Request::parse(b"GET /\xff HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::InvalidEncoding));
    }

    #[test]
    fn test_requests_file() {
        let file = Request::parse(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();
        let endpoint = Request::parse(b"GET /api/users HTTP/1.1\r\n\r\n").unwrap();

        assert!(file.requests_file());
        assert!(!endpoint.requests_file());
    }
}
