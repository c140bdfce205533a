//! # Endpoints de Ejemplo
//! src/handlers.rs
//!
//! Endpoints que registra el binario:
//! - `/`: sirve `index.html` del document root
//! - `/endpoint`: GET y POST
//! - `/jason`: JSON de ejemplo
//! - `/echo`: devuelve el body como HTML
//! - `/param_test`: lista los query params

use std::fmt::Write as _;
use std::path::PathBuf;

use serde_json::json;

use crate::http::{Method, Request, Response, ResponseBuilder};
use crate::router::{Router, RouterBuilder};
use crate::static_files::serve_file;

/// Router con todos los endpoints de ejemplo
pub fn router(www_root: impl Into<PathBuf>) -> Router {
    let index = www_root.into().join("index.html");

    RouterBuilder::new()
        .methods("/endpoint", &[Method::GET, Method::POST], endpoint_handler)
        .get("/", move |_req| Ok(serve_file(&index)))
        .get("/jason", json_handler)
        .get("/echo", echo_handler)
        .get("/param_test", param_test_handler)
        .build()
}

/// Handler para /endpoint
///
/// GET responde texto plano; POST devuelve el body dentro de HTML.
pub fn endpoint_handler(req: &Request) -> anyhow::Result<Response> {
    let response = match req.method() {
        Method::GET => ResponseBuilder::ok().text("Oh, a GET request!"),
        _ => ResponseBuilder::ok().html(format!(
            "<h1>Oh, a POST request!</h1> {}",
            req.body().unwrap_or("request has no body")
        )),
    };
    Ok(response.build())
}

/// Handler para /jason
///
/// # Ejemplo de response
/// ```json
/// {
///   "string_id": "unique12345",
///   "metadata": { "author": "John Doe", ... },
///   ...
/// }
/// ```
pub fn json_handler(_req: &Request) -> anyhow::Result<Response> {
    let data = json!({
        "string_id": "unique12345",
        "content": "Lorem ipsum dolor sit amet...",
        "metadata": {
            "author": "John Doe",
            "created_at": "2024-12-01T10:00:00Z",
            "version": 1.0,
            "tags": ["sample", "text", "long"]
        },
        "properties": {
            "length": 350,
            "encoding": "UTF-8",
            "is_encrypted": false
        }
    });

    Ok(ResponseBuilder::ok().json(&data).build())
}

pub fn echo_handler(req: &Request) -> anyhow::Result<Response> {
    Ok(ResponseBuilder::ok().html(req.body().unwrap_or_default()).build())
}

/// Handler para /param_test?name=...&email=...
///
/// Sin parámetros responde 400.
pub fn param_test_handler(req: &Request) -> anyhow::Result<Response> {
    if req.query_params().is_empty() {
        return Ok(ResponseBuilder::bad_request()
            .html("<h1>Error: Please provide name and email parameters</h1>")
            .build());
    }

    let mut html = String::from("<html>\n<body>\n<h1>User Information</h1>\n");
    if let Some(name) = req.query_param("name") {
        writeln!(html, "<p>Name: {}</p>", escape_html(name))?;
    }
    if let Some(email) = req.query_param("email") {
        writeln!(html, "<p>Email: {}</p>", escape_html(email))?;
    }

    // HashMap no tiene orden: se listan ordenados por nombre
    let mut params: Vec<_> = req.query_params().iter().collect();
    params.sort();

    html.push_str("<h2>All Parameters:</h2>\n<ul>\n");
    for (key, value) in params {
        writeln!(html, "<li>{}: {}</li>", escape_html(key), escape_html(value))?;
    }
    html.push_str("</ul>\n</body>\n</html>\n");

    Ok(ResponseBuilder::ok().html(html).build())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
