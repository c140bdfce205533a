//! # Tipos MIME
//! src/http/mime.rs
//!
//! Tabla fija extensión → media type para los archivos estáticos, y la lista de
//! media types que se sirven como texto.

use std::path::Path;

/// Media type por defecto para extensiones desconocidas
pub const OCTET_STREAM: &str = "application/octet-stream";

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";

/// Media type según la extensión del path (sin distinguir mayúsculas)
///
/// # Ejemplo
/// ```
/// use minihttpd::http::mime;
/// use std::path::Path;
///
/// assert_eq!(mime::content_type_for(Path::new("www/INDEX.HTML")), "text/html");
/// assert_eq!(mime::content_type_for(Path::new("www/data.bin")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return OCTET_STREAM,
    };

    match extension.as_str() {
        "txt" => TEXT_PLAIN,
        "html" | "htm" => TEXT_HTML,
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => APPLICATION_JSON,
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "md" => "text/markdown",

        // Imágenes
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tiff" | "tif" => "image/tiff",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "m4a" => "audio/mp4",

        // Video
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",

        // Fuentes
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Archivos comprimidos
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",

        // Documentos de oficina
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",

        "xhtml" => "application/xhtml+xml",
        "wasm" => "application/wasm",

        _ => OCTET_STREAM,
    }
}

/// Media types cuyo contenido se lee y se envía como texto
pub fn is_text(content_type: &str) -> bool {
    matches!(
        content_type,
        "text/plain"
            | "text/html"
            | "text/css"
            | "text/javascript"
            | "text/csv"
            | "text/xml"
            | "text/markdown"
            | "text/event-stream"
            | "application/json"
            | "application/xml"
            | "application/x-www-form-urlencoded"
            | "application/graphql"
            | "application/xhtml+xml"
            | "application/rss+xml"
            | "application/atom+xml"
    )
}
