//! # Archivos Estáticos
//! src/static_files.rs
//!
//! Un request es "de archivo" cuando su path tiene un '.' después del último
//! '/'. Esos requests no pasan por el router: se resuelven contra el document
//! root (`www_root + path`).

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::DispatchError;
use crate::http::{mime, Response, ResponseBuilder};

/// Heurística de archivo: hay un '.' después del último '/'
///
/// # Ejemplo
/// ```
/// use minihttpd::static_files::is_file_request;
///
/// assert!(is_file_request("/index.html"));
/// assert!(!is_file_request("/"));
/// assert!(!is_file_request("/api/users"));
/// assert!(!is_file_request("/a.b/c"));
/// ```
pub fn is_file_request(path: &str) -> bool {
    if path.is_empty() || path == "/" {
        return false;
    }

    match (path.rfind('.'), path.rfind('/')) {
        (Some(dot), Some(slash)) => dot > slash,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Servidor de archivos bajo un document root
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Une el path del request al root. Solo se aceptan componentes normales:
    /// `..`, raíces o prefijos hacen que el archivo no exista.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }

    /// Resuelve el path de un request de archivo
    pub fn load(&self, url_path: &str) -> Result<Response, DispatchError> {
        match self.map_path(url_path) {
            Some(path) => load_file(&path),
            None => {
                debug!(url_path, "rejected path outside of document root");
                Err(DispatchError::FileNotFound(PathBuf::from(url_path)))
            }
        }
    }

    /// Igual que [`StaticFiles::load`] pero los errores ya son respuestas (404/500)
    pub fn serve(&self, url_path: &str) -> Response {
        self.load(url_path).unwrap_or_else(DispatchError::into_response)
    }
}

/// Lee un archivo y arma la respuesta con su media type
///
/// Los media types de texto viajan como `Body::Text`; el resto, y cualquier
/// archivo "de texto" que no sea UTF-8 válido, como `Body::Binary`.
pub fn load_file(path: &Path) -> Result<Response, DispatchError> {
    if !path.exists() {
        return Err(DispatchError::FileNotFound(path.to_path_buf()));
    }

    let content_type = mime::content_type_for(path);
    let bytes = fs::read(path).map_err(|source| DispatchError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let builder = ResponseBuilder::ok().content_type(content_type);
    let response = if mime::is_text(content_type) {
        match String::from_utf8(bytes) {
            Ok(text) => builder.body(text),
            Err(err) => builder.binary_body(err.into_bytes()),
        }
    } else {
        builder.binary_body(bytes)
    };

    Ok(response.build())
}

/// Sirve un archivo concreto; 404/500 se devuelven como respuesta
pub fn serve_file(path: &Path) -> Response {
    load_file(path).unwrap_or_else(DispatchError::into_response)
}
