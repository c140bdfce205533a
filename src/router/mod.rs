//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla de endpoints `(path, métodos aceptados, handler)`. Se construye una vez
//! al arrancar y después solo se lee, compartida entre workers con `Arc`.
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! El match es exacto sobre el path (sin comodines ni parámetros). Si el path
//! existe pero no acepta el método, el resultado es "method not allowed".

use std::fmt;
use std::sync::Arc;

use crate::http::{Method, Request, Response};

/// Función handler: recibe el request y produce una respuesta. Un `Err`
/// se convierte en 500 en el borde de la conexión.
pub type Handler = Arc<dyn Fn(&Request) -> anyhow::Result<Response> + Send + Sync>;

/// Endpoint registrado
#[derive(Clone)]
pub struct Endpoint {
    path: String,
    accepted_methods: Vec<Method>,
    handler: Handler,
}

impl Endpoint {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn accepted_methods(&self) -> &[Method] {
        &self.accepted_methods
    }

    pub fn accepts(&self, method: Method) -> bool {
        self.accepted_methods.contains(&method)
    }

    /// Ejecuta el handler del endpoint
    pub fn call(&self, request: &Request) -> anyhow::Result<Response> {
        (self.handler)(request)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("accepted_methods", &self.accepted_methods)
            .finish_non_exhaustive()
    }
}

/// Resultado de resolver path + método
#[derive(Debug)]
pub enum Resolution<'a> {
    Found(&'a Endpoint),
    NotFound,
    MethodNotAllowed(Vec<Method>),
}

/// Router que mapea paths a endpoints
#[derive(Default, Clone)]
pub struct Router {
    /// En orden de registro
    endpoints: Vec<Endpoint>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
        }
    }

    /// Registra un endpoint
    ///
    /// Registrar otra vez el mismo path reemplaza al endpoint anterior en su
    /// misma posición: el último registro gana.
    ///
    /// # Ejemplo
    /// ```
    /// use minihttpd::router::Router;
    /// use minihttpd::http::{Method, ResponseBuilder};
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", &[Method::GET], |_req| {
    ///     Ok(ResponseBuilder::ok().text("hello").build())
    /// });
    /// assert!(router.has_endpoint("/hello"));
    /// ```
    pub fn register<F>(&mut self, path: &str, methods: &[Method], handler: F)
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let mut accepted_methods: Vec<Method> = Vec::with_capacity(methods.len());
        for method in methods {
            if !accepted_methods.contains(method) {
                accepted_methods.push(*method);
            }
        }

        let endpoint = Endpoint {
            path: path.to_string(),
            accepted_methods,
            handler: Arc::new(handler),
        };

        match self.endpoints.iter_mut().find(|ep| ep.path == path) {
            Some(existing) => *existing = endpoint,
            None => self.endpoints.push(endpoint),
        }
    }

    /// Busca el endpoint con exactamente este path
    pub fn resolve(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.path == path)
    }

    /// Busca por path y luego valida el método
    ///
    /// # Ejemplo
    /// ```
    /// use minihttpd::router::{Resolution, Router};
    /// use minihttpd::http::{Method, ResponseBuilder};
    ///
    /// let mut router = Router::new();
    /// router.register("/a", &[Method::GET], |_| Ok(ResponseBuilder::ok().build()));
    ///
    /// assert!(matches!(router.resolve_and_check("/a", Method::GET), Resolution::Found(_)));
    /// assert!(matches!(router.resolve_and_check("/b", Method::GET), Resolution::NotFound));
    /// ```
    pub fn resolve_and_check(&self, path: &str, method: Method) -> Resolution<'_> {
        match self.resolve(path) {
            None => Resolution::NotFound,
            Some(endpoint) if endpoint.accepts(method) => Resolution::Found(endpoint),
            Some(endpoint) => Resolution::MethodNotAllowed(endpoint.accepted_methods.clone()),
        }
    }

    /// Métodos aceptados por un path, si está registrado
    pub fn allowed_methods(&self, path: &str) -> Option<&[Method]> {
        self.resolve(path).map(Endpoint::accepted_methods)
    }

    pub fn has_endpoint(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    pub fn registered_paths(&self) -> Vec<&str> {
        self.endpoints.iter().map(Endpoint::path).collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn clear(&mut self) {
        self.endpoints.clear();
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.endpoints.iter()).finish()
    }
}

/// Builder encadenable sobre [`Router`]
///
/// ```
/// use minihttpd::router::RouterBuilder;
/// use minihttpd::http::{Method, ResponseBuilder};
///
/// let router = RouterBuilder::new()
///     .get("/", |_| Ok(ResponseBuilder::ok().html("<h1>hi</h1>").build()))
///     .methods("/endpoint", &[Method::GET, Method::POST], |_| Ok(ResponseBuilder::ok().build()))
///     .build();
///
/// assert_eq!(router.registered_paths(), vec!["/", "/endpoint"]);
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods<F>(mut self, path: &str, methods: &[Method], handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.router.register(path, methods, handler);
        self
    }

    pub fn get<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.methods(path, &[Method::GET], handler)
    }

    pub fn post<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.methods(path, &[Method::POST], handler)
    }

    pub fn put<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.methods(path, &[Method::PUT], handler)
    }

    pub fn delete<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.methods(path, &[Method::DELETE], handler)
    }

    pub fn build(self) -> Router {
        self.router
    }
}
