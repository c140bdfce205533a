//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cada worker hace exactamente esto:
//!
//! 1. Una sola lectura de hasta [`MAX_REQUEST_SIZE`] bytes
//! 2. Parsea el request
//! 3. Si pide un archivo, lo sirve desde el document root; si no, va al router
//! 4. Escribe la respuesta, hace flush y cierra
//!
//! Todo error del request (parseo, ruta, método, archivo, handler) termina
//! en una respuesta HTTP. Nada de lo que pase aquí afecta al listener.

use std::any::Any;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{DispatchError, SERVICE_UNAVAILABLE_HTML};
use crate::http::{Request, Response, ResponseBuilder, StatusCode};
use crate::router::{Endpoint, Resolution, Router};
use crate::static_files::StaticFiles;

/// Máximo de bytes leídos por request
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Espera máxima por el request de una conexión rechazada por saturación
pub const BUSY_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Atiende una conexión aceptada y la cierra
///
/// Una lectura de 0 bytes (el cliente cerró sin enviar nada) se despacha
/// como cualquier otro buffer y termina en un 500.
pub fn handle_connection(mut stream: TcpStream, router: &Router, files: &StaticFiles) {
    let start = Instant::now();
    let peer = peer_name(&stream);

    let mut buffer = [0u8; MAX_REQUEST_SIZE];
    let bytes_read = match stream.read(&mut buffer) {
        Ok(n) => n,
        Err(err) => {
            warn!(%peer, error = %err, "failed to read request");
            return;
        }
    };

    let response = dispatch(&buffer[..bytes_read], router, files);
    if !write_response(&mut stream, &response, &peer) {
        return;
    }

    info!(
        %peer,
        status = response.status().as_u16(),
        bytes_read,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );
}

/// Responde 503 a una conexión que llegó con todos los workers ocupados
///
/// Primero consume el request (con timeout) para que el cierre no descarte la
/// respuesta con un RST.
pub fn reject_busy(mut stream: TcpStream) {
    let peer = peer_name(&stream);

    let mut buffer = [0u8; MAX_REQUEST_SIZE];
    if let Err(err) = stream
        .set_read_timeout(Some(BUSY_READ_TIMEOUT))
        .and_then(|_| stream.read(&mut buffer))
    {
        debug!(%peer, error = %err, "no request from rejected connection");
    }

    let response = ResponseBuilder::new()
        .status(StatusCode::ServiceUnavailable)
        .html(SERVICE_UNAVAILABLE_HTML)
        .build();
    if write_response(&mut stream, &response, &peer) {
        warn!(%peer, "all workers busy, connection rejected");
    }
}

fn peer_name(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn write_response(stream: &mut TcpStream, response: &Response, peer: &str) -> bool {
    match stream.write_all(&response.to_bytes()).and_then(|_| stream.flush()) {
        Ok(()) => true,
        Err(err) => {
            warn!(peer, error = %err, "failed to write response");
            false
        }
    }
}

/// Convierte los bytes crudos de un request en la respuesta a enviar
///
/// No toca sockets: es lo que [`handle_connection`] hace entre leer y escribir.
///
/// ```
/// use minihttpd::router::RouterBuilder;
/// use minihttpd::http::{ResponseBuilder, StatusCode};
/// use minihttpd::server::connection::dispatch;
/// use minihttpd::static_files::StaticFiles;
///
/// let router = RouterBuilder::new()
///     .get("/hi", |_| Ok(ResponseBuilder::ok().text("hi").build()))
///     .build();
/// let files = StaticFiles::new(".");
///
/// let response = dispatch(b"GET /hi HTTP/1.1\r\n\r\n", &router, &files);
/// assert_eq!(response.status(), StatusCode::Ok);
/// ```
pub fn dispatch(raw: &[u8], router: &Router, files: &StaticFiles) -> Response {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_dispatch(raw, router, files)))
        .unwrap_or_else(|payload| Err(DispatchError::HandlerFailure(panic_message(payload.as_ref()))));

    match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(status = err.status().as_u16(), error = %err, "request failed");
            err.into_response()
        }
    }
}

fn try_dispatch(raw: &[u8], router: &Router, files: &StaticFiles) -> Result<Response, DispatchError> {
    let request = Request::parse(raw)?;
    debug!(method = %request.method(), path = request.path(), "request parsed");

    if request.requests_file() {
        return files.load(request.path());
    }

    match router.resolve_and_check(request.path(), request.method()) {
        Resolution::Found(endpoint) => call_handler(endpoint, &request),
        Resolution::NotFound => Err(DispatchError::RouteNotFound {
            path: request.path().to_string(),
        }),
        Resolution::MethodNotAllowed(allowed) => Err(DispatchError::MethodNotAllowed {
            method: request.method(),
            path: request.path().to_string(),
            allowed,
        }),
    }
}

/// Un `Err` del handler se reporta como fallo; un panic lo atrapa [`dispatch`]
fn call_handler(endpoint: &Endpoint, request: &Request) -> Result<Response, DispatchError> {
    endpoint
        .call(request)
        .map_err(|err| DispatchError::HandlerFailure(format!("{:#}", err)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked while dispatching: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked while dispatching: {}", message)
    } else {
        "panicked while dispatching".to_string()
    }
}
