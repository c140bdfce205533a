//! # Listener TCP
//! src/server/listener.rs
//!
//! Dueño del socket de escucha. Acepta en modo no bloqueante: si no hay
//! conexiones pendientes duerme `poll_interval` y vuelve a intentar. Cada
//! conexión aceptada pasa a modo bloqueante y se atiende en su propio thread,
//! con un permiso del [`ConnectionLimiter`]. Sin permisos libres la conexión
//! recibe un 503; el loop de accept nunca espera a los workers.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ServerError;
use crate::router::Router;
use crate::static_files::StaticFiles;

use super::connection::{handle_connection, reject_busy};
use super::supervisor::ConnectionLimiter;

/// Pausa después de un error de accept que no es `WouldBlock`
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Servidor HTTP ya enlazado a su puerto
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    files: Arc<StaticFiles>,
    limiter: ConnectionLimiter,
    poll_interval: Duration,
}

impl Server {
    /// Valida la configuración y abre el socket en `0.0.0.0:port`
    ///
    /// Con `port = 0` el sistema elige un puerto libre; ver [`Server::local_addr`].
    pub fn bind(config: &Config, router: Router) -> Result<Self, ServerError> {
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            addr: address.clone(),
            source,
        })?;
        listener.set_nonblocking(true)?;

        let server = Self {
            listener,
            router: Arc::new(router),
            files: Arc::new(StaticFiles::new(config.www_root.clone())),
            limiter: ConnectionLimiter::new(config.max_workers),
            poll_interval: config.poll_interval(),
        };

        info!(
            address = %server.local_addr()?,
            endpoints = server.router.len(),
            www_root = %server.files.root().display(),
            "server listening"
        );

        Ok(server)
    }

    /// Dirección real del socket
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Loop de accept. No retorna mientras el proceso viva.
    pub fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, active = self.limiter.active(), "connection accepted");
                    if let Err(err) = self.spawn_worker(stream) {
                        warn!(%peer, error = %err, "dropping connection");
                    }
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval);
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    thread::sleep(ACCEPT_ERROR_BACKOFF);
                }
            }
        }
    }

    /// Lanza el worker de una conexión
    ///
    /// Nunca bloquea el loop de accept: si ya hay `max_workers` activos, la
    /// conexión recibe un 503 desde un thread propio sin permiso.
    fn spawn_worker(&self, stream: TcpStream) -> io::Result<()> {
        // El listener es no bloqueante; la conexión aceptada no debe serlo
        stream.set_nonblocking(false)?;

        let Some(permit) = self.limiter.try_acquire() else {
            thread::Builder::new()
                .name("http-busy".to_string())
                .spawn(move || reject_busy(stream))?;
            return Ok(());
        };

        let router = Arc::clone(&self.router);
        let files = Arc::clone(&self.files);

        thread::Builder::new()
            .name("http-worker".to_string())
            .spawn(move || {
                let _permit = permit;
                handle_connection(stream, &router, &files);
            })?;

        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listener", &self.listener)
            .field("endpoints", &self.router.len())
            .field("limiter", &self.limiter)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Enlaza y atiende para siempre. Solo retorna si no se pudo arrancar.
pub fn start(router: Router, config: &Config) -> Result<(), ServerError> {
    let server = Server::bind(config, router).map_err(|err| {
        error!(error = %err, "failed to start server");
        err
    })?;
    server.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::http::ResponseBuilder;
    use crate::router::RouterBuilder;
    use std::io::{Read, Write};
    use std::path::PathBuf;

    fn test_config(www_root: PathBuf) -> Config {
        Config {
            port: 0,
            www_root,
            poll_interval_ms: 5,
            ..Config::default()
        }
    }

    #[test]
    fn test_bind_rejects_missing_www_root() {
        let config = test_config(PathBuf::from("/no/such/www"));
        let result = Server::bind(&config, Router::new());

        assert!(matches!(
            result,
            Err(ServerError::Config(ConfigError::WwwRootNotFound(_)))
        ));
    }

    #[test]
    fn test_bind_port_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let first = Server::bind(&test_config(dir.path().to_path_buf()), Router::new()).unwrap();
        let port = first.local_addr().unwrap().port();

        let mut config = test_config(dir.path().to_path_buf());
        config.port = port;
        let second = Server::bind(&config, Router::new());

        assert!(matches!(second, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_serves_requests_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let router = RouterBuilder::new()
            .get("/ping", |_| Ok(ResponseBuilder::ok().text("pong").build()))
            .build();

        let server = Server::bind(&test_config(dir.path().to_path_buf()), router).unwrap();
        let port = server.local_addr().unwrap().port();
        assert_eq!(server.router().len(), 1);
        thread::spawn(move || server.run());

        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream.write_all(b"GET /ping HTTP/1.1\r\n\r\n").unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();

        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.ends_with("\r\n\r\npong"));
    }

    fn send(port: u16, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stream.write_all(raw).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    }

    #[test]
    fn test_idle_clients_do_not_freeze_accept_loop() {
        let dir = tempfile::tempdir().unwrap();
        let router = RouterBuilder::new()
            .get("/ping", |_| Ok(ResponseBuilder::ok().text("pong").build()))
            .build();

        let mut config = test_config(dir.path().to_path_buf());
        config.max_workers = 2;
        let server = Server::bind(&config, router).unwrap();
        let port = server.local_addr().unwrap().port();
        thread::spawn(move || server.run());

        // Ocupan los dos workers sin enviar nada
        let idle: Vec<_> = (0..2)
            .map(|_| TcpStream::connect(("127.0.0.1", port)).unwrap())
            .collect();

        let reply = send(port, b"GET /ping HTTP/1.1\r\n\r\n");
        assert!(reply.starts_with("HTTP/1.1 503 Service Unavailable\r\n"), "got: {}", reply);

        // Al cerrar los ociosos se liberan los permisos
        drop(idle);
        let mut reply = String::new();
        for _ in 0..100 {
            reply = send(port, b"GET /ping HTTP/1.1\r\n\r\n");
            if reply.starts_with("HTTP/1.1 200 OK") {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert!(reply.ends_with("pong"), "got: {}", reply);
    }
}
