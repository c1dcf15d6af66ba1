use std::io;
use std::net::{
    IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use dashmap::DashMap;
use inflight_core::RequestHandler;
use tracing::{error, info};
use uuid::Uuid;

/// Open connections, keyed by a per-connection id
type Connections = DashMap<Uuid, TcpStream>;

/// Accepts client connections and hands each to its own thread
pub struct Server<H> {
    listener: TcpListener,
    handler: Arc<H>,
    connections: Arc<Connections>,
    stopping: Arc<AtomicBool>,
}

/// Handle to a server running on a background thread
pub struct ServerHandle {
    addr: SocketAddr,
    connections: Arc<Connections>,
    stopping: Arc<AtomicBool>,
    acceptor: JoinHandle<()>,
}

impl<H> Server<H>
where
    H: RequestHandler + Send + Sync + 'static,
{
    /// Bind the listening socket
    pub fn bind(addr: impl ToSocketAddrs, handler: Arc<H>) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            handler,
            connections: Arc::new(DashMap::new()),
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections on the calling thread
    ///
    /// Returns once [`ServerHandle::shutdown()`] was called on a handle
    /// obtained from [`Server::spawn()`]; a server started with `serve`
    /// directly runs until the process exits.
    pub fn serve(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "listening");
        }
        for stream in self.listener.incoming() {
            if self.stopping.load(Ordering::Acquire) {
                break;
            }
            match stream {
                Ok(stream) => self.open(stream),
                Err(err) => error!(%err, "accept failed"),
            }
        }
        info!("listener closed");
    }

    /// Accept connections on a background thread
    pub fn spawn(self) -> io::Result<ServerHandle> {
        let addr = self.local_addr()?;
        let connections = self.connections.clone();
        let stopping = self.stopping.clone();
        let acceptor = thread::Builder::new()
            .name(String::from("acceptor"))
            .spawn(move || self.serve())?;
        Ok(ServerHandle {
            addr,
            connections,
            stopping,
            acceptor,
        })
    }

    fn open(&self, stream: TcpStream) {
        let id = Uuid::new_v4();
        let peer = stream.peer_addr().ok();
        match stream.try_clone() {
            Ok(registered) => {
                self.connections.insert(id, registered);
            }
            Err(err) => {
                error!(%err, "could not register connection");
                return;
            }
        }
        let handler = self.handler.clone();
        let connections = self.connections.clone();
        let spawned = thread::Builder::new()
            .name(format!("connection-{}", id.simple()))
            .spawn(move || {
                info!(%id, ?peer, "connection opened");
                if let Err(err) = crate::connection::serve(stream, handler.as_ref()) {
                    info!(%id, %err, "connection failed");
                }
                connections.remove(&id);
                info!(%id, "connection closed");
            });
        if let Err(err) = spawned {
            error!(%err, "could not spawn connection thread");
            if let Some((_, stream)) = self.connections.remove(&id) {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

impl ServerHandle {
    /// Address the server is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of currently open client connections
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Stop accepting and close every open connection
    pub fn shutdown(self) {
        self.stopping.store(true, Ordering::Release);
        // wake the acceptor blocked in accept()
        let _ = TcpStream::connect(wake_addr(self.addr));
        if self.acceptor.join().is_err() {
            error!("acceptor thread panicked");
        }
        for entry in self.connections.iter() {
            let _ = entry.value().shutdown(Shutdown::Both);
        }
        self.connections.clear();
        info!("server shut down");
    }
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}
