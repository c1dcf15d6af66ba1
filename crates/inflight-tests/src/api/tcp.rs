//! API implementation talking to a real `inflight-server` over TCP

use std::net::SocketAddr;
use std::sync::Arc;

use eyre::{eyre, Result};
use inflight_core::{Config, Response};
use inflight_engine::Seed;
use inflight_server::{Server, ServerHandle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task;

use super::Api;

pub struct TcpBackend {
    handle: ServerHandle,
}

/// Start a server on an ephemeral loopback port
///
/// Host and port of `config` are ignored so tests can run in parallel.
pub async fn start(config: Config, seed: Seed) -> Result<(TcpBackend, Api)> {
    let handle = task::spawn_blocking(move || -> Result<ServerHandle> {
        let dispatcher = Arc::new(inflight_engine::launch_with_seed(&config, &seed)?);
        Ok(Server::bind(("127.0.0.1", 0), dispatcher)?.spawn()?)
    })
    .await??;
    let api = Api::tcp(handle.local_addr());
    Ok((TcpBackend { handle }, api))
}

impl TcpBackend {
    pub fn open_connections(&self) -> usize {
        self.handle.open_connections()
    }

    pub async fn shutdown(self) -> Result<()> {
        task::spawn_blocking(move || self.handle.shutdown()).await?;
        Ok(())
    }
}

/// A client connection speaking newline-delimited JSON
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    line: String,
}

impl Connection {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (reader, writer) = TcpStream::connect(addr).await?.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            line: String::new(),
        })
    }

    /// Write raw bytes without waiting for an answer
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read the next response line
    pub async fn read_response(&mut self) -> Result<Response> {
        self.line.clear();
        if self.reader.read_line(&mut self.line).await? == 0 {
            return Err(eyre!("server closed the connection"));
        }
        Ok(serde_json::from_str(self.line.trim_end())?)
    }

    pub async fn round_trip(&mut self, line: &str) -> Result<Response> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        self.read_response().await
    }
}
