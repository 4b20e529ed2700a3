//! TCP Server
//!
//! Owns the listening socket and the accept loop. Each accepted connection
//! is spawned onto its own tokio task; tasks are tracked in a `JoinSet` so
//! that shutdown can wait for in-flight commands to finish.
//!
//! ## Shutdown
//!
//! [`Server::bind`] returns a [`ShutdownHandle`] alongside the server. The
//! handle signals over a watch channel; once signalled the accept loop stops
//! taking new connections and drains the tasks that are still running.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::KvStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// The listening server.
pub struct Server {
    listener: TcpListener,
    store: Arc<KvStore>,
    stats: Arc<ConnectionStats>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Handle used to signal the server to stop.
///
/// Cloning is cheap; any clone can trigger shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Signals the server to stop accepting connections and drain.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

impl Server {
    /// Binds a listener on `addr` backed by the given store.
    pub async fn bind(
        addr: SocketAddr,
        store: Arc<KvStore>,
    ) -> std::io::Result<(Self, ShutdownHandle)> {
        let listener = TcpListener::bind(addr).await?;
        let (tx, rx) = watch::channel(false);

        let server = Self {
            listener,
            store,
            stats: Arc::new(ConnectionStats::new()),
            shutdown_rx: rx,
        };
        let handle = ShutdownHandle { tx: Arc::new(tx) };

        Ok((server, handle))
    }

    /// The address the server is actually listening on.
    ///
    /// Useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Connection statistics for this server.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Runs the accept loop until shutdown is signalled, then drains
    /// in-flight connections.
    pub async fn run(mut self) {
        info!(
            addr = %self.listener.local_addr().map(|a| a.to_string()).unwrap_or_default(),
            "Server listening"
        );

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let handler = CommandHandler::new(Arc::clone(&self.store));
                            let stats = Arc::clone(&self.stats);
                            connections.spawn(handle_connection(stream, addr, handler, stats));
                        }
                        Err(e) => {
                            // Transient accept failures (EMFILE etc.) should
                            // not take the server down.
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    // A closed channel means every handle was dropped with
                    // no way left to signal; treat it as a stop.
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                // Reap finished connection tasks so the set stays small.
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "Connection task panicked");
                    }
                }
            }
        }

        info!(
            active = connections.len(),
            "Shutdown requested, draining connections"
        );

        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                warn!(error = %e, "Connection task panicked");
            }
        }

        info!("Server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn start_server() -> (SocketAddr, Arc<KvStore>, ShutdownHandle) {
        let store = Arc::new(KvStore::new());
        let (server, handle) = Server::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&store))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        (addr, store, handle)
    }

    #[tokio::test]
    async fn test_serves_commands() {
        let (addr, store, _handle) = start_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"SET greeting hello\r\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+OK\r\n");

        assert_eq!(store.get(b"greeting").unwrap(), bytes::Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_multiple_clients_share_store() {
        let (addr, _, _handle) = start_server().await;

        let mut writer = TcpStream::connect(addr).await.unwrap();
        let mut reader = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 64];

        writer.write_all(b"SET shared yes\r\n").await.unwrap();
        let n = writer.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+OK\r\n");

        reader.write_all(b"GET shared\r\n").await.unwrap();
        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"$3\r\nyes\r\n");
    }

    #[tokio::test]
    async fn test_dropping_all_handles_stops_server() {
        let store = Arc::new(KvStore::new());
        let (server, handle) = Server::bind("127.0.0.1:0".parse().unwrap(), store)
            .await
            .unwrap();
        let task = tokio::spawn(server.run());

        // With no handle left, the server must wind down instead of
        // polling a closed channel forever.
        drop(handle);

        tokio::time::timeout(tokio::time::Duration::from_secs(2), task)
            .await
            .expect("server did not stop after all handles were dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let (addr, _, handle) = start_server().await;

        // Established connections keep working until they close
        let mut client = TcpStream::connect(addr).await.unwrap();

        handle.stop();
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut buf = [0u8; 64];
        client.write_all(b"SET k v\r\n").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+OK\r\n");
        drop(client);

        // New connections are refused (or reset immediately)
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        match TcpStream::connect(addr).await {
            Err(_) => {}
            Ok(mut late) => {
                // Listener backlog may still accept the handshake; any
                // write/read must then fail or return EOF.
                let _ = late.write_all(b"GET k\r\n").await;
                let mut buf = [0u8; 64];
                match tokio::time::timeout(
                    tokio::time::Duration::from_millis(500),
                    late.read(&mut buf),
                )
                .await
                {
                    Ok(Ok(0)) | Ok(Err(_)) | Err(_) => {}
                    Ok(Ok(n)) => panic!("unexpected reply after shutdown: {:?}", &buf[..n]),
                }
            }
        }
    }
}
