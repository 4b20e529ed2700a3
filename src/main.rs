//! ZetaKV - An In-Memory Key-Value Store with Sorted Sets
//!
//! This is the main entry point for the ZetaKV server.
//! It parses configuration, binds the TCP listener, and runs the server
//! until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zetakv::server::Server;
use zetakv::storage::{KvStore, DEFAULT_SHARD_COUNT};

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Number of storage shards
    shards: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: zetakv::DEFAULT_HOST.to_string(),
            port: zetakv::DEFAULT_PORT,
            shards: DEFAULT_SHARD_COUNT,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--shards" => {
                    if i + 1 < args.len() {
                        config.shards = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid shard count");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --shards requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("ZetaKV version {}", zetakv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
ZetaKV - An In-Memory Key-Value Store with Sorted Sets

USAGE:
    zetakv [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 7379)
        --shards <COUNT>     Number of storage shards (default: 16)
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    zetakv                         # Start on 127.0.0.1:7379
    zetakv --port 7400             # Start on port 7400
    zetakv --host 0.0.0.0          # Listen on all interfaces

CONNECTING:
    Commands are plain text lines; replies use RESP framing:
    $ nc 127.0.0.1 7379
    SET name zeta
    +OK
    ZADD board alice 100
    :1
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
ZetaKV v{} - In-Memory Key-Value Store with Sorted Sets
──────────────────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        zetakv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Create the store (shared across all connections)
    let store = Arc::new(KvStore::with_shards(config.shards));
    info!("Store initialized with {} shards", config.shards);

    // Bind the TCP listener
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", config.bind_address(), e))?;
    let (server, shutdown) = Server::bind(addr, Arc::clone(&store)).await?;
    info!("Listening on {}", config.bind_address());

    // Run the server on its own task so the signal handler can stop it
    let server_task = tokio::spawn(server.run());

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping server...");
    shutdown.stop();

    server_task.await?;

    let stats = store.stats();
    info!(
        keys = stats.keys,
        read_ops = stats.read_ops,
        write_ops = stats.write_ops,
        "Final store statistics"
    );
    info!("Server shutdown complete");
    Ok(())
}
