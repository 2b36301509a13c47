//! Bootstrap a persistent device session.
//!
//! Resolves a provider configuration from command line arguments,
//! derives the session key, and opens (or reuses) the session behind
//! the local daemon socket.
//!
//! # Prerequisites
//!
//! - A session daemon listening on the derived socket path under
//!   `~/.netpersist/pc/`
//!
//! # Usage
//!
//! ```bash
//! cargo run --example bootstrap_session -- --host 10.0.0.1 --user admin --os ios
//! ```

use std::env;

use netpersist::provider::{self, FallbackContext};
use netpersist::transport::UnixSocketTransport;
use netpersist::{ConnectionDefaults, ConnectionDescriptor, SessionManager};
use serde_json::{Map, json};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // The nested provider block a task would carry
    let mut nested = Map::new();
    nested.insert("host".to_string(), json!(args.host));
    nested.insert("port".to_string(), json!(args.port));
    nested.insert("username".to_string(), json!(args.user));
    if let Some(password) = &args.password {
        nested.insert("password".to_string(), json!(password));
    }

    let schema = provider::lookup(&args.os)?;
    let resolved = provider::resolve(
        &schema,
        &Map::new(),
        &Map::new(),
        &nested,
        &FallbackContext::new(),
    );
    println!("Resolved provider: {resolved:?}");

    let descriptor = ConnectionDescriptor::from_provider(
        &resolved,
        ConnectionDefaults::new(),
        Some(args.os.clone()),
    )?;

    let manager = SessionManager::new()?;
    let handle = manager
        .deriver()
        .derive(&descriptor.host, descriptor.port, &descriptor.user);
    println!("Session key: {handle}");

    println!("Connecting to session socket...");
    let mut transport = UnixSocketTransport::connect(handle.path(), descriptor.timeout).await?;

    let bootstrap = manager.ensure_session(descriptor, &mut transport).await?;
    if bootstrap.reused {
        println!("Reusing open session at {}", bootstrap.handle);
    } else {
        println!("Opened new session at {}", bootstrap.handle);
    }

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    os: String,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "admin".to_string());
        let mut password = None;
        let mut os = "ios".to_string();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--os" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        os = args[i].clone();
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            os,
        }
    }

    fn print_help() {
        println!(
            r#"netpersist bootstrap_session example

USAGE:
    cargo run --example bootstrap_session -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target device [default: localhost]
    -p, --port <PORT>        SSH port [default: 22]
    -u, --user <USER>        Username [default: $USER]
    -P, --password <PASS>    Password for authentication
    -o, --os <OS>            Network OS (ios, eos, junos, nxos) [default: ios]
    --help                   Print this help message

EXAMPLES:
    # Bootstrap a session to an IOS device
    cargo run --example bootstrap_session -- --host 10.0.0.1 --user admin --password secret

    # Junos device on a non-standard port
    cargo run --example bootstrap_session -- --host fw1 --port 2222 --user admin --os junos
"#
        );
    }
}
