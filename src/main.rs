//!
//! podium server binary
//! --------------------
//! Command-line entry point for starting the podium HTTP server. Supports
//! configuration via CLI flags and environment variables.

use anyhow::Result;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.parse::<u16>().ok(),
        Err(_) => None,
    }
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag
            && i + 1 < args.len() {
                return args[i + 1].parse::<u16>().ok();
            }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("podium Server\n\nUSAGE:\n  podium [--http-port N]\n\nOPTIONS:\n  --http-port N       HTTP API port (env: PODIUM_HTTP_PORT, default 3000)\n\nENVIRONMENT:\n  PODIUM_JWT_SECRET   Token signing secret (default \"mysecret\"; set in production)\n");
        return Ok(());
    }

    // CLI arguments override environment
    let env_port = parse_port_env("PODIUM_HTTP_PORT");
    let arg_port = parse_port_arg(&args, "--http-port");
    let http_port = arg_port.or(env_port).unwrap_or(3000);

    let secret = env::var("PODIUM_JWT_SECRET").unwrap_or_else(|_| "mysecret".to_string());

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "podium",
        "podium starting: RUST_LOG='{}', http_port={}",
        rust_log, http_port
    );

    podium::server::run_with_port(http_port, secret.as_bytes()).await
}
