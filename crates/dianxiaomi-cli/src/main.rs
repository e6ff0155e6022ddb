//! dianxiaomi CLI
//!
//! Serves single API requests against a configured store, lists routes and
//! manages API key hashes and request nonces.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dianxiaomi_auth::{generate_api_key, hash_api_key, validate_api_key, REST_ACTION};
use dianxiaomi_cli::{format_response, parse_pair, App, AppConfig, RequestArgs};

/// Command-line front end for the Dianxiaomi order API.
#[derive(Parser)]
#[command(name = "dianxiaomi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file with server settings, users and orders.
    #[arg(short, long, env = "DIANXIAOMI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one request and print the response.
    ServeRequest {
        /// HTTP method.
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, e.g. `/orders/1`.
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Query parameter as KEY=VALUE (repeatable).
        #[arg(short, long, value_parser = |s: &str| parse_pair(s, '='))]
        query: Vec<(String, String)>,

        /// Form body field as KEY=VALUE (repeatable).
        #[arg(short, long, value_parser = |s: &str| parse_pair(s, '='), conflicts_with = "body")]
        form: Vec<(String, String)>,

        /// Header as KEY:VALUE (repeatable).
        #[arg(short = 'H', long, value_parser = |s: &str| parse_pair(s, ':'))]
        header: Vec<(String, String)>,

        /// Raw request body, usually JSON.
        #[arg(short, long)]
        body: Option<String>,
    },

    /// List the visible routes and their verbs.
    Routes,

    /// Print an Argon2 hash of an API key for the config file.
    HashKey {
        /// The key to hash. A fresh key is generated if omitted.
        key: Option<String>,
    },

    /// Issue a request nonce for a configured user.
    IssueNonce {
        /// User id.
        #[arg(short, long)]
        user: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::ServeRequest {
            method,
            path,
            query,
            form,
            header,
            body,
        } => {
            let app = App::build(config)?;
            let request = RequestArgs {
                method,
                path,
                query,
                form,
                headers: header,
                body,
            }
            .into_request();

            let response = app.server.serve(&request);
            println!("{}", format_response(&response));
        }

        Commands::Routes => {
            let app = App::build(config)?;
            for route in app.server.router().describe() {
                let data = if route.accepts_data { " [data]" } else { "" };
                println!(
                    "{:<28} {}{}",
                    route.supports.join(","),
                    route.pattern,
                    data
                );
            }
        }

        Commands::HashKey { key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    let key = generate_api_key();
                    println!("key:  {key}");
                    key
                }
            };
            validate_api_key(&key)?;
            println!("hash: {}", hash_api_key(&key)?);
        }

        Commands::IssueNonce { user } => {
            if !config.users.iter().any(|u| u.id == user) {
                bail!("no user with id {user} in the config");
            }
            let app = App::build(config)?;
            let nonce = app.nonces.issue(user, REST_ACTION);
            info!(user, "issued nonce, valid for this process only");
            println!("{nonce}");
        }
    }

    Ok(())
}
