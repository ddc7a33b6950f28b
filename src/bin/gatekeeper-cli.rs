use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, HOST};
use serde_json::Value;

use edge_gatekeeper::config::{self, validation::config_warnings, ConfigError};
use edge_gatekeeper::security::{AdminDomainPolicy, AllowedOriginSet};

#[derive(Parser)]
#[command(name = "gatekeeper-cli")]
#[command(about = "Operator CLI for the edge gatekeeper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and print the effective policies
    CheckConfig {
        #[arg(short, long, env = "GATEKEEPER_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Fetch live status from a running gatekeeper
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Host header to send, normally the admin domain
        #[arg(long)]
        host: Option<String>,

        /// Admin session token
        #[arg(short, long)]
        session: Option<String>,

        #[arg(long, default_value = "session_token")]
        cookie_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig { config } => {
            let config = match config::load(config.as_deref()) {
                Ok(config) => config,
                Err(ConfigError::Validation(errors)) => {
                    for error in errors {
                        eprintln!("error: {error}");
                    }
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            };

            for warning in config_warnings(&config) {
                println!("warning: {warning}");
            }

            let origins = AllowedOriginSet::from_config(&config.site);
            let admin = AdminDomainPolicy::from_config(config.site.admin_domain.as_deref());
            let summary = serde_json::json!({
                "bind_address": config.listener.bind_address,
                "upstream": config.upstream.address,
                "allowed_origins": origins.iter().collect::<Vec<_>>(),
                "admin_domain": admin.describe(),
                "admin_sessions": config.admin.sessions.len(),
                "rate_limit": config.rate_limit,
                "trust_forwarded_headers": config.security.trust_forwarded_headers,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Status {
            url,
            host,
            session,
            cookie_name,
        } => {
            let mut headers = HeaderMap::new();
            if let Some(host) = host {
                headers.insert(HOST, HeaderValue::from_str(&host)?);
            }
            if let Some(session) = session {
                headers.insert(
                    COOKIE,
                    HeaderValue::from_str(&format!("{cookie_name}={session}"))?,
                );
            }

            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?;
            let res = client
                .get(format!("{}/admin/gatekeeper", url.trim_end_matches('/')))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status.is_redirection() {
        println!("Access denied: redirected ({status})");
        return Ok(());
    }

    let body: Value = res.json().await?;
    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Error ({status}): {}", body["error"].as_str().unwrap_or("unknown"));
    }
    Ok(())
}
