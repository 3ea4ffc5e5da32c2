mod cli;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cove_link::{
    EnvelopeCipher, HostRequest, HostRequestId, InMemoryMetadataStore, InMemorySessionStore,
    ReconciliationEngine, Session, SessionSecret,
};
use cove_relay::RelayClient;

use crate::cli::{Cli, Commands};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Default to WARN when RUST_LOG is not set.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(relay_url) = cli.relay_url.clone() {
        config.relay_url = relay_url;
    }

    match cli.command {
        Commands::Link { session, secret } => link(&config, session, &secret).await,
        Commands::Watch {
            session,
            secret,
            poll_ms,
        } => {
            if let Some(poll_ms) = poll_ms {
                config.poll_ms = poll_ms;
            }
            watch(&config, session, &secret).await
        }
    }
}

fn parse_session(config: &Config, id: String, secret_hex: &str) -> Result<Session> {
    let secret = SessionSecret::from_hex(secret_hex).context("session secret")?;
    Ok(Session {
        id,
        secret,
        server_url: config.relay_url.clone(),
    })
}

fn build_engine(config: &Config, session: &Session) -> Result<ReconciliationEngine> {
    let relay = RelayClient::new(&config.relay_url).context("relay client")?;
    let sessions = Arc::new(InMemorySessionStore::new());
    sessions.link(session.clone());
    Ok(ReconciliationEngine::new(
        sessions,
        Arc::new(relay),
        Arc::new(EnvelopeCipher::new()),
        Arc::new(InMemoryMetadataStore::new()),
    ))
}

async fn link(config: &Config, id: String, secret_hex: &str) -> Result<()> {
    let session = parse_session(config, id, secret_hex)?;
    let engine = build_engine(config, &session)?;
    let pending = engine.pending_requests(&session).await;
    info!(session_id = %session.id, "session linked");
    println!(
        "linked session {} at {} ({} request(s) already pending)",
        session.id,
        config.relay_url,
        pending.len()
    );
    Ok(())
}

async fn watch(config: &Config, id: String, secret_hex: &str) -> Result<()> {
    let session = parse_session(config, id, secret_hex)?;
    let engine = build_engine(config, &session)?;
    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_ms.max(1)));
    println!(
        "watching session {} at {} (ctrl-c to stop)",
        session.id, config.relay_url
    );
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                for request in engine.pending_requests(&session).await {
                    print_request(&request);
                }
            }
        }
    }
}

fn dapp_label(id: &HostRequestId) -> &str {
    id.dapp_name.as_deref().unwrap_or(id.dapp_url.as_str())
}

fn print_request(request: &HostRequest) {
    let id = request.id();
    match request {
        HostRequest::DappPermission { .. } => {
            println!(
                "[{}] {} asks to connect ({})",
                id.event_id,
                dapp_label(id),
                id.dapp_url
            );
        }
        HostRequest::SignMessage {
            address, message, ..
        } => {
            println!(
                "[{}] {} asks {} to sign: {}",
                id.event_id,
                dapp_label(id),
                address,
                message
            );
        }
        HostRequest::SignAndSubmitTx {
            to_address,
            wei_value,
            chain_id,
            should_submit,
            ..
        } => {
            println!(
                "[{}] {} asks to sign{} {} wei to {} on chain {}",
                id.event_id,
                dapp_label(id),
                if *should_submit { " and submit" } else { "" },
                wei_value,
                to_address,
                chain_id
            );
        }
        HostRequest::SubmitSignedTx {
            signed_tx,
            chain_id,
            ..
        } => {
            println!(
                "[{}] {} asks to broadcast {} signed byte(s) on chain {}",
                id.event_id,
                dapp_label(id),
                signed_tx.len(),
                chain_id
            );
        }
        HostRequest::RequestCanceled {
            target_request_id, ..
        } => {
            println!(
                "[{}] {} withdrew request {}",
                id.event_id,
                dapp_label(id),
                target_request_id
            );
        }
    }
}
