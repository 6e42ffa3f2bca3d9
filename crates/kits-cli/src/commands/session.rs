//! `kits session`: a kits page over JSON lines.
//!
//! Every frame the page sends is printed to stdout as one JSON object. Each
//! stdin line is either a JSON event object (e.g. `{"Button":"Claim:basic"}`)
//! or a slash command:
//!
//! - `/remaining <kit>` prints the remaining cooldown
//! - `/clear [kit]` clears one or all cooldowns
//! - `/quit` dismisses the page (so does end of input)

use anyhow::{Context, Result, bail};
use kits_application::KitsService;
use kits_core::cooldown::{CooldownLedger, SystemClock, format_remaining, remaining_secs};
use kits_core::scheduler::TokioScheduler;
use kits_core::session::{PageFrame, PageKind, SessionId, SubjectId};
use kits_infrastructure::{InMemoryInventory, TomlKitCatalog};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub fn run(store: &TomlKitCatalog, subject: String, capacity: usize) -> Result<()> {
    let config = store.load()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    runtime.block_on(async move {
        let inventory = Arc::new(InMemoryInventory::new(capacity));
        let subject = SubjectId::new(subject);
        inventory.join(subject.clone()).await;

        let service = KitsService::new(
            Arc::new(config.catalog()?),
            Arc::new(CooldownLedger::new(Arc::new(SystemClock))),
            inventory,
            Arc::new(TokioScheduler::new()),
            config.page_settings(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_frames(rx));
        let session_id = service
            .open_page(subject.clone(), PageKind::Kits, Arc::new(tx))
            .await?;

        let result = read_loop(&service, &session_id, &subject).await;

        service.shutdown().await;
        drop(service);
        if let Err(e) = printer.await {
            tracing::warn!("Frame printer stopped abnormally: {}", e);
        }
        result
    })
}

async fn print_frames(mut rx: mpsc::UnboundedReceiver<PageFrame>) {
    while let Some(frame) = rx.recv().await {
        match serde_json::to_string(&frame) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to encode frame: {}", e),
        }
        if frame.is_closed() {
            break;
        }
    }
}

async fn read_loop(service: &KitsService, session_id: &SessionId, subject: &SubjectId) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("quit"), _) => break,
                (Some("clear"), kit) => {
                    let cleared = service.clear_cooldowns(subject, kit);
                    eprintln!("Cleared {} cooldown(s)", cleared);
                }
                (Some("remaining"), Some(kit)) => match service.remaining(subject, kit) {
                    Ok(left) => eprintln!("{}: {}", kit, format_remaining(remaining_secs(left))),
                    Err(e) => eprintln!("{}", e),
                },
                _ => eprintln!("Unknown command: /{}", command),
            }
            continue;
        }

        let raw = match parse_event(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping input line: {}", e);
                continue;
            }
        };
        match service.handle_event(session_id, raw).await {
            Ok(Some(outcome)) => tracing::info!("Claim finished: {:?}", outcome),
            Ok(None) => {}
            Err(e) => tracing::warn!("Event rejected: {:#}", e),
        }
    }

    Ok(())
}

fn parse_event(line: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(line).context("invalid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_accepts_objects_only() {
        let map = parse_event(r#"{"Button": "Claim:basic"}"#).unwrap();
        assert_eq!(map["Button"], "Claim:basic");
        assert!(parse_event("[1]").is_err());
        assert!(parse_event("not json").is_err());
    }
}
