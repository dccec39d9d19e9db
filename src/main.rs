// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DataSipper CLI
//!
//! Inspect event type identifiers and captured event exports.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};

use datasipper::export::{read_jsonl, to_jsonl, write_jsonl};
use datasipper::{
    CaptureConfig, CaptureStats, EventRecorder, FilterPolicy, NetworkEventType,
    WebSocketMessageType,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("datasipper=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "encode" => match args.get(2) {
            Some(name) => encode(name),
            None => usage_error("datasipper encode <variant>"),
        },
        "decode" => match args.get(2) {
            Some(identifier) => decode(identifier, args.iter().any(|a| a == "--strict")),
            None => usage_error("datasipper decode <identifier> [--strict]"),
        },
        "stats" => match args.get(2) {
            Some(path) => stats(path),
            None => usage_error("datasipper stats <file.jsonl>"),
        },
        "filter" => {
            let host = flag_value(&args, "--host");
            let url = flag_value(&args, "--url");
            match args.get(2) {
                Some(path) if host.is_some() || url.is_some() => filter(path, host, url),
                _ => usage_error("datasipper filter <file.jsonl> [--host <host>] [--url <regex>]"),
            }
        }
        "demo" => {
            let dir = args
                .get(2)
                .filter(|a| !a.starts_with("--"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("datasipper-demo"));
            let config = if args.iter().any(|a| a == "--audit") {
                CaptureConfig::for_auditing()
            } else {
                CaptureConfig::headers_only()
            };
            demo(dir, config).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("datasipper {}", datasipper::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"DataSipper - Network Event Model

USAGE:
    datasipper <COMMAND> [OPTIONS]

COMMANDS:
    encode <variant>                 Print the identifier for an event type
    decode <identifier> [--strict]   Print the event type for an identifier
    stats <file.jsonl>               Summarize an exported capture
    filter <file.jsonl> [--host <h>] [--url <regex>]
                                     Print events matching neither rule
    demo [dir] [--audit]             Record a sample capture into dir
    help                             Show this help message
    version                          Show version information

EXAMPLES:
    datasipper encode WebSocketDisconnect
    datasipper decode http_response
    datasipper decode not_a_real_type --strict
    datasipper stats datasipper-demo/tab-1-1700000000.jsonl
"#
    );
}

fn usage_error(usage: &str) -> anyhow::Result<()> {
    bail!("Usage: {}", usage)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn encode(name: &str) -> anyhow::Result<()> {
    let event_type = NetworkEventType::ALL
        .into_iter()
        .find(|t| format!("{:?}", t).eq_ignore_ascii_case(name))
        .with_context(|| format!("no event type named '{}'", name))?;
    println!("{}", event_type.as_str());
    Ok(())
}

fn decode(identifier: &str, strict: bool) -> anyhow::Result<()> {
    let event_type = if strict {
        identifier.parse::<NetworkEventType>()?
    } else {
        NetworkEventType::decode(identifier)
    };
    println!("{:?}", event_type);
    Ok(())
}

fn stats(path: &str) -> anyhow::Result<()> {
    let events = read_jsonl(path)?;
    let stats = CaptureStats::from_events(&events);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn filter(path: &str, host: Option<&str>, url: Option<&str>) -> anyhow::Result<()> {
    let mut policy = FilterPolicy::new();
    if let Some(host) = host {
        policy = policy.host(host);
    }
    if let Some(pattern) = url {
        policy = policy
            .url_pattern(pattern)
            .with_context(|| format!("bad --url pattern '{}'", pattern))?;
    }
    let mut events = read_jsonl(path)?;
    for event in &mut events {
        policy.apply(event);
    }
    events.retain(|e| !e.is_filtered);
    print!("{}", to_jsonl(&events)?);
    Ok(())
}

async fn demo(dir: PathBuf, config: CaptureConfig) -> anyhow::Result<()> {
    let recorder = EventRecorder::with_config(&config)?;
    let mut live = recorder.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Ok(event) = live.recv().await {
            seen += 1;
            tracing::info!(id = event.id, kind = %event.event_type, url = %event.url, "Live event");
        }
        seen
    });

    let http = {
        let recorder = recorder.clone();
        tokio::spawn(async move {
            let request = recorder.http_request(
                "tab-1",
                "GET",
                "https://example.com/api/items?page=1",
                "accept: application/json",
                "",
            )?;
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
            recorder.http_response(&request, 200, "content-type: application/json", "[]");
            recorder.error("tab-1", "https://offline.example.com/", -105, "ERR_NAME_NOT_RESOLVED")?;
            anyhow::Ok(())
        })
    };

    let websocket = {
        let recorder = recorder.clone();
        tokio::spawn(async move {
            let connect = recorder.websocket_connect("ws-1", "wss://example.com/live")?;
            recorder.websocket_message(&connect, WebSocketMessageType::Text, "subscribe", true);
            recorder.websocket_message(&connect, WebSocketMessageType::Ping, "", false);
            recorder.websocket_binary_message(&connect, &[0xde, 0xad, 0xbe, 0xef], false);
            recorder.websocket_disconnect(&connect, 1000, "done");
            anyhow::Ok(())
        })
    };

    http.await??;
    websocket.await??;

    for session in recorder.sessions() {
        let path = write_jsonl(&dir, &session, &recorder.events_for_session(&session))?;
        println!("Wrote {}", path.display());
    }

    let total = recorder.event_count();
    drop(recorder);
    let seen = watcher.await?;
    println!("Live subscriber saw {} of {} events", seen, total);
    Ok(())
}
