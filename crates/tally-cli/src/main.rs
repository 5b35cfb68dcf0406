use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tally_core::app::BuildError;
use tally_core::domain::{CreatePollRequest, PollId};
use tally_core::impls::{FixedIdentity, InMemoryLedger};
use tally_core::ports::{Ledger, LedgerError};
use tally_core::{EngineBuilder, EngineConfig, PollEngine, PollError};

mod file_ledger;

use file_ledger::FileLedger;

const USAGE: &str = "\
usage:
  tally-cli invoke <function> [args...]   createPoll | vote | closePoll
  tally-cli query  <function> [args...]   getPoll | getVotes | getVoteCount
  tally-cli demo                          concurrent voting on an in-memory ledger

environment:
  TALLY_DATA_DIR  ledger directory (default: .tally)
  TALLY_CONFIG    engine config JSON file
  TALLY_USER      identity used for create/vote/close (default: config default_owner)
  RUST_LOG        log filter (default: info)";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] tally_core::config::ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

/// stderr に出すエラー（呼び出し側が kind で分岐できるように JSON）
#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: String,
    error: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("{message}\n\n{USAGE}");
            ExitCode::from(2)
        }
        Err(CliError::Poll(err)) => {
            let report = ErrorReport {
                kind: format!("{:?}", err.kind()),
                error: err.to_string(),
            };
            match serde_json::to_string(&report) {
                Ok(line) => eprintln!("{line}"),
                Err(_) => eprintln!("{}: {}", report.kind, report.error),
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(CliError::Usage("missing command".into()));
    };
    match command.as_str() {
        "invoke" | "query" => {
            let Some((function, fn_args)) = rest.split_first() else {
                return Err(CliError::Usage(format!("{command} needs a function name")));
            };
            let data_dir =
                std::env::var("TALLY_DATA_DIR").unwrap_or_else(|_| ".tally".to_string());
            let engine = build_engine(Arc::new(FileLedger::open(&data_dir).await?))?;

            if command.as_str() == "invoke" {
                engine.invoke(function, fn_args).await?;
                info!(function = %function, "ok");
            } else {
                let bytes = engine.query(function, fn_args).await?;
                println!("{}", pretty(&bytes));
            }
            Ok(())
        }
        "demo" => run_demo().await,
        other => Err(CliError::Usage(format!("unknown command: {other}"))),
    }
}

fn load_config() -> Result<EngineConfig, CliError> {
    match std::env::var("TALLY_CONFIG") {
        Ok(path) => Ok(EngineConfig::from_json_file(path)?),
        Err(_) => Ok(EngineConfig::default()),
    }
}

fn build_engine(ledger: Arc<dyn Ledger>) -> Result<PollEngine, CliError> {
    let mut builder = EngineBuilder::new(load_config()?).ledger_arc(ledger);
    if let Ok(user) = std::env::var("TALLY_USER") {
        builder = builder.identity(FixedIdentity::new(user));
    }
    Ok(builder.build()?)
}

fn pretty(bytes: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// デモ：同じ poll に並行して投票し、票が失われないことを見せる
async fn run_demo() -> Result<(), CliError> {
    // (A) in-memory ledger の上に engine を用意
    let engine = build_engine(Arc::new(InMemoryLedger::new()))?;

    // (B) poll を作成
    let id = PollId::generate();
    engine
        .create_poll(CreatePollRequest::new(
            id.as_str(),
            "Lunch",
            "Where should we eat?",
            "100",
            ["Pizza", "Sushi", "Tacos"],
        ))
        .await?;
    println!("created poll: {id}");

    // (C) 投票者を並行に走らせる
    let ballots = [("Pizza", 7), ("Sushi", 12), ("Tacos", 5)];
    let mut voters = Vec::new();
    for (option, times) in ballots {
        let engine = engine.clone();
        let id = id.clone();
        voters.push(tokio::spawn(async move {
            for _ in 0..times {
                engine.cast_vote(id.as_str(), option).await?;
            }
            Ok::<_, PollError>(())
        }));
    }
    for voter in voters {
        match voter.await {
            Ok(result) => result?,
            Err(e) => warn!(error = %e, "voter task failed"),
        }
    }

    // (D) 無効な選択肢は拒否される
    if let Err(err) = engine.cast_vote(id.as_str(), "Burgers").await {
        println!("rejected: {err}");
    }

    // (E) 締め切って集計
    engine.close_poll(id.as_str()).await?;
    let tally = engine.get_vote_counts(id.as_str()).await?;
    for count in tally.iter() {
        println!("{:>6}: {}", count.option, count.count);
    }
    println!("total: {}", tally.total());
    Ok(())
}
