use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use futures::executor::block_on;
use serde::Serialize;

use crate::command_table::CommandTableProvider;
use crate::config::{self, Config, ConfigError};
use crate::discovery::{CandidateProvider, SearchType, WorkspaceFileProvider};
use crate::host::{CloseReason, CommandHost, DismissalHost, HostError, Hosts, NavigationHost};
use crate::model::{CandidateItem, CandidatePayload};
use crate::session::{SearchSession, SessionError};
use crate::symbols::TagsSymbolProvider;
use crate::transport::handle_json;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "quickopen-core",
    about = "Quick-open search session served as JSON lines over stdin/stdout"
)]
pub struct CliOptions {
    /// Which candidates to load.
    #[arg(long, value_enum, default_value = "files")]
    pub search_type: SearchType,
    /// Config file (TOML, or JSON5 for .json/.json5).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the effective config to stderr before serving.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, clap::Error> {
    CliOptions::try_parse_from(
        std::iter::once("quickopen-core".to_string()).chain(args.iter().cloned()),
    )
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    if options.print_config {
        match toml::to_string_pretty(&config) {
            Ok(encoded) => eprintln!("# {}\n{encoded}", config.config_path.display()),
            Err(error) => eprintln!("[quickopen-core] cannot print config: {error}"),
        }
    }

    match crate::logging::init(&config.log_filter) {
        Ok(path) => tracing::info!(log_path = %path.display(), "logging initialised"),
        Err(error) => eprintln!("[quickopen-core] logging disabled: {error}"),
    }

    let output = Arc::new(Mutex::new(std::io::stdout()));
    let hosts = Hosts::shared(Arc::new(JsonEffectHost::new(Arc::clone(&output))));
    let mut session = SearchSession::new(config.session_options(options.search_type), hosts)
        .with_providers(runtime_providers(&config));

    let summary = block_on(session.load())?;
    let failed: Vec<String> = summary
        .failures
        .iter()
        .map(|failure| format!("{}: {}", failure.provider, failure.error))
        .collect();
    emit(
        &output,
        &EventLine::Loaded {
            candidates: summary.candidate_count,
            failed_providers: failed,
        },
    )?;

    let stdin = std::io::stdin();
    serve(&mut session, stdin.lock(), &output)
}

/// Answers one JSON request per input line until the session closes or the
/// input ends.
pub fn serve<R, W>(
    session: &mut SearchSession,
    input: R,
    output: &Mutex<W>,
) -> Result<(), RuntimeError>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = block_on(handle_json(session, &line));
        write_line(output, &response)?;

        if session.is_closed() {
            break;
        }
    }
    Ok(())
}

/// Providers described by the config; the session keeps only the ones its
/// search type needs.
pub fn runtime_providers(config: &Config) -> Vec<Box<dyn CandidateProvider>> {
    let mut providers: Vec<Box<dyn CandidateProvider>> = vec![Box::new(WorkspaceFileProvider::new(
        config.file_roots.clone(),
        config.file_max_depth,
        config.file_exclude_roots.clone(),
    ))];

    if let Some(tags_path) = &config.tags_path {
        providers.push(Box::new(TagsSymbolProvider::new(tags_path.clone())));
    }

    if let Some(table_path) = &config.command_table_path {
        providers.push(Box::new(CommandTableProvider::commands(table_path.clone())));
        providers.push(Box::new(CommandTableProvider::command_bars(table_path.clone())));
    }

    providers
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventLine {
    Loaded {
        candidates: usize,
        failed_providers: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
enum EffectLine<'a> {
    GoToFile { path: &'a str },
    GoToSymbol { path: &'a str, line: u32 },
    Execute { token: &'a str },
    Dismiss { reason: CloseReason },
}

/// Host side of the stdio bridge: every collaborator call becomes one JSON
/// line on the shared output, in call order.
pub struct JsonEffectHost<W> {
    output: Arc<Mutex<W>>,
}

impl<W: Write> JsonEffectHost<W> {
    pub fn new(output: Arc<Mutex<W>>) -> Self {
        Self { output }
    }

    fn send(&self, line: &EffectLine<'_>) -> Result<(), HostError> {
        emit(&self.output, line).map_err(|error| HostError::new(error.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> NavigationHost for JsonEffectHost<W> {
    async fn go_to_file(&self, item: &CandidateItem) -> Result<(), HostError> {
        match &item.payload {
            CandidatePayload::File { path, .. } => self.send(&EffectLine::GoToFile { path }),
            _ => Err(HostError::new(format!("'{}' is not a file", item.name))),
        }
    }

    async fn go_to_symbol(&self, item: &CandidateItem) -> Result<(), HostError> {
        match &item.payload {
            CandidatePayload::Symbol {
                container_path,
                line,
                ..
            } => self.send(&EffectLine::GoToSymbol {
                path: container_path,
                line: *line,
            }),
            _ => Err(HostError::new(format!("'{}' is not a symbol", item.name))),
        }
    }
}

#[async_trait]
impl<W: Write + Send> CommandHost for JsonEffectHost<W> {
    async fn execute(&self, invocation_token: &str) -> Result<(), HostError> {
        self.send(&EffectLine::Execute {
            token: invocation_token,
        })
    }
}

impl<W: Write + Send> DismissalHost for JsonEffectHost<W> {
    fn dismiss(&self, reason: CloseReason) {
        if let Err(error) = self.send(&EffectLine::Dismiss { reason }) {
            tracing::warn!(%error, "dismiss notification not delivered");
        }
    }
}

fn emit<W: Write, T: Serialize>(output: &Mutex<W>, value: &T) -> Result<(), std::io::Error> {
    let encoded = serde_json::to_string(value).map_err(std::io::Error::other)?;
    write_line(output, &encoded)
}

fn write_line<W: Write>(output: &Mutex<W>, line: &str) -> Result<(), std::io::Error> {
    let mut guard = output
        .lock()
        .map_err(|_| std::io::Error::other("output lock poisoned"))?;
    writeln!(guard, "{line}")?;
    guard.flush()
}
