use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::discovery::{run_blocking, CandidateProvider, ProviderError, ProviderSource};
use crate::model::CandidateItem;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandTable {
    commands: Vec<CommandEntry>,
    command_bars: Vec<CommandEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandEntry {
    name: String,
    token: String,
    weight: f64,
}

/// Commands (or command-bar buttons) declared in a JSON5 table:
///
/// ```json5
/// {
///   commands: [{ name: "Build Solution", token: "Build.BuildSolution", weight: 2 }],
///   command_bars: [{ name: "Save All", token: "File.SaveAll" }],
/// }
/// ```
pub struct CommandTableProvider {
    table_path: PathBuf,
    source: ProviderSource,
}

impl CommandTableProvider {
    pub fn commands(table_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            source: ProviderSource::Commands,
        }
    }

    pub fn command_bars(table_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            source: ProviderSource::CommandBars,
        }
    }
}

#[async_trait]
impl CandidateProvider for CommandTableProvider {
    fn provider_name(&self) -> &'static str {
        match self.source {
            ProviderSource::CommandBars => "command-bars",
            _ => "command-table",
        }
    }

    fn source(&self) -> ProviderSource {
        self.source
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        let table_path = self.table_path.clone();
        let provider_source = self.source;
        run_blocking(move || {
            let raw = std::fs::read_to_string(&table_path).map_err(|source| ProviderError::Io {
                path: table_path.clone(),
                source,
            })?;
            parse_command_table(&raw, &table_path, provider_source)
        })
        .await
    }
}

pub fn parse_command_table(
    raw: &str,
    path: &Path,
    source: ProviderSource,
) -> Result<Vec<CandidateItem>, ProviderError> {
    let table: CommandTable = json5::from_str(raw).map_err(|error| ProviderError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;

    let entries = match source {
        ProviderSource::CommandBars => table.command_bars,
        _ => table.commands,
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name.trim().is_empty() || entry.token.trim().is_empty() {
            tracing::warn!(
                table = %path.display(),
                name = %entry.name,
                "command entry without name or token skipped"
            );
            continue;
        }
        let item = match source {
            ProviderSource::CommandBars => CandidateItem::known_command(&entry.name, &entry.token),
            _ => CandidateItem::command(&entry.name, &entry.token),
        };
        items.push(item.with_weight(entry.weight));
    }

    Ok(items)
}
