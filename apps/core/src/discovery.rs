use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::model::CandidateItem;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Where a provider's items come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    Files,
    Symbols,
    Commands,
    CommandBars,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Files,
    Symbols,
    Commands,
    CommandBars,
    Mixed,
}

impl SearchType {
    pub fn sources(self) -> &'static [ProviderSource] {
        match self {
            Self::Files => &[ProviderSource::Files],
            Self::Symbols => &[ProviderSource::Symbols],
            Self::Commands => &[ProviderSource::Commands],
            Self::CommandBars => &[ProviderSource::CommandBars],
            Self::Mixed => &[ProviderSource::Files, ProviderSource::Symbols],
        }
    }

    pub fn includes(self, source: ProviderSource) -> bool {
        self.sources().contains(&source)
    }
}

#[async_trait]
pub trait CandidateProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;
    fn source(&self) -> ProviderSource;
    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError>;
}

#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: ProviderError,
}

/// Snapshot produced by one aggregation pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub candidates: Vec<CandidateItem>,
    pub failures: Vec<ProviderFailure>,
}

/// Polls every provider relevant to `search_type` concurrently and
/// concatenates their output in registration order. A failing provider
/// contributes nothing; the rest still load.
pub async fn aggregate(
    providers: &[Box<dyn CandidateProvider>],
    search_type: SearchType,
) -> LoadReport {
    let selected: Vec<&dyn CandidateProvider> = providers
        .iter()
        .map(|provider| provider.as_ref())
        .filter(|provider| search_type.includes(provider.source()))
        .collect();

    let outcomes = join_all(selected.iter().map(|provider| provider.enumerate())).await;

    let mut report = LoadReport::default();
    for (provider, outcome) in selected.into_iter().zip(outcomes) {
        match outcome {
            Ok(items) => {
                let before = report.candidates.len();
                report.candidates.extend(
                    items
                        .into_iter()
                        .filter(|item| !item.name.trim().is_empty()),
                );
                tracing::debug!(
                    provider = provider.provider_name(),
                    items = report.candidates.len() - before,
                    "provider enumerated"
                );
            }
            Err(error) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    %error,
                    "provider unavailable; continuing without it"
                );
                report.failures.push(ProviderFailure {
                    provider: provider.provider_name(),
                    error,
                });
            }
        }
    }

    report
}

/// Runs blocking provider work (disk walks, file reads) on its own thread.
/// The returned future resolves with the job's result.
pub async fn run_blocking<T, F>(job: F) -> Result<T, ProviderError>
where
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
    T: Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    std::thread::Builder::new()
        .name("quickopen-provider".into())
        .spawn(move || {
            let _ = sender.send(job());
        })
        .map_err(|error| {
            ProviderError::Unavailable(format!("cannot start provider thread: {error}"))
        })?;

    receiver
        .await
        .map_err(|_| ProviderError::Unavailable("provider thread ended without a result".into()))?
}

/// Serves a fixed list of items; used for fixtures and embedders that already
/// hold their candidates in memory.
pub struct StaticProvider {
    name: &'static str,
    source: ProviderSource,
    items: Vec<CandidateItem>,
}

impl StaticProvider {
    pub fn new(name: &'static str, source: ProviderSource, items: Vec<CandidateItem>) -> Self {
        Self {
            name,
            source,
            items,
        }
    }

    pub fn files(items: Vec<CandidateItem>) -> Self {
        Self::new("static-files", ProviderSource::Files, items)
    }

    pub fn symbols(items: Vec<CandidateItem>) -> Self {
        Self::new("static-symbols", ProviderSource::Symbols, items)
    }

    pub fn commands(items: Vec<CandidateItem>) -> Self {
        Self::new("static-commands", ProviderSource::Commands, items)
    }

    pub fn deterministic_fixture() -> Self {
        Self::files(vec![
            CandidateItem::file("readme.md", "/workspace/readme.md", "readme.md"),
            CandidateItem::file("main.rs", "/workspace/src/main.rs", "src/main.rs"),
            CandidateItem::file("Makefile", "/workspace/Makefile", "Makefile"),
        ])
    }
}

#[async_trait]
impl CandidateProvider for StaticProvider {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> ProviderSource {
        self.source
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        Ok(self.items.clone())
    }
}

/// Lists files under a set of workspace roots. Hidden entries are skipped.
#[derive(Debug, Clone)]
pub struct WorkspaceFileProvider {
    roots: Vec<PathBuf>,
    max_depth: usize,
    exclude_roots: Vec<PathBuf>,
}

impl WorkspaceFileProvider {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize, exclude_roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            max_depth,
            exclude_roots,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_roots
            .iter()
            .any(|excluded| path.starts_with(excluded))
    }

    fn walk_all(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        let mut items = Vec::new();
        let mut last_error = None;
        let mut any_root_ok = false;

        for root in &self.roots {
            match self.walk_root(root) {
                Ok(found) => {
                    any_root_ok = true;
                    items.extend(found);
                }
                Err(error) => {
                    tracing::warn!(root = %root.display(), %error, "workspace root skipped");
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) if !any_root_ok => Err(error),
            _ => Ok(items),
        }
    }

    fn walk_root(&self, root: &Path) -> Result<Vec<CandidateItem>, ProviderError> {
        if !root.is_dir() {
            return Err(ProviderError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "workspace root is not a directory",
                ),
            });
        }

        let mut items = Vec::new();
        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                (entry.depth() == 0 || !is_hidden(entry)) && !self.is_excluded(entry.path())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::debug!(%error, "skipping unreadable workspace entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            items.push(CandidateItem::file(
                &name,
                path.to_string_lossy().as_ref(),
                &relative,
            ));
        }

        Ok(items)
    }
}

#[async_trait]
impl CandidateProvider for WorkspaceFileProvider {
    fn provider_name(&self) -> &'static str {
        "workspace-files"
    }

    fn source(&self) -> ProviderSource {
        ProviderSource::Files
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        let provider = self.clone();
        run_blocking(move || provider.walk_all()).await
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
