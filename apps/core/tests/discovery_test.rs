use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures::executor::block_on;
use quickopen_core::config::Config;
use quickopen_core::discovery::{
    aggregate, run_blocking, CandidateProvider, ProviderError, ProviderSource, SearchType,
    StaticProvider, WorkspaceFileProvider,
};
use quickopen_core::model::{CandidateItem, CandidateKind, CandidatePayload};
use quickopen_core::runtime::runtime_providers;

fn unique_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("quickopen-tests")
        .join(format!("{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

struct BrokenProvider;

#[async_trait]
impl CandidateProvider for BrokenProvider {
    fn provider_name(&self) -> &'static str {
        "broken"
    }

    fn source(&self) -> ProviderSource {
        ProviderSource::Files
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        Err(ProviderError::Unavailable("solution not open".into()))
    }
}

#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

struct SlowProvider {
    name: &'static str,
    in_flight: Arc<InFlight>,
}

#[async_trait]
impl CandidateProvider for SlowProvider {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> ProviderSource {
        ProviderSource::Files
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        let in_flight = Arc::clone(&self.in_flight);
        let name = self.name;
        run_blocking(move || {
            let now = in_flight.current.fetch_add(1, Ordering::SeqCst) + 1;
            in_flight.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(150));
            in_flight.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![CandidateItem::file(name, name, name)])
        })
        .await
    }
}

fn names(items: &[CandidateItem]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn aggregate_keeps_registration_order_and_isolates_failures() {
    let providers: Vec<Box<dyn CandidateProvider>> = vec![
        Box::new(StaticProvider::files(vec![CandidateItem::file(
            "b.rs", "/w/b.rs", "b.rs",
        )])),
        Box::new(BrokenProvider),
        Box::new(StaticProvider::files(vec![
            CandidateItem::file("a.rs", "/w/a.rs", "a.rs"),
            CandidateItem::file("   ", "/w/blank", "blank"),
        ])),
    ];

    let report = block_on(aggregate(&providers, SearchType::Files));

    assert_eq!(names(&report.candidates), vec!["b.rs", "a.rs"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "broken");
    assert!(matches!(
        report.failures[0].error,
        ProviderError::Unavailable(_)
    ));
}

#[test]
fn blocking_providers_run_concurrently() {
    let in_flight = Arc::new(InFlight::default());
    let providers: Vec<Box<dyn CandidateProvider>> = vec![
        Box::new(SlowProvider {
            name: "first.rs",
            in_flight: Arc::clone(&in_flight),
        }),
        Box::new(SlowProvider {
            name: "second.rs",
            in_flight: Arc::clone(&in_flight),
        }),
    ];

    let report = block_on(aggregate(&providers, SearchType::Files));

    assert_eq!(names(&report.candidates), vec!["first.rs", "second.rs"]);
    assert_eq!(in_flight.peak.load(Ordering::SeqCst), 2);
}

#[test]
fn aggregate_only_polls_sources_of_the_search_type() {
    let providers: Vec<Box<dyn CandidateProvider>> = vec![
        Box::new(StaticProvider::commands(vec![CandidateItem::command(
            "Build", "build",
        )])),
        Box::new(StaticProvider::symbols(vec![CandidateItem::symbol(
            "run", "/w/main.rs", 3, "fn",
        )])),
        Box::new(BrokenProvider),
        Box::new(StaticProvider::deterministic_fixture()),
    ];

    let commands = block_on(aggregate(&providers, SearchType::Commands));
    assert_eq!(names(&commands.candidates), vec!["Build"]);
    assert!(commands.failures.is_empty());

    let mixed = block_on(aggregate(&providers, SearchType::Mixed));
    assert_eq!(
        names(&mixed.candidates),
        vec!["run", "readme.md", "main.rs", "Makefile"]
    );
    assert_eq!(mixed.failures.len(), 1);
}

#[test]
fn workspace_walk_skips_hidden_and_excluded_entries() {
    let root = unique_dir("walk");
    touch(&root.join("src").join("main.rs"));
    touch(&root.join("README.md"));
    touch(&root.join(".git").join("HEAD"));
    touch(&root.join(".env"));
    touch(&root.join("target").join("debug").join("app"));

    let provider = WorkspaceFileProvider::new(vec![root.clone()], 12, vec![root.join("target")]);
    let items = block_on(provider.enumerate()).unwrap();

    assert_eq!(names(&items), vec!["README.md", "main.rs"]);
    match &items[1].payload {
        CandidatePayload::File {
            path,
            relative_path,
        } => {
            assert_eq!(PathBuf::from(path), root.join("src").join("main.rs"));
            assert_eq!(PathBuf::from(relative_path), Path::new("src").join("main.rs"));
        }
        other => panic!("expected file payload, got {other:?}"),
    }
}

#[test]
fn workspace_walk_respects_depth_limit() {
    let root = unique_dir("depth");
    touch(&root.join("top.txt"));
    touch(&root.join("a").join("b").join("deep.txt"));

    let provider = WorkspaceFileProvider::new(vec![root], 1, Vec::new());
    let items = block_on(provider.enumerate()).unwrap();

    assert_eq!(names(&items), vec!["top.txt"]);
}

#[test]
fn workspace_walk_fails_only_when_every_root_is_missing() {
    let root = unique_dir("roots");
    touch(&root.join("kept.rs"));
    let missing = root.join("does-not-exist");

    let partial = WorkspaceFileProvider::new(vec![missing.clone(), root], 4, Vec::new());
    assert_eq!(names(&block_on(partial.enumerate()).unwrap()), vec!["kept.rs"]);

    let none = WorkspaceFileProvider::new(vec![missing], 4, Vec::new());
    assert!(matches!(
        block_on(none.enumerate()),
        Err(ProviderError::Io { .. })
    ));
}

#[test]
fn runtime_providers_load_files_symbols_and_commands_from_config() {
    let root = unique_dir("runtime");
    touch(&root.join("src").join("lib.rs"));

    let tags_path = root.join("tags");
    std::fs::write(
        &tags_path,
        concat!(
            "!_TAG_FILE_FORMAT\t2\t/extended format/\n",
            "parse\tsrc/lib.rs\t/^pub fn parse() {$/;\"\tf\tline:7\n",
        ),
    )
    .unwrap();

    let table_path = root.join("commands.json5");
    std::fs::write(
        &table_path,
        r#"{
            commands: [{ name: "Build Solution", token: "Build.BuildSolution", weight: 2 }],
            command_bars: [{ name: "Save All", token: "File.SaveAll" }],
        }"#,
    )
    .unwrap();

    let config = Config {
        file_roots: vec![root.clone()],
        file_exclude_roots: vec![tags_path.clone(), table_path.clone()],
        tags_path: Some(tags_path),
        command_table_path: Some(table_path),
        ..Default::default()
    };
    let providers = runtime_providers(&config);
    assert_eq!(providers.len(), 4);

    let files = block_on(aggregate(&providers, SearchType::Files));
    assert_eq!(names(&files.candidates), vec!["lib.rs"]);

    let symbols = block_on(aggregate(&providers, SearchType::Symbols));
    assert_eq!(names(&symbols.candidates), vec!["parse"]);
    assert_eq!(symbols.candidates[0].line(), Some(7));

    let commands = block_on(aggregate(&providers, SearchType::Commands));
    assert_eq!(commands.candidates[0].kind(), CandidateKind::Command);
    assert_eq!(commands.candidates[0].weight, 2.0);

    let bars = block_on(aggregate(&providers, SearchType::CommandBars));
    assert_eq!(bars.candidates[0].kind(), CandidateKind::KnownCommand);
    assert_eq!(bars.candidates[0].invocation_token(), Some("File.SaveAll"));
}

#[test]
fn missing_tags_file_is_reported_not_fatal() {
    let root = unique_dir("no-tags");
    touch(&root.join("main.rs"));
    let config = Config {
        file_roots: vec![root.clone()],
        tags_path: Some(root.join("tags")),
        ..Default::default()
    };

    let report = block_on(aggregate(&runtime_providers(&config), SearchType::Mixed));

    assert_eq!(names(&report.candidates), vec!["main.rs"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "ctags");
}
