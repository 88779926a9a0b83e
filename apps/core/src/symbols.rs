use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::discovery::{run_blocking, CandidateProvider, ProviderError, ProviderSource};
use crate::model::CandidateItem;

/// Symbols read from a ctags-format tags file.
pub struct TagsSymbolProvider {
    tags_path: PathBuf,
}

impl TagsSymbolProvider {
    pub fn new(tags_path: impl Into<PathBuf>) -> Self {
        Self {
            tags_path: tags_path.into(),
        }
    }
}

#[async_trait]
impl CandidateProvider for TagsSymbolProvider {
    fn provider_name(&self) -> &'static str {
        "ctags"
    }

    fn source(&self) -> ProviderSource {
        ProviderSource::Symbols
    }

    async fn enumerate(&self) -> Result<Vec<CandidateItem>, ProviderError> {
        let tags_path = self.tags_path.clone();
        run_blocking(move || {
            let raw = std::fs::read_to_string(&tags_path).map_err(|source| ProviderError::Io {
                path: tags_path.clone(),
                source,
            })?;
            let base = tags_path.parent().unwrap_or_else(|| Path::new(""));
            Ok(parse_tags(&raw, base))
        })
        .await
    }
}

/// Parses tags lines into symbol items. Lines without a usable line number
/// are dropped, as are `!_TAG_` metadata lines.
pub fn parse_tags(raw: &str, base: &Path) -> Vec<CandidateItem> {
    raw.lines().filter_map(|line| parse_tag_line(line, base)).collect()
}

fn parse_tag_line(line: &str, base: &Path) -> Option<CandidateItem> {
    if line.starts_with("!_TAG_") || line.trim().is_empty() {
        return None;
    }

    let mut fields = line.split('\t');
    let name = fields.next()?.trim();
    let file = fields.next()?.trim();
    let address = fields.next()?;
    if name.is_empty() || file.is_empty() {
        return None;
    }

    let mut line_number = address
        .trim_end_matches(";\"")
        .trim()
        .parse::<u32>()
        .ok();
    let mut kind = String::new();

    for extension in fields {
        if let Some(value) = extension.strip_prefix("line:") {
            line_number = value.trim().parse::<u32>().ok().or(line_number);
        } else if let Some(value) = extension.strip_prefix("kind:") {
            kind = value.to_string();
        } else if kind.is_empty() && !extension.contains(':') {
            kind = extension.to_string();
        }
    }

    let line_number = line_number.filter(|line| *line > 0)?;
    let container = if Path::new(file).is_absolute() {
        PathBuf::from(file)
    } else {
        base.join(file)
    };

    Some(CandidateItem::symbol(
        name,
        container.to_string_lossy().as_ref(),
        line_number,
        &kind,
    ))
}
