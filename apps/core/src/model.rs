use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    File,
    Symbol,
    Command,
    KnownCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidatePayload {
    File {
        path: String,
        relative_path: String,
    },
    Symbol {
        container_path: String,
        /// 1-based.
        line: u32,
        /// Display-only classification (e.g. "method", "class").
        bind_classification: String,
    },
    Command {
        invocation_token: String,
    },
    KnownCommand {
        invocation_token: String,
    },
}

impl CandidatePayload {
    pub fn kind(&self) -> CandidateKind {
        match self {
            Self::File { .. } => CandidateKind::File,
            Self::Symbol { .. } => CandidateKind::Symbol,
            Self::Command { .. } => CandidateKind::Command,
            Self::KnownCommand { .. } => CandidateKind::KnownCommand,
        }
    }
}

/// One searchable entry surfaced in the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandidateRecord", into = "CandidateRecord")]
pub struct CandidateItem {
    pub name: String,
    pub weight: f64,
    pub payload: CandidatePayload,
    normalized_name: String,
}

#[derive(Serialize, Deserialize)]
struct CandidateRecord {
    name: String,
    #[serde(default)]
    weight: f64,
    #[serde(flatten)]
    payload: CandidatePayload,
}

impl From<CandidateRecord> for CandidateItem {
    fn from(value: CandidateRecord) -> Self {
        Self::new(value.name, value.payload).with_weight(value.weight)
    }
}

impl From<CandidateItem> for CandidateRecord {
    fn from(value: CandidateItem) -> Self {
        Self {
            name: value.name,
            weight: value.weight,
            payload: value.payload,
        }
    }
}

impl CandidateItem {
    pub fn new(name: impl Into<String>, payload: CandidatePayload) -> Self {
        let name = name.into();
        let normalized_name = normalize_for_search(&name);
        Self {
            name,
            weight: 0.0,
            payload,
            normalized_name,
        }
    }

    pub fn file(name: &str, path: &str, relative_path: &str) -> Self {
        Self::new(
            name,
            CandidatePayload::File {
                path: path.to_string(),
                relative_path: relative_path.to_string(),
            },
        )
    }

    pub fn symbol(name: &str, container_path: &str, line: u32, bind_classification: &str) -> Self {
        Self::new(
            name,
            CandidatePayload::Symbol {
                container_path: container_path.to_string(),
                line,
                bind_classification: bind_classification.to_string(),
            },
        )
    }

    pub fn command(name: &str, invocation_token: &str) -> Self {
        Self::new(
            name,
            CandidatePayload::Command {
                invocation_token: invocation_token.to_string(),
            },
        )
    }

    pub fn known_command(name: &str, invocation_token: &str) -> Self {
        Self::new(
            name,
            CandidatePayload::KnownCommand {
                invocation_token: invocation_token.to_string(),
            },
        )
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn kind(&self) -> CandidateKind {
        self.payload.kind()
    }

    /// Line number for symbols; `None` for every other kind.
    pub fn line(&self) -> Option<u32> {
        match &self.payload {
            CandidatePayload::Symbol { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn invocation_token(&self) -> Option<&str> {
        match &self.payload {
            CandidatePayload::Command { invocation_token }
            | CandidatePayload::KnownCommand { invocation_token } => Some(invocation_token),
            _ => None,
        }
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

pub fn normalize_for_search(input: &str) -> String {
    input.chars().flat_map(|c| c.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_for_search, CandidateItem, CandidateKind};

    #[test]
    fn kind_follows_payload() {
        assert_eq!(
            CandidateItem::file("a.rs", "/w/a.rs", "a.rs").kind(),
            CandidateKind::File
        );
        assert_eq!(
            CandidateItem::symbol("run", "/w/a.rs", 3, "method").kind(),
            CandidateKind::Symbol
        );
        assert_eq!(
            CandidateItem::command("Build", "build.solution").kind(),
            CandidateKind::Command
        );
        assert_eq!(
            CandidateItem::known_command("Save All", "file.saveall").kind(),
            CandidateKind::KnownCommand
        );
    }

    #[test]
    fn line_is_only_exposed_for_symbols() {
        assert_eq!(CandidateItem::symbol("run", "a.rs", 7, "fn").line(), Some(7));
        assert_eq!(CandidateItem::file("a.rs", "a.rs", "a.rs").line(), None);
    }

    #[test]
    fn normalization_folds_case_but_keeps_punctuation() {
        assert_eq!(normalize_for_search("Main.RS"), "main.rs");
        assert_eq!(normalize_for_search("ÄBC_d"), "äbc_d");
    }

    #[test]
    fn deserialized_items_still_normalize() {
        let decoded: CandidateItem = serde_json::from_str(
            r#"{
                "name": "Build Solution",
                "weight": 2.5,
                "kind": "command",
                "invocation_token": "build.solution"
            }"#,
        )
        .unwrap();

        assert_eq!(
            decoded,
            CandidateItem::command("Build Solution", "build.solution").with_weight(2.5)
        );
        assert_eq!(decoded.normalized_name(), "build solution");
    }
}
