// src/entities.rs
//! Regex entity tagger built from JSON pattern files.
//!
//! Patterns live in `config/entities/` (relative to the current working
//! directory) or in the directory named by `ENTITY_CONFIG_DIR`. Each `*.json`
//! file holds `{ "patterns": [{ "regex": "...", "label": "..." }] }`; the file
//! stem becomes the category.
//!
//! Notes:
//! - Files are read and compiled once, at construction.
//! - Invalid files or regexes are skipped with a warning, never fatal.
//! - Regexes must be compatible with the `regex` crate (no lookarounds).

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::segment::EntityTagger;

pub const ENV_ENTITY_CONFIG_DIR: &str = "ENTITY_CONFIG_DIR";

#[derive(Debug, Deserialize)]
struct Pattern {
    regex: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(default)]
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    category: String,
    label: String,
    re: Regex,
}

#[derive(Debug, Clone, Default)]
pub struct RegexEntityTagger {
    patterns: Vec<CompiledPattern>,
}

/// `ENTITY_CONFIG_DIR` if set, else `<cwd>/config/entities`.
pub fn entity_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_ENTITY_CONFIG_DIR) {
        return PathBuf::from(dir);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config")
        .join("entities")
}

impl RegexEntityTagger {
    pub fn from_env() -> Self {
        Self::from_dir(entity_config_dir())
    }

    /// Missing directory is fine and yields an empty tagger.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let Ok(read_dir) = fs::read_dir(dir.as_ref()) else {
            return Self::default();
        };

        let mut paths: Vec<PathBuf> = read_dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        // read_dir order is platform dependent
        paths.sort();

        let mut patterns = Vec::new();
        for path in paths {
            let category = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<PatternFile>(&s).map_err(|e| e.to_string()));
            let file = match parsed {
                Ok(f) => f,
                Err(error) => {
                    warn!(
                        target: "pipeline",
                        path = %path.display(),
                        %error,
                        "skipping entity pattern file"
                    );
                    continue;
                }
            };

            for pat in file.patterns {
                match Regex::new(&pat.regex) {
                    Ok(re) => patterns.push(CompiledPattern {
                        category: category.clone(),
                        label: pat.label,
                        re,
                    }),
                    Err(error) => {
                        warn!(
                            target: "pipeline",
                            %category,
                            %error,
                            "skipping invalid entity regex"
                        )
                    }
                }
            }
        }

        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `"category: label"` for every match, in pattern order.
    pub fn labels(&self, sentence: &str) -> Vec<String> {
        self.patterns
            .iter()
            .flat_map(|p| {
                p.re.find_iter(sentence)
                    .map(move |_| format!("{}: {}", p.category, p.label))
            })
            .collect()
    }
}

impl EntityTagger for RegexEntityTagger {
    fn entities(&self, sentence: &str) -> usize {
        self.patterns
            .iter()
            .map(|p| p.re.find_iter(sentence).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_patterns(dir: &Path, name: &str, body: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn missing_dir_yields_empty_tagger() {
        let t = RegexEntityTagger::from_dir("__entity_dir_should_not_exist__");
        assert!(t.is_empty());
        assert_eq!(t.entities("Q3 revenue grew 10%"), 0);
    }

    #[test]
    fn counts_every_match() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write_patterns(
            dir,
            "finance.json",
            r#"{ "patterns": [ { "regex": "\\d+%", "label": "percent" } ] }"#,
        );
        let t = RegexEntityTagger::from_dir(dir);
        assert_eq!(t.len(), 1);
        assert_eq!(t.entities("up 10% then 20%"), 2);
        assert_eq!(t.labels("up 10%"), vec!["finance: percent"]);
    }

    #[test]
    fn invalid_files_and_regexes_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write_patterns(dir, "broken.json", "{ not json");
        write_patterns(
            dir,
            "mixed.json",
            r#"{ "patterns": [ { "regex": "(", "label": "bad" }, { "regex": "kpi", "label": "metric" } ] }"#,
        );
        let t = RegexEntityTagger::from_dir(dir);
        assert_eq!(t.len(), 1);
        assert_eq!(t.entities("kpi kpi"), 2);
    }

    #[test]
    fn shipped_patterns_compile() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config").join("entities");
        let t = RegexEntityTagger::from_dir(dir);
        assert!(!t.is_empty());
        assert!(t.entities("Bonus 5,000,000 VND for Q3") >= 2);
    }
}
