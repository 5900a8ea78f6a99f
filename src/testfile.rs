//! Key/value files describing test cases and their gold solutions.
//!
//! ```text
//! # Comment.
//! class: "GraphSearchTest"
//! graph: """
//! start_state: A
//! goal_states: B
//! A go B
//! """
//! ```

use std::fmt::{self, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::SpecError;

type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

const BLOCK: &str = "\"\"\"";
const WRAP_WIDTH: usize = 70;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestFile {
    entries: IndexMap<String, String>,
}

impl FromStr for TestFile {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = IndexMap::default();
        let mut lines = s.lines().zip(1..);
        while let Some((line, lineno)) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let syntax = |msg: &str| SpecError::Syntax {
                line: lineno,
                msg: msg.to_owned(),
            };

            let (key, rest) = line
                .split_once(':')
                .ok_or_else(|| syntax("expecting `key: \"value\"`"))?;
            let (key, rest) = (key.trim(), rest.trim());
            if key.is_empty() {
                return Err(syntax("empty key"));
            }

            let value = if rest == BLOCK {
                let mut block = Vec::new();
                loop {
                    let (line, _) = lines
                        .next()
                        .ok_or_else(|| syntax("unterminated \"\"\" block"))?;
                    if line.trim() == BLOCK {
                        break;
                    }
                    block.push(line);
                }
                block.join("\n")
            } else if rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"') {
                rest[1..rest.len() - 1].to_owned()
            } else {
                return Err(syntax("value must be quoted"));
            };
            entries.insert(key.to_owned(), value);
        }
        Ok(Self { entries })
    }
}

impl TestFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, SpecError> {
        self.get(key)
            .ok_or_else(|| SpecError::MissingKey(key.to_owned()))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, SpecError> {
        let value = self.require(key)?;
        value.trim().parse().map_err(|_| SpecError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }

    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, SpecError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.parse(key),
        }
    }

    pub fn words(&self, key: &str) -> Result<Vec<String>, SpecError> {
        Ok(self
            .require(key)?
            .split_whitespace()
            .map(str::to_owned)
            .collect())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

#[derive(Debug, Default)]
pub struct SolutionWriter {
    out: String,
}

impl SolutionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, text: impl fmt::Display) -> &mut Self {
        writeln!(self.out, "# {text}").unwrap();
        self
    }

    pub fn value(&mut self, key: &str, value: impl fmt::Display) -> &mut Self {
        writeln!(self.out, "{key}: \"{value}\"").unwrap();
        self
    }

    pub fn block(&mut self, key: &str, value: impl fmt::Display) -> &mut Self {
        writeln!(self.out, "{key}: {BLOCK}\n{value}\n{BLOCK}").unwrap();
        self
    }

    pub fn finish(&self) -> &str {
        &self.out
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.out)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Space joined items, greedily wrapped to 70 columns.
pub fn wrap_solution<T: fmt::Display>(items: &[T]) -> String {
    let mut out = String::new();
    let mut width = 0;
    for item in items {
        let word = item.to_string();
        if width > 0 && width + 1 + word.len() > WRAP_WIDTH {
            out.push('\n');
            width = 0;
        } else if width > 0 {
            out.push(' ');
            width += 1;
        }
        width += word.len();
        out.push_str(&word);
    }
    out
}

pub fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
