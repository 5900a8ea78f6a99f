//! Discovers test cases in a directory and grades them, or authors their gold
//! solutions.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cases::TestCase;
use crate::grades::Grades;
use crate::solve::{PushOrder, Reference};
use crate::suite::SearchSuite;
use crate::testfile::TestFile;
use crate::Budget;

pub const TEST_EXTENSION: &str = "test";
pub const SOLUTION_EXTENSION: &str = "solution";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Grade,
    Generate,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dir: PathBuf,
    pub mode: Mode,
    pub push_order: PushOrder,
    /// Only cases whose file name contains this.
    pub filter: Option<String>,
    pub budget: Budget,
}

impl RunConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            mode: Mode::Grade,
            push_order: PushOrder::Forward,
            filter: None,
            budget: Budget::UNLIMITED,
        }
    }

    /// `.test` files under [`RunConfig::dir`], sorted by name.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory {}", self.dir.display()))?;
        let mut paths = Vec::new();
        for ent in entries {
            let path = ent?.path();
            if path.extension().map_or(true, |ext| ext != TEST_EXTENSION) {
                continue;
            }
            let name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
            if self.filter.as_deref().map_or(true, |f| name.contains(f)) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn load_case(path: &Path) -> Result<TestCase> {
    let file = TestFile::load(path)?;
    TestCase::new(path.display().to_string(), &file)
        .with_context(|| format!("Failed to set up {}", path.display()))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
    pub grades: Grades,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tests passed, {} points",
            self.passed,
            self.total,
            self.grades.points()
        )
    }
}

fn print_messages(messages: &[String]) {
    for msg in messages {
        if msg.starts_with("PASS") {
            println!("{}", style(msg).green());
        } else if msg.starts_with("FAIL") {
            println!("{}", style(msg).red());
        } else {
            println!("{msg}");
        }
    }
}

pub fn grade<S: SearchSuite>(config: &RunConfig, suite: &S) -> Result<Summary> {
    let mut summary = Summary::default();
    for path in config.discover()? {
        let case = load_case(&path)?;
        let gold = TestFile::load(&path.with_extension(SOLUTION_EXTENSION))?;

        let before = summary.grades.messages().len();
        let passed = case.execute(suite, &mut summary.grades, &gold, config.budget)?;
        print_messages(&summary.grades.messages()[before..]);

        summary.total += 1;
        if passed {
            summary.passed += 1;
        }
    }
    tracing::info!(
        passed = summary.passed,
        total = summary.total,
        points = summary.grades.points(),
        "grading finished"
    );
    Ok(summary)
}

/// Writes a `.solution` file next to every case using the reference suite.
/// Returns the number of files written.
pub fn generate(config: &RunConfig) -> Result<usize> {
    let paths = config.discover()?;
    let reference = Reference::new(config.push_order);

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {wide_msg}",
    )?);
    for path in &paths {
        pb.set_message(path.display().to_string());
        let case = load_case(path)?;
        case.write_solution(reference, config.budget)?
            .write_to(&path.with_extension(SOLUTION_EXTENSION))?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(count = paths.len(), "gold solutions written");
    Ok(paths.len())
}
