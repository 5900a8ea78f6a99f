use std::path::Path;

use search_grader::cases::TestCase;
use search_grader::grades::Grades;
use search_grader::solve::{PushOrder, Reference};
use search_grader::testfile::TestFile;
use search_grader::Budget;

mod common;

fn main() {
    let do_update_tests = std::env::var("UPDATE_EXPECT").map_or(false, |v| v == "1");
    let tests = common::test_files("cases");

    let mut failed_cnt = 0;
    for (name, path) in &tests {
        for order in [PushOrder::Forward, PushOrder::Reverse] {
            eprint!("{name} ({order:?}): ");
            match grade(path, Reference::new(order)) {
                Ok((true, _)) => eprintln!("\x1B[32mOK\x1B[0m"),
                // Gold files are being regenerated alongside.
                Ok(_) | Err(_) if do_update_tests => eprintln!("\x1B[33mSkipped\x1B[0m"),
                Ok((false, grades)) => {
                    eprintln!("\x1B[31mFAILED\x1B[0m\n{grades}");
                    failed_cnt += 1;
                }
                Err(err) => {
                    eprintln!("\x1B[31mFAILED\x1B[0m\n{:?}", err);
                    failed_cnt += 1;
                }
            }
        }
    }

    if failed_cnt != 0 {
        eprintln!("{failed_cnt}/{} runs failed", tests.len() * 2);
        std::process::exit(1);
    }
}

fn grade(path: &Path, reference: Reference) -> anyhow::Result<(bool, Grades)> {
    let file = TestFile::load(path)?;
    let case = TestCase::new(path.display().to_string(), &file)?;
    let gold = TestFile::load(&path.with_extension("solution"))?;
    let mut grades = Grades::new();
    let passed = case.execute(&reference, &mut grades, &gold, Budget::UNLIMITED)?;
    Ok((passed, grades))
}
