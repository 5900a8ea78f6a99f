use std::path::{Path, PathBuf};

use anyhow::Result;

pub const TEST_DIR: &str = "tests";

/// `.test` files of `tests/<subdir>`, sorted by name.
pub fn test_files(subdir: &str) -> Vec<(String, PathBuf)> {
    let mut tests = std::fs::read_dir(Path::new(TEST_DIR).join(subdir))
        .unwrap()
        .filter_map(|ent| {
            let path = ent.unwrap().path();
            if path.extension().map_or(true, |ext| ext != "test") {
                return None;
            }
            let name = path.file_stem().unwrap().to_str().unwrap().to_owned();
            Some((name, path))
        })
        .collect::<Vec<_>>();
    tests.sort();
    tests
}

/// Runs `f` on every `.test` file and compares its output with the sibling
/// file of extension `expect_ext`. `UPDATE_EXPECT=1` rewrites mismatches.
#[allow(unused)]
pub fn run_tests(subdir: &str, expect_ext: &str, mut f: impl FnMut(&Path) -> Result<String>) {
    let tests = test_files(subdir);
    let do_update_tests = std::env::var("UPDATE_EXPECT").map_or(false, |v| v == "1");

    let mut failed_cnt = 0;
    for (name, path) in &tests {
        eprint!("{name}: ");
        let expect_path = path.with_extension(expect_ext);
        let expect = std::fs::read_to_string(&expect_path).unwrap_or_default();
        match f(path) {
            Ok(got) if got == expect => eprintln!("\x1B[32mOK\x1B[0m"),
            Ok(got) if do_update_tests => {
                std::fs::write(&expect_path, got).unwrap();
                eprintln!("\x1B[33mUpdated\x1B[0m");
            }
            Ok(got) => {
                eprintln!("\x1B[31mFAILED\x1B[0m\n--- expect\n{expect}--- got\n{got}");
                failed_cnt += 1;
            }
            Err(err) => {
                eprintln!("\x1B[31mFAILED\x1B[0m\n{:?}", err);
                failed_cnt += 1;
            }
        }
    }

    if failed_cnt != 0 {
        eprintln!("{failed_cnt}/{} tests failed", tests.len());
        std::process::exit(1);
    }
}
