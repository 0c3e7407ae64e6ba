use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn monkey() -> Command {
    Command::cargo_bin("monkey").unwrap()
}

#[test]
fn run_expr_prints_result() {
    monkey()
        .args(["run", "--expr", "(5 + 10 * 2 + 15 / 3) * 2 + -10"])
        .assert()
        .success()
        .stdout("50\n");
}

#[test]
fn run_expr_with_closure() {
    monkey()
        .args([
            "run",
            "-e",
            "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);",
        ])
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn run_trailing_let_prints_nothing() {
    monkey()
        .args(["run", "--expr", "let a = 1;"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn run_eval_error_fails() {
    monkey()
        .args(["run", "--expr", "5 + true;"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("type mismatch: INTEGER + BOOLEAN"));
}

#[test]
fn run_parse_error_prints_banner() {
    monkey()
        .args(["run", "--expr", "let x 5;"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("monkey business")
                .and(predicate::str::contains(
                    "\texpected next token to be =, got INT instead",
                )),
        );
}

#[test]
fn run_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "let fib = fn(n) {{\n  if (n < 2) {{ return n; }}\n  fib(n - 1) + fib(n - 2)\n}};\nfib(10)"
    )
    .unwrap();

    monkey()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("55\n");
}

#[test]
fn run_missing_file_fails() {
    monkey()
        .args(["run", "/definitely/not/here.monkey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read source file"));
}

#[test]
fn run_requires_input() {
    monkey().arg("run").assert().failure();
}

#[test]
fn run_prints_function_inspection() {
    monkey()
        .args(["run", "--expr", "fn(x, y) { x + y }"])
        .assert()
        .success()
        .stdout("fn(x, y) {\n(x + y)\n}\n");
}
