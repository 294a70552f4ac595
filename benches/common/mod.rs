#![allow(dead_code)]
use std::fs;
use std::path::Path;

use pseudocode::ast::Program;
use pseudocode::{lexer, parser};
use test_support::{PROGRAM_FILE, load_cases};

/// `(label, program path)` for every fixture with benchmarking enabled.
pub fn workloads() -> Vec<(String, String)> {
    load_cases(Path::new("tests/programs"))
        .unwrap_or_else(|err| panic!("load bench cases: {err:#}"))
        .into_iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case| {
            let path = case.dir.join(PROGRAM_FILE).display().to_string();
            (case.name, path)
        })
        .collect()
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_program(path: &str) -> Program {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source).unwrap_or_else(|err| panic!("tokenize {path}: {err}"));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"))
}
