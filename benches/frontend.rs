mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pseudocode::{analyzer, lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let source = common::load_source(&path);
        let tokens = lexer::tokenize(&source).expect("tokenize");
        let program = common::load_program(&path);

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(&source)).expect("tokenize");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_only_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse_tokens(black_box(tokens.clone())).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_analyze_only_{label}"), |b| {
            b.iter(|| {
                let errors = analyzer::analyze(black_box(&program));
                black_box(errors);
            })
        });

        c.bench_function(&format!("frontend_compile_{label}"), |b| {
            b.iter(|| {
                let out = pseudocode::compile(black_box(&source));
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
