mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pseudocode::interpreter::Interpreter;
use pseudocode::io::{CapturedOutput, ScriptedInput};

fn bench_interpreter(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let program = common::load_program(&path);
        let source = common::load_source(&path);

        c.bench_function(&format!("interpreter_execute_{label}"), |b| {
            b.iter(|| {
                let mut input = ScriptedInput::default();
                let mut output = CapturedOutput::new();
                Interpreter::new(&mut input, &mut output)
                    .interpret(black_box(&program))
                    .expect("run");
                black_box(output);
            })
        });

        c.bench_function(&format!("interpreter_total_{label}"), |b| {
            b.iter(|| {
                let mut input = ScriptedInput::default();
                let mut output = CapturedOutput::new();
                let report = pseudocode::run(black_box(&source), &mut input, &mut output);
                assert!(report.is_success(), "{:?}", report.errors);
                black_box(output);
            })
        });
    }
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);
