use std::path::Path;

use anyhow::{Result, ensure};
use test_support::{CaseClass, load_cases};

use crate::runner::compile;

/// Every fixture must compile unless it is a frontend error case, and
/// frontend errors must point at a real source position.
#[test]
fn fixtures_compile_according_to_their_class() -> Result<()> {
    for case in load_cases(Path::new("tests/programs"))? {
        let source = case.source()?;
        let result = compile(&source);
        let line_count = source.split('\n').count();
        match case.spec.class {
            CaseClass::FrontendError => {
                ensure!(
                    !result.is_success(),
                    "Expected {} to fail compilation",
                    case.name
                );
                for error in &result.errors {
                    ensure!(
                        error.line >= 1 && error.line <= line_count && error.column >= 1,
                        "Diagnostic {error} in {} points outside the source",
                        case.name
                    );
                }
            }
            CaseClass::RuntimeSuccess | CaseClass::RuntimeError => {
                ensure!(
                    result.is_success(),
                    "Expected {} to compile, got {:?}",
                    case.name,
                    result.errors
                );
            }
        }
    }
    Ok(())
}
