//! Static checks run once over the tree before execution.
//!
//! The analyzer mirrors the interpreter's block structure with a stack of
//! scopes (sets of declared names) and tracks loop/function nesting. Unlike
//! the parser it keeps going after an error, so one pass reports every
//! problem it can reach.
//!
//! Member access through `this` or `.name` is not checked: object members are
//! resolved at run time.

use std::collections::HashSet;

use thiserror::Error;

use crate::ast::{
    AssignTarget, ClassDecl, Expression, ExpressionKind, FunctionDecl, Program, Statement,
    StatementKind,
};
use crate::runtime::builtins;
use crate::token::Span;

/// A semantic error discovered during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("'break' used outside of loop")]
    BreakOutsideLoop,
    #[error("'skip' used outside of loop")]
    SkipOutsideLoop,
    #[error("'return' used outside of function")]
    ReturnOutsideFunction,
    #[error("'this' used outside of class method")]
    ThisOutsideMethod,
}

pub struct Analyzer {
    scopes: Vec<HashSet<String>>,
    loop_depth: usize,
    function_depth: usize,
    method_depth: usize,
    errors: Vec<SemanticError>,
}

impl Analyzer {
    pub fn new() -> Self {
        let globals = builtins::NATIVE_FUNCTIONS
            .iter()
            .map(|native| native.name.to_string())
            .collect();
        Self {
            scopes: vec![globals],
            loop_depth: 0,
            function_depth: 0,
            method_depth: 0,
            errors: Vec::new(),
        }
    }

    pub fn analyze(mut self, program: &Program) -> Vec<SemanticError> {
        self.visit_block(&program.statements);
        self.errors
    }

    /// Function and class names are visible throughout their block, so
    /// mutually recursive declarations resolve.
    fn visit_block(&mut self, statements: &[Statement]) {
        for statement in statements {
            match &statement.kind {
                StatementKind::FunctionDef(function) => self.declare(&function.name),
                StatementKind::ClassDef(class) => self.declare(&class.name),
                _ => {}
            }
        }
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_scoped_block(&mut self, statements: &[Statement]) {
        self.scopes.push(HashSet::new());
        self.visit_block(statements);
        self.scopes.pop();
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::VariableDeclaration {
                name, initializer, ..
            } => {
                if let Some(initializer) = initializer {
                    self.visit_expression(initializer);
                }
                self.declare(name);
            }
            StatementKind::Assign { target, value } => {
                match target {
                    AssignTarget::Name { name, span } => self.resolve(name, *span),
                    AssignTarget::Index { target, index } => {
                        self.visit_expression(target);
                        self.visit_expression(index);
                    }
                    AssignTarget::Field { object, .. } => self.visit_expression(object),
                }
                self.visit_expression(value);
            }
            StatementKind::Print(value) | StatementKind::Expr(value) => {
                self.visit_expression(value);
            }
            StatementKind::If {
                condition,
                then_body,
                elif_branches,
                else_body,
            } => {
                self.visit_expression(condition);
                self.visit_scoped_block(then_body);
                for branch in elif_branches {
                    self.visit_expression(&branch.condition);
                    self.visit_scoped_block(&branch.body);
                }
                if let Some(else_body) = else_body {
                    self.visit_scoped_block(else_body);
                }
            }
            StatementKind::While { condition, body } => {
                self.visit_expression(condition);
                self.loop_depth += 1;
                self.visit_scoped_block(body);
                self.loop_depth -= 1;
            }
            StatementKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                self.scopes.push(HashSet::new());
                if let Some(init) = init {
                    self.visit_statement(init);
                }
                if let Some(condition) = condition {
                    self.visit_expression(condition);
                }
                self.loop_depth += 1;
                self.visit_scoped_block(body);
                self.loop_depth -= 1;
                if let Some(increment) = increment {
                    self.visit_statement(increment);
                }
                self.scopes.pop();
            }
            StatementKind::Break => {
                if self.loop_depth == 0 {
                    self.report(SemanticErrorKind::BreakOutsideLoop, statement.span);
                }
            }
            StatementKind::Skip => {
                if self.loop_depth == 0 {
                    self.report(SemanticErrorKind::SkipOutsideLoop, statement.span);
                }
            }
            StatementKind::Return(value) => {
                if self.function_depth == 0 {
                    self.report(SemanticErrorKind::ReturnOutsideFunction, statement.span);
                }
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            StatementKind::FunctionDef(function) => {
                self.declare(&function.name);
                self.visit_function(function, false);
            }
            StatementKind::ClassDef(class) => self.visit_class(class),
        }
    }

    fn visit_function(&mut self, function: &FunctionDecl, is_method: bool) {
        // Loops outside the function do not enclose its body.
        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        if is_method {
            self.method_depth += 1;
        }

        let params = function
            .params
            .iter()
            .map(|param| param.name.clone())
            .collect();
        self.scopes.push(params);
        self.visit_block(&function.body);
        self.scopes.pop();

        if is_method {
            self.method_depth -= 1;
        }
        self.function_depth -= 1;
        self.loop_depth = outer_loop_depth;
    }

    fn visit_class(&mut self, class: &ClassDecl) {
        self.declare(&class.name);
        for method in &class.methods {
            self.visit_function(method, true);
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Number(_) | ExpressionKind::String(_) | ExpressionKind::Boolean(_) => {}
            ExpressionKind::Identifier(name) => self.resolve(name, expression.span),
            ExpressionKind::This => {
                if self.method_depth == 0 {
                    self.report(SemanticErrorKind::ThisOutsideMethod, expression.span);
                }
            }
            ExpressionKind::List(elements) => {
                for element in elements {
                    self.visit_expression(element);
                }
            }
            ExpressionKind::Dict(entries) => {
                for (key, value) in entries {
                    self.visit_expression(key);
                    self.visit_expression(value);
                }
            }
            ExpressionKind::Binary { left, right, .. }
            | ExpressionKind::Logical { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            ExpressionKind::Unary { operand, .. } => self.visit_expression(operand),
            ExpressionKind::Call { callee, args } => {
                self.visit_expression(callee);
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            ExpressionKind::FieldAccess { object, .. } => self.visit_expression(object),
            ExpressionKind::Index { target, index } => {
                self.visit_expression(target);
                self.visit_expression(index);
            }
        }
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn resolve(&mut self, name: &str, span: Span) {
        let declared = self.scopes.iter().rev().any(|scope| scope.contains(name));
        if !declared {
            self.report(
                SemanticErrorKind::UndefinedVariable {
                    name: name.to_string(),
                },
                span,
            );
        }
    }

    fn report(&mut self, kind: SemanticErrorKind, span: Span) {
        self.errors.push(SemanticError::new(kind, span));
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn analyze(program: &Program) -> Vec<SemanticError> {
    Analyzer::new().analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    fn errors(source: &str) -> Vec<SemanticErrorKind> {
        let program = parse_tokens(tokenize(source).expect("tokenize failed"))
            .expect("parse failed");
        analyze(&program).into_iter().map(|error| error.kind).collect()
    }

    fn undefined(name: &str) -> SemanticErrorKind {
        SemanticErrorKind::UndefinedVariable {
            name: name.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_program() {
        let source = indoc! {"
            set number total = 0;
            for (set number i = 0; i < 3; i = i + 1) do
                if i == 1 then
                    skip;
                endif
                total = total + i;
            endfor
            func number twice(number n) do
                return n * 2;
            endfunc
            print(twice(total));
            set string name = input(\"name?\");
        "};
        assert_eq!(errors(source), Vec::new());
    }

    #[test]
    fn reports_bare_break_once() {
        let kinds = errors("break;");
        assert_eq!(kinds, vec![SemanticErrorKind::BreakOutsideLoop]);
        assert!(kinds[0].to_string().contains("outside of loop"));
    }

    #[test]
    fn reports_skip_and_return_outside_context() {
        assert_eq!(
            errors("skip; return 1;"),
            vec![
                SemanticErrorKind::SkipOutsideLoop,
                SemanticErrorKind::ReturnOutsideFunction,
            ]
        );
    }

    #[test]
    fn self_referencing_initializer_is_undefined() {
        assert_eq!(errors("set number x = x;"), vec![undefined("x")]);
    }

    #[test]
    fn block_locals_do_not_leak() {
        let source = indoc! {"
            if true then
                set number inner = 1;
            endif
            print(inner);
        "};
        assert_eq!(errors(source), vec![undefined("inner")]);
    }

    #[test]
    fn for_initializer_is_scoped_to_the_loop() {
        let source = "for (set number i = 0; i < 2; i = i + 1) do print(i); endfor print(i);";
        assert_eq!(errors(source), vec![undefined("i")]);
    }

    #[test]
    fn parameters_are_visible_only_in_the_body() {
        let source = indoc! {"
            func number f(number a) do
                return a + b;
            endfunc
            print(a);
        "};
        assert_eq!(errors(source), vec![undefined("b"), undefined("a")]);
    }

    #[test]
    fn functions_may_reference_later_declarations() {
        let source = indoc! {"
            func boolean isEven(number n) do
                if n == 0 then return true; endif
                return isOdd(n - 1);
            endfunc
            func boolean isOdd(number n) do
                if n == 0 then return false; endif
                return isEven(n - 1);
            endfunc
            print(isEven(4));
        "};
        assert_eq!(errors(source), Vec::new());
    }

    #[test]
    fn loops_do_not_enclose_nested_function_bodies() {
        let source = indoc! {"
            while true do
                func void f() do
                    break;
                endfunc
                break;
            endwhile
        "};
        assert_eq!(errors(source), vec![SemanticErrorKind::BreakOutsideLoop]);
    }

    #[test]
    fn this_is_only_valid_inside_methods() {
        let source = indoc! {"
            class Counter
                set number count;
                func void bump() do
                    this.count = this.count + 1;
                endfunc
            endclass
            print(this);
        "};
        assert_eq!(errors(source), vec![SemanticErrorKind::ThisOutsideMethod]);
    }

    #[test]
    fn collects_every_error_in_one_pass() {
        let source = indoc! {"
            print(a);
            break;
            print(b);
            return;
        "};
        assert_eq!(
            errors(source),
            vec![
                undefined("a"),
                SemanticErrorKind::BreakOutsideLoop,
                undefined("b"),
                SemanticErrorKind::ReturnOutsideFunction,
            ]
        );
    }

    #[test]
    fn reports_positions() {
        let program = parse_tokens(tokenize("set number y = 1;\nprint(zz);").expect("tokenize"))
            .expect("parse");
        let errors = analyze(&program);
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].span.line, errors[0].span.column), (2, 7));
        assert_eq!(errors[0].span.len(), 2);
    }
}
