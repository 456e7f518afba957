//! Tree-walking evaluator and session driver.
//!
//! The [`Interpreter`] owns the symbol table and the reflection dictionary
//! and runs parsed translation units against them. Sessions are
//! incremental: globals, classes, and loaded modules persist across
//! submissions, and a fault aborts only the submission that raised it.

mod exec;
mod frames;
mod operators;
mod stack;

pub use frames::{CallFrame, CallStack, MAX_CALL_DEPTH};
pub use stack::ensure_sufficient_stack;

use ced_dict::{DictError, DictionaryRegistry};
use ced_ir::{ClassInfo, Decl, Item, Name, Span, StringInterner, TemplateDecl, TranslationUnit};
use ced_rt::{Fault, FaultKind, ObjectData, Signal, Value};
use ced_table::{DeclareError, ScopeId, Storage, Symbol, SymbolTable};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

/// Where the interpreter is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing submitted yet.
    Idle,
    /// A submission is being driven.
    Executing,
    /// Paused at a statement boundary with work pending.
    Suspended,
    /// The last submission ended in a fault or declaration error.
    Error,
    /// The last submission ran to completion.
    Completed,
}

/// Why a submission stopped early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    Fault(Box<Fault>),
    #[error(transparent)]
    Declare(#[from] DeclareError),
    #[error(transparent)]
    Dict(#[from] DictError),
}

impl From<Fault> for RunError {
    fn from(fault: Fault) -> Self {
        RunError::Fault(Box::new(fault))
    }
}

/// One interpreter session.
pub struct Interpreter {
    interner: Rc<StringInterner>,
    pub table: SymbolTable,
    pub dictionary: DictionaryRegistry,
    state: State,
    call_stack: CallStack,
    this_stack: Vec<Rc<RefCell<ObjectData>>>,
    last_fault: Option<Fault>,
    pause_requested: bool,
    pending: VecDeque<Item>,
    /// Template declarations are recorded, not instantiated.
    templates: Vec<TemplateDecl>,
    string_name: Name,
}

impl Interpreter {
    pub fn new(interner: Rc<StringInterner>) -> Self {
        let string_name = interner.intern("string");
        Interpreter {
            interner,
            table: SymbolTable::new(),
            dictionary: DictionaryRegistry::new(),
            state: State::Idle,
            call_stack: CallStack::new(),
            this_stack: Vec::new(),
            last_fault: None,
            pause_requested: false,
            pending: VecDeque::new(),
            templates: Vec::new(),
            string_name,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn last_fault(&self) -> Option<&Fault> {
        self.last_fault.as_ref()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn templates(&self) -> &[TemplateDecl] {
        &self.templates
    }

    /// Asks the driver to stop at the next statement boundary. The
    /// remaining items stay queued for [`resume`](Self::resume).
    pub fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    /// Drops any suspended work and clears the recorded fault. Declared
    /// globals, classes, and loaded modules survive.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.call_stack.clear();
        self.this_stack.clear();
        self.last_fault = None;
        self.pause_requested = false;
        self.state = State::Idle;
    }

    /// Runs one translation unit, returning the value of the last bare
    /// expression statement, if any. Replaces any suspended work.
    #[tracing::instrument(level = "debug", skip_all, fields(items = unit.items.len()))]
    pub fn run(&mut self, unit: &TranslationUnit) -> Result<Option<Value>, RunError> {
        self.pending = unit.items.iter().cloned().collect();
        self.drive()
    }

    /// Continues a suspended submission.
    pub fn resume(&mut self) -> Result<Option<Value>, RunError> {
        self.drive()
    }

    fn drive(&mut self) -> Result<Option<Value>, RunError> {
        self.state = State::Executing;
        let mut last = None;
        while let Some(item) = self.pending.pop_front() {
            match self.run_item(&item) {
                Ok(Some(value)) => last = Some(value),
                Ok(None) => {}
                Err(err) => {
                    self.pending.clear();
                    self.call_stack.clear();
                    self.this_stack.clear();
                    if let RunError::Fault(fault) = &err {
                        tracing::debug!(kind = fault.kind.describe(), "submission faulted");
                        self.last_fault = Some((**fault).clone());
                    }
                    self.state = State::Error;
                    return Err(err);
                }
            }
            if self.pause_requested && !self.pending.is_empty() {
                self.pause_requested = false;
                self.state = State::Suspended;
                return Ok(last);
            }
        }
        self.state = State::Completed;
        Ok(last)
    }

    fn run_item(&mut self, item: &Item) -> Result<Option<Value>, RunError> {
        match item {
            Item::Decl(decl) => {
                self.declare_decl(decl)?;
                Ok(None)
            }
            Item::Stmt(stmt) => match self.exec_stmt(stmt, ScopeId::GLOBAL) {
                Ok(value) => Ok(value),
                Err(signal) => Err(self.signal_error(signal)),
            },
        }
    }

    fn signal_error(&self, signal: Signal) -> RunError {
        let fault = match signal {
            Signal::Fault(fault) => *fault,
            Signal::Return(_) => Fault::new(
                FaultKind::TypeMismatch,
                "return outside of a function",
                Span::DUMMY,
            ),
            Signal::Break(span) => {
                Fault::new(FaultKind::TypeMismatch, "break outside of a loop", span)
            }
            Signal::Continue(span) => {
                Fault::new(FaultKind::TypeMismatch, "continue outside of a loop", span)
            }
        };
        fault.into()
    }

    // Declarations

    fn declare_decl(&mut self, decl: &Decl) -> Result<(), RunError> {
        match decl {
            Decl::Class(class) => {
                self.dictionary.register(ClassInfo::from_decl(class))?;
                self.table
                    .declare(ScopeId::GLOBAL, Symbol::class(Rc::new(class.clone())))?;
                Ok(())
            }
            Decl::Function(func) => {
                self.table
                    .declare(ScopeId::GLOBAL, Symbol::function(Rc::new(func.clone())))?;
                Ok(())
            }
            Decl::Variable(var) => {
                let value = self
                    .initial_value(var, ScopeId::GLOBAL)
                    .map_err(|signal| self.signal_error(signal))?;
                self.table.declare(
                    ScopeId::GLOBAL,
                    Symbol::variable(var.name, var.ty.clone(), value, Storage::Global, var.span),
                )?;
                Ok(())
            }
            Decl::Namespace(ns) => {
                let prefix = self.interner.lookup(ns.name).to_owned();
                for inner in &ns.items {
                    self.declare_qualified(&prefix, inner)?;
                }
                Ok(())
            }
            Decl::Template(template) => {
                self.templates.push(template.clone());
                Ok(())
            }
        }
    }

    /// Namespaces flatten: `namespace Math { int sq(...) }` declares the
    /// global `Math::sq`, which qualified paths resolve against.
    fn declare_qualified(&mut self, prefix: &str, decl: &Decl) -> Result<(), RunError> {
        match decl {
            Decl::Namespace(inner) => {
                let nested = format!("{prefix}::{}", self.interner.lookup(inner.name));
                for item in &inner.items {
                    self.declare_qualified(&nested, item)?;
                }
                Ok(())
            }
            Decl::Class(class) => {
                let mut class = class.clone();
                class.name = self.qualified(prefix, class.name);
                self.declare_decl(&Decl::Class(class))
            }
            Decl::Function(func) => {
                let mut func = func.clone();
                func.name = self.qualified(prefix, func.name);
                self.declare_decl(&Decl::Function(func))
            }
            Decl::Variable(var) => {
                let mut var = var.clone();
                var.name = self.qualified(prefix, var.name);
                self.declare_decl(&Decl::Variable(var))
            }
            Decl::Template(_) => self.declare_decl(decl),
        }
    }

    fn qualified(&self, prefix: &str, name: Name) -> Name {
        self.interner
            .intern(&format!("{prefix}::{}", self.interner.lookup(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> (Rc<StringInterner>, Interpreter) {
        let interner = Rc::new(StringInterner::new());
        let interpreter = Interpreter::new(Rc::clone(&interner));
        (interner, interpreter)
    }

    fn run(
        interpreter: &mut Interpreter,
        interner: &StringInterner,
        source: &str,
    ) -> Result<Option<Value>, RunError> {
        let (tokens, lex_errors) = ced_lexer::lex(source, interner);
        assert!(lex_errors.is_empty(), "{lex_errors:?}");
        let (unit, parse_errors) = ced_parse::parse(&tokens, interner);
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        interpreter.run(&unit)
    }

    fn fault_kind(result: Result<Option<Value>, RunError>) -> FaultKind {
        match result {
            Err(RunError::Fault(fault)) => fault.kind,
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn globals_persist_across_submissions() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "int x = 2 + 3;").unwrap();
        let value = run(&mut interp, &interner, "x * 10").unwrap();
        assert_eq!(value, Some(Value::Int(50)));
        assert_eq!(interp.state(), State::Completed);
    }

    #[test]
    fn overloads_select_best_match() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "int twice(int n) { return n * 2; }\n\
             double twice(double d) { return d * 2.0; }",
        )
        .unwrap();
        assert_eq!(
            run(&mut interp, &interner, "twice(4)").unwrap(),
            Some(Value::Int(8))
        );
        assert_eq!(
            run(&mut interp, &interner, "twice(1.5)").unwrap(),
            Some(Value::Double(3.0))
        );
    }

    #[test]
    fn ambiguous_call_faults() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "int f(int a, double b) { return 1; }\n\
             int f(double a, int b) { return 2; }",
        )
        .unwrap();
        let kind = fault_kind(run(&mut interp, &interner, "f(1, 2)"));
        assert_eq!(kind, FaultKind::AmbiguousCall);
    }

    #[test]
    fn virtual_dispatch_uses_dynamic_class() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class Shape { public: virtual int area() { return 0; } };\n\
             class Circle : public Shape { public: int area() { return 10; } };",
        )
        .unwrap();
        run(&mut interp, &interner, "Shape* p = new Circle();").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "p->area()").unwrap(),
            Some(Value::Int(10))
        );
    }

    #[test]
    fn non_virtual_method_uses_static_class() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class A { public: int tag() { return 1; } };\n\
             class B : public A { public: int tag() { return 2; } };",
        )
        .unwrap();
        run(&mut interp, &interner, "A* p = new B();").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "p->tag()").unwrap(),
            Some(Value::Int(1))
        );
    }

    #[test]
    fn methods_mutate_object_fields() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class Counter { public: int n; int bump() { n = n + 1; return n; } };",
        )
        .unwrap();
        run(&mut interp, &interner, "Counter c;").unwrap();
        run(&mut interp, &interner, "c.bump();").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "c.bump()").unwrap(),
            Some(Value::Int(2))
        );
    }

    #[test]
    fn constructor_initializes_fields() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class Point {\n\
             public:\n\
               int x;\n\
               int y;\n\
               Point(int a, int b) { x = a; y = b; }\n\
               int sum() { return x + y; }\n\
             };",
        )
        .unwrap();
        run(&mut interp, &interner, "Point p = Point(3, 4);").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "p.sum()").unwrap(),
            Some(Value::Int(7))
        );
    }

    #[test]
    fn fault_leaves_globals_intact() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "int x = 1;").unwrap();

        let kind = fault_kind(run(&mut interp, &interner, "y + 1"));
        assert_eq!(kind, FaultKind::UnresolvedSymbol);
        assert_eq!(interp.state(), State::Error);
        assert!(interp.last_fault().is_some());

        // The session recovers and x kept its value.
        assert_eq!(
            run(&mut interp, &interner, "x").unwrap(),
            Some(Value::Int(1))
        );
        assert_eq!(interp.state(), State::Completed);
    }

    #[test]
    fn partial_writes_survive_a_fault() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "int x = 1;").unwrap();
        // The assignment lands before the fault; it is not rolled back.
        let kind = fault_kind(run(&mut interp, &interner, "x = 5;\n1 / 0"));
        assert_eq!(kind, FaultKind::Arithmetic);
        assert_eq!(
            run(&mut interp, &interner, "x").unwrap(),
            Some(Value::Int(5))
        );
    }

    #[test]
    fn block_locals_do_not_escape() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "{ int t = 5; }").unwrap();
        let kind = fault_kind(run(&mut interp, &interner, "t"));
        assert_eq!(kind, FaultKind::UnresolvedSymbol);
    }

    #[test]
    fn for_loop_with_break_and_continue() {
        let (interner, mut interp) = session();
        let value = run(
            &mut interp,
            &interner,
            "int s = 0;\n\
             for (int i = 0; i < 10; i++) {\n\
               if (i == 3) { continue; }\n\
               if (i == 6) { break; }\n\
               s = s + i;\n\
             }\n\
             s",
        )
        .unwrap();
        // 0+1+2+4+5
        assert_eq!(value, Some(Value::Int(12)));
    }

    #[test]
    fn declaration_as_loop_body_redeclares_each_iteration() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "for (int i = 0; i < 3; i++) int x = 1;",
        )
        .unwrap();
        // The body's scope died with each iteration.
        let kind = fault_kind(run(&mut interp, &interner, "x"));
        assert_eq!(kind, FaultKind::UnresolvedSymbol);
    }

    #[test]
    fn while_loop_counts() {
        let (interner, mut interp) = session();
        let value = run(
            &mut interp,
            &interner,
            "int n = 0;\nwhile (n < 4) { n = n + 1; }\nn",
        )
        .unwrap();
        assert_eq!(value, Some(Value::Int(4)));
    }

    #[test]
    fn division_by_zero_faults() {
        let (interner, mut interp) = session();
        assert_eq!(
            fault_kind(run(&mut interp, &interner, "1 / 0")),
            FaultKind::Arithmetic
        );
    }

    #[test]
    fn stray_break_faults() {
        let (interner, mut interp) = session();
        assert_eq!(
            fault_kind(run(&mut interp, &interner, "break;")),
            FaultKind::TypeMismatch
        );
    }

    #[test]
    fn runaway_recursion_overflows_cleanly() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "int boom() { return boom(); }",
        )
        .unwrap();
        let result = run(&mut interp, &interner, "boom()");
        assert_eq!(fault_kind(result), FaultKind::StackOverflow);
        // The session still works afterwards.
        assert_eq!(
            run(&mut interp, &interner, "1 + 1").unwrap(),
            Some(Value::Int(2))
        );
    }

    #[test]
    fn global_redeclaration_is_an_error() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "int x = 1;").unwrap();
        let err = run(&mut interp, &interner, "int x = 2;").unwrap_err();
        assert!(matches!(err, RunError::Declare(_)));
        assert_eq!(interp.state(), State::Error);
    }

    #[test]
    fn namespace_members_resolve_by_path() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "namespace Math { int sq(int n) { return n * n; } }",
        )
        .unwrap();
        assert_eq!(
            run(&mut interp, &interner, "Math::sq(6)").unwrap(),
            Some(Value::Int(36))
        );
    }

    #[test]
    fn pause_suspends_and_resume_finishes() {
        let (interner, mut interp) = session();
        let (tokens, _) = ced_lexer::lex("int a = 1;\nint b = 2;\na + b", &interner);
        let (unit, errors) = ced_parse::parse(&tokens, &interner);
        assert!(errors.is_empty());

        interp.request_pause();
        let paused = interp.run(&unit).unwrap();
        assert_eq!(interp.state(), State::Suspended);
        assert_eq!(paused, None);

        let value = interp.resume().unwrap();
        assert_eq!(interp.state(), State::Completed);
        assert_eq!(value, Some(Value::Int(3)));
    }

    #[test]
    fn class_redefinition_last_write_wins() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class C { public: int v() { return 1; } };",
        )
        .unwrap();
        run(
            &mut interp,
            &interner,
            "class C { public: int v() { return 2; } };",
        )
        .unwrap();
        run(&mut interp, &interner, "C c;").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "c.v()").unwrap(),
            Some(Value::Int(2))
        );
    }

    #[test]
    fn derived_sees_flattened_base_fields() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class A { public: int x; };\n\
             class B : public A { public: int y; int total() { return x + y; } };",
        )
        .unwrap();
        run(
            &mut interp,
            &interner,
            "B b;\nb.x = 4;\nb.y = 8;",
        )
        .unwrap();
        assert_eq!(
            run(&mut interp, &interner, "b.total()").unwrap(),
            Some(Value::Int(12))
        );
    }

    #[test]
    fn string_values_concatenate() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "string s = \"ab\";").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "s + \"cd\"").unwrap(),
            Some(Value::string("abcd"))
        );
    }

    #[test]
    fn conditional_expression_selects_branch() {
        let (interner, mut interp) = session();
        let value = run(&mut interp, &interner, "int x = 7;\nx > 5 ? 1 : 2").unwrap();
        assert_eq!(value, Some(Value::Int(1)));
    }

    #[test]
    fn arrays_index_and_fault_out_of_bounds() {
        let (interner, mut interp) = session();
        run(&mut interp, &interner, "int a[3];\na[1] = 9;").unwrap();
        assert_eq!(
            run(&mut interp, &interner, "a[1]").unwrap(),
            Some(Value::Int(9))
        );
        assert_eq!(
            fault_kind(run(&mut interp, &interner, "a[3]")),
            FaultKind::Arithmetic
        );
    }

    #[test]
    fn null_member_access_faults() {
        let (interner, mut interp) = session();
        run(
            &mut interp,
            &interner,
            "class P { public: int v; };\nP* p = 0;",
        )
        .unwrap();
        // 0 converts to a null pointer; access through it faults.
        assert_eq!(
            fault_kind(run(&mut interp, &interner, "p->v")),
            FaultKind::NullAccess
        );
    }
}
