//! Statement execution.
//!
//! Statements run against a scope in the symbol table; blocks and loops
//! enter a child scope and exit it on the way out, including the unwinding
//! paths, so a fault never leaks local bindings.

mod expr;

use crate::Interpreter;
use ced_ir::{Expr, Span, Stmt, TypeRef, VarDecl};
use ced_rt::{Fault, FaultKind, Signal, Value};
use ced_table::{DeclareError, ScopeId, ScopeKind, Storage, Symbol};

impl Interpreter {
    /// Runs one statement. `Ok(Some(_))` carries the value of a bare
    /// expression statement, which is what the session echoes for the last
    /// top-level expression.
    pub(crate) fn exec_stmt(
        &mut self,
        stmt: &Stmt,
        scope: ScopeId,
    ) -> Result<Option<Value>, Signal> {
        match stmt {
            Stmt::Expr(expr) => self.eval(expr, scope).map(Some),
            Stmt::Block(block) => {
                let inner = self.table.enter(ScopeKind::Block, scope);
                let result = self.exec_stmts(&block.stmts, inner);
                self.table.exit(inner);
                result.map(|()| None)
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                if self.truthy(cond, scope)? {
                    self.exec_stmt(then_branch, scope)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch, scope)?;
                }
                Ok(None)
            }
            Stmt::While { cond, body, .. } => {
                loop {
                    if !self.truthy(cond, scope)? {
                        break;
                    }
                    match self.exec_loop_body(body, scope) {
                        Ok(()) => {}
                        Err(Signal::Break(_)) => break,
                        Err(Signal::Continue(_)) => {}
                        Err(other) => return Err(other),
                    }
                }
                Ok(None)
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                // The init declaration lives in its own scope around the loop.
                let inner = self.table.enter(ScopeKind::Block, scope);
                let result = self.for_loop(
                    init.as_deref(),
                    cond.as_ref(),
                    step.as_ref(),
                    body,
                    inner,
                );
                self.table.exit(inner);
                result.map(|()| None)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Void,
                };
                Err(Signal::Return(value))
            }
            Stmt::Decl(var) => {
                self.declare_local(var, scope)?;
                Ok(None)
            }
            Stmt::Break { span } => Err(Signal::Break(*span)),
            Stmt::Continue { span } => Err(Signal::Continue(*span)),
            Stmt::Empty { .. } => Ok(None),
        }
    }

    pub(crate) fn exec_stmts(&mut self, stmts: &[Stmt], scope: ScopeId) -> Result<(), Signal> {
        for stmt in stmts {
            self.exec_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn for_loop(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
        scope: ScopeId,
    ) -> Result<(), Signal> {
        if let Some(init) = init {
            self.exec_stmt(init, scope)?;
        }
        loop {
            if let Some(cond) = cond {
                if !self.truthy(cond, scope)? {
                    break;
                }
            }
            match self.exec_loop_body(body, scope) {
                Ok(()) => {}
                Err(Signal::Break(_)) => break,
                Err(Signal::Continue(_)) => {}
                Err(other) => return Err(other),
            }
            if let Some(step) = step {
                self.eval(step, scope)?;
            }
        }
        Ok(())
    }

    /// A loop body statement gets a fresh scope every iteration, so a
    /// declaration body (`for (...) int x = 1;`) redeclares cleanly. Block
    /// bodies already enter their own scope.
    fn exec_loop_body(&mut self, body: &Stmt, scope: ScopeId) -> Result<(), Signal> {
        match body {
            Stmt::Block(_) => self.exec_stmt(body, scope).map(|_| ()),
            _ => {
                let inner = self.table.enter(ScopeKind::Block, scope);
                let result = self.exec_stmt(body, inner);
                self.table.exit(inner);
                result.map(|_| ())
            }
        }
    }

    fn truthy(&mut self, cond: &Expr, scope: ScopeId) -> Result<bool, Signal> {
        let value = self.eval(cond, scope)?;
        value.truthy().ok_or_else(|| {
            Fault::new(
                FaultKind::TypeMismatch,
                format!("{} is not testable as a condition", value.type_name()),
                cond.span(),
            )
            .into()
        })
    }

    fn declare_local(&mut self, var: &VarDecl, scope: ScopeId) -> Result<(), Signal> {
        let value = self.initial_value(var, scope)?;
        self.table
            .declare(
                scope,
                Symbol::variable(var.name, var.ty.clone(), value, Storage::Local, var.span),
            )
            .map_err(|err| self.declare_fault(err))
    }

    /// The value a fresh variable starts with: the converted initializer, a
    /// default-constructed object for a class-typed declaration, or the
    /// type's zero value.
    pub(crate) fn initial_value(
        &mut self,
        var: &VarDecl,
        scope: ScopeId,
    ) -> Result<Value, Signal> {
        match &var.init {
            Some(expr) => {
                let value = self.eval(expr, scope)?;
                self.convert(value, &var.ty, var.span).map_err(Signal::from)
            }
            None => match self.constructible_class(&var.ty) {
                Some(class) => self.construct(class, Vec::new(), var.span),
                None => Ok(self.default_value(&var.ty)),
            },
        }
    }

    /// A class name to default-construct for a by-value declaration.
    /// Pointer and reference declarations start null instead.
    fn constructible_class(&self, ty: &TypeRef) -> Option<ced_ir::Name> {
        match ty {
            TypeRef::Named(name) if *name != self.string_name => {
                self.dictionary.find(*name).map(|entry| entry.class)
            }
            _ => None,
        }
    }

    pub(crate) fn default_value(&self, ty: &TypeRef) -> Value {
        match ty {
            TypeRef::Void => Value::Void,
            TypeRef::Bool => Value::Bool(false),
            TypeRef::Char => Value::Char('\0'),
            TypeRef::Int => Value::Int(0),
            TypeRef::Double => Value::Double(0.0),
            TypeRef::Named(name) if *name == self.string_name => Value::string(""),
            TypeRef::Named(_) | TypeRef::Pointer(_) | TypeRef::Reference(_) => Value::Null,
            TypeRef::Template(..) | TypeRef::Array(_, None) => Value::array(Vec::new()),
            TypeRef::Array(inner, Some(len)) => {
                Value::array((0..*len).map(|_| self.default_value(inner)).collect())
            }
        }
    }

    /// Coerces `value` into the shape `ty` demands, or faults.
    pub(crate) fn convert(
        &self,
        value: Value,
        ty: &TypeRef,
        span: Span,
    ) -> Result<Value, Fault> {
        match ty {
            TypeRef::Void => Ok(value),
            TypeRef::Reference(inner) => self.convert(value, inner, span),
            TypeRef::Bool => match value.truthy() {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Int => {
                if let Value::Double(d) = value {
                    return Ok(Value::Int(d as i64));
                }
                match value.as_int() {
                    Some(n) => Ok(Value::Int(n)),
                    None => Err(self.conversion_fault(&value, ty, span)),
                }
            }
            TypeRef::Double => match value.as_double() {
                Some(d) => Ok(Value::Double(d)),
                None => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Char => match value {
                Value::Char(_) => Ok(value),
                Value::Int(n) => Ok(Value::Char((n as u8) as char)),
                _ => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Named(name) if *name == self.string_name => match value {
                Value::Str(_) => Ok(value),
                _ => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Named(class) | TypeRef::Template(class, _) => match &value {
                Value::Object(obj) => {
                    let dynamic = obj.borrow().class;
                    if self.class_compatible(*class, dynamic) {
                        Ok(value)
                    } else {
                        Err(self.conversion_fault(&value, ty, span))
                    }
                }
                Value::Null => Ok(Value::Null),
                Value::Array(_) if matches!(ty, TypeRef::Template(..)) => Ok(value),
                _ => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Pointer(inner) => match (&value, inner.as_ref()) {
                (Value::Null, _) => Ok(Value::Null),
                // Literal 0 is the classic null pointer spelling.
                (Value::Int(0), _) => Ok(Value::Null),
                (Value::Str(_), TypeRef::Char) => Ok(value),
                // Arrays decay to a pointer to their storage.
                (Value::Array(_), _) => Ok(value),
                (Value::Object(obj), _) => {
                    let dynamic = obj.borrow().class;
                    match inner.class_name() {
                        Some(class) if self.class_compatible(class, dynamic) => Ok(value),
                        _ => Err(self.conversion_fault(&value, ty, span)),
                    }
                }
                _ => Err(self.conversion_fault(&value, ty, span)),
            },
            TypeRef::Array(..) => match value {
                Value::Array(_) => Ok(value),
                _ => Err(self.conversion_fault(&value, ty, span)),
            },
        }
    }

    /// `dynamic` fits where `target` is expected: same class or an upcast.
    fn class_compatible(&self, target: ced_ir::Name, dynamic: ced_ir::Name) -> bool {
        dynamic == target
            || self
                .dictionary
                .find(dynamic)
                .is_some_and(|entry| entry.derives_from(target))
            || self.table.is_base_of(target, dynamic)
    }

    fn conversion_fault(&self, value: &Value, ty: &TypeRef, span: Span) -> Fault {
        Fault::new(
            FaultKind::TypeMismatch,
            format!(
                "cannot convert {} to {}",
                value.type_name(),
                ty.describe(&self.interner)
            ),
            span,
        )
    }

    pub(crate) fn declare_fault(&self, err: DeclareError) -> Signal {
        let name = self.interner.lookup(err.name());
        let message = match &err {
            DeclareError::Redeclaration { existing_kind, .. } => {
                format!("`{name}` is already declared in this scope as a {existing_kind}")
            }
            DeclareError::ForeignClash { .. } => {
                format!("foreign symbol `{name}` clashes with an existing binding")
            }
        };
        Fault::new(FaultKind::TypeMismatch, message, err.span()).into()
    }
}
