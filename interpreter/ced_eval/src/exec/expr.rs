//! Expression evaluation.
//!
//! Name resolution inside a method body goes local scope first, then the
//! receiver's fields, then globals, so fields shadow globals but lose to
//! parameters. Calls resolve overloads against the evaluated argument
//! values; virtual methods re-dispatch on the receiver's dynamic class.

use crate::operators;
use crate::stack::ensure_sufficient_stack;
use crate::Interpreter;
use ced_ir::{BinaryOp, ClassMember, Expr, MethodDecl, Name, Span, TypeRef};
use ced_rt::{EvalResult, Fault, FaultKind, ObjectData, Signal, Value};
use ced_table::{OverloadError, ScopeId, ScopeKind, Storage, Symbol, SymbolKind};
use std::cell::RefCell;
use std::rc::Rc;

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr, scope: ScopeId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr, scope))
    }

    fn eval_inner(&mut self, expr: &Expr, scope: ScopeId) -> EvalResult {
        match expr {
            Expr::IntLit { value, .. } => Ok(Value::Int(*value)),
            Expr::FloatLit { bits, .. } => Ok(Value::Double(Expr::float_value(*bits))),
            Expr::BoolLit { value, .. } => Ok(Value::Bool(*value)),
            Expr::CharLit { value, .. } => Ok(Value::Char(*value)),
            Expr::StrLit { value, .. } => Ok(Value::string(self.interner.lookup(*value))),
            Expr::NullLit { .. } => Ok(Value::Null),
            Expr::Ident { name, span } => self.load_name(*name, scope, *span),
            Expr::Path { segments, span } => {
                let name = self.flatten_path(segments);
                self.load_name(name, ScopeId::GLOBAL, *span)
            }
            Expr::Unary { op, operand, span } => {
                let value = self.eval(operand, scope)?;
                match op {
                    ced_ir::UnaryOp::Deref => match value {
                        Value::Null => Err(Fault::new(
                            FaultKind::NullAccess,
                            "dereference of null",
                            *span,
                        )
                        .into()),
                        // Objects and arrays already are handles.
                        other => Ok(other),
                    },
                    ced_ir::UnaryOp::AddrOf => Ok(value),
                    _ => operators::unary(*op, &value, *span).map_err(Signal::from),
                }
            }
            Expr::Binary { op, lhs, rhs, span } => self.eval_binary(*op, lhs, rhs, scope, *span),
            Expr::Assign {
                op,
                target,
                value,
                span,
            } => {
                let rhs = self.eval(value, scope)?;
                let new = match op.binary_op() {
                    Some(bin) => {
                        let current = self.eval(target, scope)?;
                        operators::binary(bin, &current, &rhs, *span).map_err(Signal::from)?
                    }
                    None => rhs,
                };
                self.store(target, new, scope, *span)
            }
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
                span,
            } => {
                let value = self.eval(cond, scope)?;
                let taken = value.truthy().ok_or_else(|| {
                    Signal::from(Fault::new(
                        FaultKind::TypeMismatch,
                        format!("{} is not testable as a condition", value.type_name()),
                        *span,
                    ))
                })?;
                if taken {
                    self.eval(then_expr, scope)
                } else {
                    self.eval(else_expr, scope)
                }
            }
            Expr::Call { callee, args, span } => self.eval_call(callee, args, scope, *span),
            Expr::Member {
                object,
                member,
                span,
                ..
            } => self.read_member(object, *member, scope, *span),
            Expr::Index {
                object,
                index,
                span,
            } => self.read_index(object, index, scope, *span),
            Expr::New { class, args, span } => {
                let values = self.eval_args(args, scope)?;
                self.construct(*class, values, *span)
            }
            Expr::IncDec {
                increment,
                prefix,
                target,
                span,
            } => {
                let current = self.eval(target, scope)?;
                let one = match current {
                    Value::Double(_) => Value::Double(1.0),
                    _ => Value::Int(1),
                };
                let op = if *increment {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };
                let updated =
                    operators::binary(op, &current, &one, *span).map_err(Signal::from)?;
                let stored = self.store(target, updated, scope, *span)?;
                Ok(if *prefix { stored } else { current })
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        // && and || short-circuit; everything else evaluates both sides.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let left = self.eval(lhs, scope)?;
            let left = left.truthy().ok_or_else(|| {
                Signal::from(Fault::new(
                    FaultKind::TypeMismatch,
                    format!("{} is not testable as a condition", left.type_name()),
                    lhs.span(),
                ))
            })?;
            if (op == BinaryOp::And && !left) || (op == BinaryOp::Or && left) {
                return Ok(Value::Bool(left));
            }
            let right = self.eval(rhs, scope)?;
            return match right.truthy() {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(Fault::new(
                    FaultKind::TypeMismatch,
                    format!("{} is not testable as a condition", right.type_name()),
                    rhs.span(),
                )
                .into()),
            };
        }
        let left = self.eval(lhs, scope)?;
        let right = self.eval(rhs, scope)?;
        operators::binary(op, &left, &right, span).map_err(Signal::from)
    }

    // Name resolution

    pub(crate) fn flatten_path(&self, segments: &[Name]) -> Name {
        let rendered = segments
            .iter()
            .map(|s| self.interner.lookup(*s))
            .collect::<Vec<_>>()
            .join("::");
        self.interner.intern(&rendered)
    }

    fn load_name(&mut self, name: Name, scope: ScopeId, span: Span) -> EvalResult {
        if let Some(kind) = self
            .table
            .lookup_local(scope, name)
            .map(|s| s.kind.clone())
        {
            return self.kind_value(name, &kind, span);
        }
        if let Some(this) = self.this_stack.last() {
            if let Some(value) = this.borrow().fields.get(&name) {
                return Ok(value.clone());
            }
        }
        if let Some(kind) = self
            .table
            .lookup(ScopeId::GLOBAL, name)
            .map(|s| s.kind.clone())
        {
            return self.kind_value(name, &kind, span);
        }
        Err(self.unresolved(name, span).into())
    }

    fn kind_value(&self, name: Name, kind: &SymbolKind, span: Span) -> EvalResult {
        match kind {
            SymbolKind::Variable { value, .. } => Ok(value.clone()),
            other => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!(
                    "`{}` is a {}, not a value",
                    self.interner.lookup(name),
                    other.describe()
                ),
                span,
            )
            .into()),
        }
    }

    pub(crate) fn unresolved(&self, name: Name, span: Span) -> Fault {
        Fault::new(
            FaultKind::UnresolvedSymbol,
            format!("`{}` is not defined", self.interner.lookup(name)),
            span,
        )
    }

    // Assignment

    fn store(&mut self, target: &Expr, value: Value, scope: ScopeId, span: Span) -> EvalResult {
        match target {
            Expr::Ident { name, .. } => self.store_name(*name, value, scope, span),
            Expr::Path { segments, .. } => {
                let name = self.flatten_path(segments);
                self.store_name(name, value, ScopeId::GLOBAL, span)
            }
            Expr::Member { object, member, .. } => {
                let receiver = self.eval(object, scope)?;
                self.store_field(&receiver, *member, value, span)
            }
            Expr::Index { object, index, .. } => {
                let receiver = self.eval(object, scope)?;
                let idx = self.eval(index, scope)?;
                self.store_element(&receiver, &idx, value, span)
            }
            Expr::Unary {
                op: ced_ir::UnaryOp::Deref,
                operand,
                ..
            } => self.store(operand, value, scope, span),
            _ => Err(Fault::new(
                FaultKind::TypeMismatch,
                "expression is not assignable",
                span,
            )
            .into()),
        }
    }

    fn store_name(&mut self, name: Name, value: Value, scope: ScopeId, span: Span) -> EvalResult {
        // Local variable.
        let declared = self.table.lookup_local(scope, name).and_then(|s| match &s.kind {
            SymbolKind::Variable { ty, .. } => Some(ty.clone()),
            _ => None,
        });
        if let Some(ty) = declared {
            let converted = self.convert(value, &ty, span)?;
            if let Some(Symbol {
                kind: SymbolKind::Variable { value: slot, .. },
                ..
            }) = self.table.lookup_local_mut(scope, name)
            {
                *slot = converted.clone();
            }
            return Ok(converted);
        }

        // Receiver field inside a method body.
        let this = self.this_stack.last().map(Rc::clone);
        if let Some(this) = this {
            let class = this.borrow().class;
            let member_ty = self
                .dictionary
                .find(class)
                .and_then(|entry| entry.member(name))
                .map(|m| m.ty.clone());
            if let Some(ty) = member_ty {
                let converted = self.convert(value, &ty, span)?;
                this.borrow_mut().fields.insert(name, converted.clone());
                return Ok(converted);
            }
        }

        // Global.
        let declared = self
            .table
            .lookup(ScopeId::GLOBAL, name)
            .map(|s| (s.kind.clone(), s.span));
        match declared {
            Some((SymbolKind::Variable { ty, .. }, _)) => {
                let converted = self.convert(value, &ty, span)?;
                if let Some(Symbol {
                    kind: SymbolKind::Variable { value: slot, .. },
                    ..
                }) = self.table.lookup_mut(ScopeId::GLOBAL, name)
                {
                    *slot = converted.clone();
                }
                Ok(converted)
            }
            Some((other, _)) => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!(
                    "cannot assign to `{}`, a {}",
                    self.interner.lookup(name),
                    other.describe()
                ),
                span,
            )
            .into()),
            None => Err(self.unresolved(name, span).into()),
        }
    }

    fn store_field(
        &mut self,
        receiver: &Value,
        member: Name,
        value: Value,
        span: Span,
    ) -> EvalResult {
        match receiver {
            Value::Object(data) => {
                let class = data.borrow().class;
                let member_ty = self
                    .dictionary
                    .find(class)
                    .and_then(|entry| entry.member(member))
                    .map(|m| m.ty.clone());
                let known = member_ty.is_some() || data.borrow().fields.contains_key(&member);
                if !known {
                    return Err(self.missing_member(class, member, span).into());
                }
                let converted = match member_ty {
                    Some(ty) => self.convert(value, &ty, span)?,
                    None => value,
                };
                data.borrow_mut().fields.insert(member, converted.clone());
                Ok(converted)
            }
            Value::Null => {
                Err(Fault::new(FaultKind::NullAccess, "member access through null", span).into())
            }
            other => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} has no members", other.type_name()),
                span,
            )
            .into()),
        }
    }

    fn store_element(
        &mut self,
        receiver: &Value,
        index: &Value,
        value: Value,
        span: Span,
    ) -> EvalResult {
        let Some(idx) = index.as_int() else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} is not an index", index.type_name()),
                span,
            )
            .into());
        };
        match receiver {
            Value::Array(arr) => {
                let len = arr.borrow().len();
                let slot = usize::try_from(idx).ok().filter(|i| *i < len);
                match slot {
                    Some(i) => {
                        arr.borrow_mut()[i] = value.clone();
                        Ok(value)
                    }
                    None => Err(Fault::new(
                        FaultKind::Arithmetic,
                        format!("index {idx} out of bounds for length {len}"),
                        span,
                    )
                    .into()),
                }
            }
            Value::Null => {
                Err(Fault::new(FaultKind::NullAccess, "index through null", span).into())
            }
            other => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} is not indexable", other.type_name()),
                span,
            )
            .into()),
        }
    }

    // Member and element reads

    fn read_member(
        &mut self,
        object: &Expr,
        member: Name,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let receiver = self.eval(object, scope)?;
        match receiver {
            Value::Object(data) => {
                let borrowed = data.borrow();
                match borrowed.fields.get(&member) {
                    Some(value) => Ok(value.clone()),
                    None => Err(self.missing_member(borrowed.class, member, span).into()),
                }
            }
            Value::Null => {
                Err(Fault::new(FaultKind::NullAccess, "member access through null", span).into())
            }
            other => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} has no members", other.type_name()),
                span,
            )
            .into()),
        }
    }

    fn missing_member(&self, class: Name, member: Name, span: Span) -> Fault {
        Fault::new(
            FaultKind::UnresolvedSymbol,
            format!(
                "no member `{}` on `{}`",
                self.interner.lookup(member),
                self.interner.lookup(class)
            ),
            span,
        )
    }

    fn read_index(
        &mut self,
        object: &Expr,
        index: &Expr,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let receiver = self.eval(object, scope)?;
        let idx = self.eval(index, scope)?;
        let Some(idx) = idx.as_int() else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} is not an index", idx.type_name()),
                span,
            )
            .into());
        };
        match receiver {
            Value::Array(arr) => {
                let borrowed = arr.borrow();
                usize::try_from(idx)
                    .ok()
                    .and_then(|i| borrowed.get(i).cloned())
                    .ok_or_else(|| {
                        Fault::new(
                            FaultKind::Arithmetic,
                            format!("index {idx} out of bounds for length {}", borrowed.len()),
                            span,
                        )
                        .into()
                    })
            }
            Value::Str(s) => usize::try_from(idx)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Value::Char)
                .ok_or_else(|| {
                    Fault::new(
                        FaultKind::Arithmetic,
                        format!("index {idx} out of bounds for length {}", s.len()),
                        span,
                    )
                    .into()
                }),
            Value::Null => {
                Err(Fault::new(FaultKind::NullAccess, "index through null", span).into())
            }
            other => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("{} is not indexable", other.type_name()),
                span,
            )
            .into()),
        }
    }

    // Calls

    fn eval_args(&mut self, args: &[Expr], scope: ScopeId) -> Result<Vec<Value>, Signal> {
        args.iter().map(|arg| self.eval(arg, scope)).collect()
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        match callee {
            Expr::Ident { name, .. } => {
                let values = self.eval_args(args, scope)?;
                self.call_named(*name, values, scope, span)
            }
            Expr::Path { segments, .. } => {
                let name = self.flatten_path(segments);
                let values = self.eval_args(args, scope)?;
                self.call_named(name, values, ScopeId::GLOBAL, span)
            }
            Expr::Member { object, member, .. } => {
                self.call_method_on(object, *member, args, scope, span)
            }
            other => {
                let value = self.eval(other, scope)?;
                Err(Fault::new(
                    FaultKind::TypeMismatch,
                    format!("{} is not callable", value.type_name()),
                    span,
                )
                .into())
            }
        }
    }

    fn call_named(
        &mut self,
        name: Name,
        values: Vec<Value>,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let Some(kind) = self.table.lookup(scope, name).map(|s| s.kind.clone()) else {
            return Err(self.unresolved(name, span).into());
        };
        match kind {
            SymbolKind::Function(overloads) => {
                let decl = match self.table.resolve_overload(&overloads, &values, &self.interner)
                {
                    Ok(decl) => decl,
                    Err(OverloadError::NoViable) => {
                        return Err(Fault::new(
                            FaultKind::TypeMismatch,
                            format!(
                                "no overload of `{}` accepts ({})",
                                self.interner.lookup(name),
                                describe_args(&values)
                            ),
                            span,
                        )
                        .into());
                    }
                    Err(OverloadError::Ambiguous(_)) => {
                        return Err(Fault::new(
                            FaultKind::AmbiguousCall,
                            format!(
                                "call to `{}` with ({}) is ambiguous",
                                self.interner.lookup(name),
                                describe_args(&values)
                            ),
                            span,
                        )
                        .into());
                    }
                };
                self.call_function(&decl, values, span)
            }
            SymbolKind::Foreign(entry) => {
                if entry.signature.arity() != values.len() {
                    return Err(Fault::new(
                        FaultKind::TypeMismatch,
                        format!(
                            "`{}` expects {} arguments, got {}",
                            self.interner.lookup(name),
                            entry.signature.arity(),
                            values.len()
                        ),
                        span,
                    )
                    .into());
                }
                (entry.func)(&values).map_err(|message| {
                    Fault::new(FaultKind::TypeMismatch, message, span).into()
                })
            }
            SymbolKind::Class(decl) => self.construct(decl.name, values, span),
            SymbolKind::Variable { .. } => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!(
                    "`{}` is a variable, not a function",
                    self.interner.lookup(name)
                ),
                span,
            )
            .into()),
        }
    }

    pub(crate) fn call_function(
        &mut self,
        decl: &ced_ir::FunctionDecl,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let name = self.interner.lookup(decl.name).to_owned();
        let Some(body) = &decl.body else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("`{name}` is declared without a body"),
                span,
            )
            .into());
        };
        self.call_stack.push(name.clone(), span)?;
        let scope = self.table.enter(ScopeKind::Function, ScopeId::GLOBAL);
        let outcome = self.run_body(&decl.params, &body.stmts, args, scope, span);
        self.table.exit(scope);
        self.call_stack.pop();
        self.finish_call(outcome, &decl.ret, &name, span)
    }

    fn run_body(
        &mut self,
        params: &[ced_ir::Param],
        stmts: &[ced_ir::Stmt],
        args: Vec<Value>,
        scope: ScopeId,
        span: Span,
    ) -> Result<Value, Signal> {
        for (param, arg) in params.iter().zip(args) {
            let converted = self.convert(arg, &param.ty, span)?;
            self.table
                .declare(
                    scope,
                    Symbol::variable(
                        param.name,
                        param.ty.clone(),
                        converted,
                        Storage::Local,
                        param.span,
                    ),
                )
                .map_err(|err| self.declare_fault(err))?;
        }
        self.exec_stmts(stmts, scope)?;
        Ok(Value::Void)
    }

    fn finish_call(
        &mut self,
        outcome: Result<Value, Signal>,
        ret: &TypeRef,
        name: &str,
        span: Span,
    ) -> EvalResult {
        match outcome {
            Ok(value) => Ok(value),
            Err(Signal::Return(value)) => {
                if *ret == TypeRef::Void {
                    Ok(Value::Void)
                } else {
                    self.convert(value, ret, span).map_err(Signal::from)
                }
            }
            Err(Signal::Break(sp)) | Err(Signal::Continue(sp)) => Err(Fault::new(
                FaultKind::TypeMismatch,
                "break or continue outside of a loop",
                sp,
            )
            .into()),
            Err(Signal::Fault(mut fault)) => {
                fault.push_frame(name, span);
                Err(Signal::Fault(fault))
            }
        }
    }

    // Methods and construction

    fn call_method_on(
        &mut self,
        object: &Expr,
        member: Name,
        args: &[Expr],
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let receiver = self.eval(object, scope)?;
        let this = match receiver {
            Value::Object(data) => data,
            Value::Null => {
                return Err(
                    Fault::new(FaultKind::NullAccess, "method call through null", span).into(),
                );
            }
            other => {
                return Err(Fault::new(
                    FaultKind::TypeMismatch,
                    format!("{} has no methods", other.type_name()),
                    span,
                )
                .into());
            }
        };
        let values = self.eval_args(args, scope)?;

        // Overloads resolve against the declared (static) class of the
        // receiver expression; the dynamic class only picks the body for
        // virtual methods.
        let static_class = self
            .static_class_of(object, scope)
            .unwrap_or_else(|| this.borrow().class);
        let Some(entry) = self.dictionary.find(static_class) else {
            return Err(self.unresolved(static_class, span).into());
        };
        let candidates = entry.methods_named(member);
        if candidates.is_empty() {
            return Err(self.missing_member(static_class, member, span).into());
        }
        let Some(chosen) = candidates
            .iter()
            .find(|m| m.signature.arity() == values.len())
            .map(|m| (*m).clone())
        else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!(
                    "no overload of `{}::{}` takes {} arguments",
                    self.interner.lookup(static_class),
                    self.interner.lookup(member),
                    values.len()
                ),
                span,
            )
            .into());
        };

        let target_class = if chosen.dispatch.is_virtual() {
            let dynamic = this.borrow().class;
            self.dictionary
                .find(dynamic)
                .and_then(|e| {
                    e.methods_named(member)
                        .into_iter()
                        .find(|m| m.signature.params == chosen.signature.params)
                        .map(|m| m.declared_in)
                })
                .unwrap_or(chosen.declared_in)
        } else {
            chosen.declared_in
        };

        let rendered = format!(
            "{}::{}",
            self.interner.lookup(target_class),
            self.interner.lookup(member)
        );
        let Some(decl) = self.find_method_body(target_class, member, &chosen.signature.params)
        else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("`{rendered}` has no body"),
                span,
            )
            .into());
        };
        self.call_method(&decl, this, values, rendered, span)
    }

    fn call_method(
        &mut self,
        decl: &MethodDecl,
        this: Rc<RefCell<ObjectData>>,
        args: Vec<Value>,
        rendered: String,
        span: Span,
    ) -> EvalResult {
        let Some(body) = &decl.body else {
            return Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("`{rendered}` has no body"),
                span,
            )
            .into());
        };
        self.call_stack.push(rendered.clone(), span)?;
        let scope = self.table.enter(ScopeKind::Function, ScopeId::GLOBAL);
        self.this_stack.push(this);
        let outcome = self.run_body(&decl.params, &body.stmts, args, scope, span);
        self.this_stack.pop();
        self.table.exit(scope);
        self.call_stack.pop();
        self.finish_call(outcome, &decl.ret, &rendered, span)
    }

    /// The declared class behind a simple receiver expression, if any.
    fn static_class_of(&self, expr: &Expr, scope: ScopeId) -> Option<Name> {
        if let Expr::Ident { name, .. } = expr {
            if let Some(SymbolKind::Variable { ty, .. }) =
                self.table.lookup(scope, *name).map(|s| &s.kind)
            {
                return ty.class_name();
            }
        }
        None
    }

    /// Locates the defining `MethodDecl` on `class` itself.
    fn find_method_body(
        &self,
        class: Name,
        method: Name,
        params: &[TypeRef],
    ) -> Option<MethodDecl> {
        let decl = self.table.class(ScopeId::GLOBAL, class)?;
        decl.members.iter().find_map(|member| match member {
            ClassMember::Method(m)
                if m.name == method && m.signature().params == params && m.body.is_some() =>
            {
                Some(m.clone())
            }
            _ => None,
        })
    }

    /// Builds an instance of `class`: fields default-initialized from the
    /// flattened dictionary entry, then the matching constructor (a method
    /// named like the class), if one exists, runs over it.
    pub(crate) fn construct(
        &mut self,
        class: Name,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let Some(entry) = self.dictionary.find(class) else {
            return Err(self.unresolved(class, span).into());
        };
        let members: Vec<(Name, TypeRef)> = entry
            .members
            .iter()
            .map(|m| (m.name, m.ty.clone()))
            .collect();
        let ctor = entry
            .methods_named(class)
            .into_iter()
            .find(|m| m.signature.arity() == args.len())
            .cloned();
        let has_any_ctor = !entry.methods_named(class).is_empty();

        let mut data = ObjectData::new(class);
        for (name, ty) in members {
            data.fields.insert(name, self.default_value(&ty));
        }
        let object = Rc::new(RefCell::new(data));

        match ctor {
            Some(ctor) => {
                let rendered = format!(
                    "{0}::{0}",
                    self.interner.lookup(class)
                );
                let Some(decl) =
                    self.find_method_body(ctor.declared_in, class, &ctor.signature.params)
                else {
                    return Err(Fault::new(
                        FaultKind::TypeMismatch,
                        format!("`{rendered}` has no body"),
                        span,
                    )
                    .into());
                };
                self.call_method(&decl, Rc::clone(&object), args, rendered, span)?;
            }
            None if !args.is_empty() || has_any_ctor => {
                return Err(Fault::new(
                    FaultKind::TypeMismatch,
                    format!(
                        "no constructor of `{}` takes {} arguments",
                        self.interner.lookup(class),
                        args.len()
                    ),
                    span,
                )
                .into());
            }
            None => {}
        }
        Ok(Value::Object(object))
    }
}

fn describe_args(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::type_name)
        .collect::<Vec<_>>()
        .join(", ")
}
