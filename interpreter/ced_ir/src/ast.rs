//! Abstract syntax tree for the interpreted C++ subset.
//!
//! Nodes own their children (a tree, never a graph) and carry spans for
//! diagnostics. Everything derives structural `PartialEq` so parse
//! idempotence is directly testable.

use crate::{Access, Name, Span};

/// One complete source fragment: a file or an interactive line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
}

impl TranslationUnit {
    pub fn new() -> Self {
        TranslationUnit { items: Vec::new() }
    }
}

/// Top-level item. Interactive sessions allow bare statements at file scope,
/// so a unit mixes declarations and statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Decl(Decl),
    Stmt(Stmt),
}

/// A type as written in source.
///
/// Template types are carried as a parameterized reference; they are never
/// instantiated, only recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Void,
    Bool,
    Char,
    Int,
    Double,
    Named(Name),
    Pointer(Box<TypeRef>),
    Reference(Box<TypeRef>),
    Array(Box<TypeRef>, Option<u64>),
    Template(Name, Vec<TypeRef>),
}

impl TypeRef {
    /// The class name behind a value of this type, if any.
    ///
    /// Sees through pointers and references: `Base*` names `Base`.
    pub fn class_name(&self) -> Option<Name> {
        match self {
            TypeRef::Named(n) | TypeRef::Template(n, _) => Some(*n),
            TypeRef::Pointer(inner) | TypeRef::Reference(inner) => inner.class_name(),
            _ => None,
        }
    }

    /// Render the type for diagnostics.
    pub fn describe(&self, interner: &crate::StringInterner) -> String {
        match self {
            TypeRef::Void => "void".to_owned(),
            TypeRef::Bool => "bool".to_owned(),
            TypeRef::Char => "char".to_owned(),
            TypeRef::Int => "int".to_owned(),
            TypeRef::Double => "double".to_owned(),
            TypeRef::Named(n) => interner.lookup(*n).to_owned(),
            TypeRef::Pointer(inner) => format!("{}*", inner.describe(interner)),
            TypeRef::Reference(inner) => format!("{}&", inner.describe(interner)),
            TypeRef::Array(inner, Some(n)) => format!("{}[{n}]", inner.describe(interner)),
            TypeRef::Array(inner, None) => format!("{}[]", inner.describe(interner)),
            TypeRef::Template(n, args) => {
                let args = args
                    .iter()
                    .map(|a| a.describe(interner))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{args}>", interner.lookup(*n))
            }
        }
    }
}

/// Function signature: parameter types plus return type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<TypeRef>,
    pub ret: TypeRef,
}

impl Signature {
    pub fn new(params: Vec<TypeRef>, ret: TypeRef) -> Self {
        Signature { params, ret }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Render as `ret(p1, p2)` for diagnostics and dictionary dumps.
    pub fn describe(&self, interner: &crate::StringInterner) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.describe(interner))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params})", self.ret.describe(interner))
    }
}

// Declarations

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Class(ClassDecl),
    Namespace(NamespaceDecl),
    Function(FunctionDecl),
    Variable(VarDecl),
    Template(TemplateDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Class(d) => d.span,
            Decl::Namespace(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Variable(d) => d.span,
            Decl::Template(d) => d.span,
        }
    }
}

/// `class`/`struct` declaration with base-specifier list and members.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: Name,
    pub is_struct: bool,
    pub bases: Vec<BaseSpecifier>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BaseSpecifier {
    pub name: Name,
    pub access: Access,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub access: Access,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: Name,
    pub ret: TypeRef,
    pub params: Vec<Param>,
    /// `None` for a body-less prototype.
    pub body: Option<Block>,
    pub access: Access,
    pub is_virtual: bool,
    pub is_static: bool,
    pub span: Span,
}

impl MethodDecl {
    pub fn signature(&self) -> Signature {
        Signature::new(
            self.params.iter().map(|p| p.ty.clone()).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub ty: TypeRef,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamespaceDecl {
    pub name: Name,
    pub items: Vec<Decl>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Name,
    pub ret: TypeRef,
    pub params: Vec<Param>,
    pub body: Option<Block>,
    pub span: Span,
}

impl FunctionDecl {
    pub fn signature(&self) -> Signature {
        Signature::new(
            self.params.iter().map(|p| p.ty.clone()).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `template<...>` wrapping a declaration. Recorded as a generic
/// parameterized node; never expanded at parse time.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDecl {
    pub params: Vec<Name>,
    pub decl: Box<Decl>,
    pub span: Span,
}

// Statements

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Block(Block),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Decl(VarDecl),
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Empty {
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(e) => e.span(),
            Stmt::Block(b) => b.span,
            Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Empty { span } => *span,
            Stmt::Decl(d) => d.span,
        }
    }
}

// Expressions

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Deref,
    AddrOf,
}

/// Assignment operator: plain `=` or a compound form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    /// The binary operation a compound assignment applies, if any.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Shl => Some(BinaryOp::Shl),
            AssignOp::Shr => Some(BinaryOp::Shr),
            AssignOp::BitAnd => Some(BinaryOp::BitAnd),
            AssignOp::BitOr => Some(BinaryOp::BitOr),
            AssignOp::BitXor => Some(BinaryOp::BitXor),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    IntLit {
        value: i64,
        span: Span,
    },
    /// Bits of an `f64`, keeping `Expr: PartialEq` exact.
    FloatLit {
        bits: u64,
        span: Span,
    },
    BoolLit {
        value: bool,
        span: Span,
    },
    CharLit {
        value: char,
        span: Span,
    },
    StrLit {
        value: Name,
        span: Span,
    },
    NullLit {
        span: Span,
    },
    Ident {
        name: Name,
        span: Span,
    },
    /// Qualified name such as `Math::pi`.
    Path {
        segments: Vec<Name>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        member: Name,
        /// `true` for `->`, `false` for `.`.
        arrow: bool,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    New {
        class: Name,
        args: Vec<Expr>,
        span: Span,
    },
    /// Prefix or postfix `++`/`--`.
    IncDec {
        increment: bool,
        prefix: bool,
        target: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit { span, .. }
            | Expr::FloatLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::CharLit { span, .. }
            | Expr::StrLit { span, .. }
            | Expr::NullLit { span }
            | Expr::Ident { span, .. }
            | Expr::Path { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::New { span, .. }
            | Expr::IncDec { span, .. } => *span,
        }
    }

    /// Float literal helper: the `f64` behind `FloatLit`.
    pub fn float_value(bits: u64) -> f64 {
        f64::from_bits(bits)
    }
}
