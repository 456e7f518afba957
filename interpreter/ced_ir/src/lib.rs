//! Shared IR for the Cedilla interpreter.
//!
//! Home of the types every stage exchanges: source spans, interned names,
//! tokens, the AST produced by the parser, and the class metadata consumed
//! by the dictionary generator.

mod ast;
mod class_info;
mod interner;
mod span;
mod token;

pub use ast::{
    AssignOp, BaseSpecifier, BinaryOp, Block, ClassDecl, ClassMember, Decl, Expr, FieldDecl,
    FunctionDecl, Item, MethodDecl, NamespaceDecl, Param, Signature, Stmt, TemplateDecl,
    TranslationUnit, TypeRef, UnaryOp, VarDecl,
};
pub use class_info::{Access, ClassInfo, DispatchKind, MemberInfo, MethodInfo};
pub use interner::{Name, StringInterner};
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
