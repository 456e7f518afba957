//! The `cedstd` builtin module.
//!
//! Installed through the loader bridge like any other module, so `:unload
//! cedstd` works and the symbol table sees ordinary foreign entries.

use ced_ir::{Signature, Span, StringInterner, TypeRef};
use ced_load::{HostExport, LoaderBridge};
use ced_rt::Value;
use ced_table::SymbolTable;
use std::rc::Rc;

pub const MODULE: &str = "cedstd";

/// Registers the builtin library into a fresh session.
pub fn install(loader: &mut LoaderBridge, table: &mut SymbolTable, interner: &Rc<StringInterner>) {
    let string = TypeRef::Named(interner.intern("string"));

    let exports = vec![
        HostExport::new(
            "print",
            Signature::new(vec![string.clone()], TypeRef::Void),
            Rc::new(|args: &[Value]| {
                for arg in args {
                    print!("{arg}");
                }
                Ok(Value::Void)
            }),
        ),
        HostExport::new(
            "println",
            Signature::new(vec![string.clone()], TypeRef::Void),
            Rc::new(|args: &[Value]| {
                for arg in args {
                    print!("{arg}");
                }
                println!();
                Ok(Value::Void)
            }),
        ),
        HostExport::new(
            "len",
            Signature::new(vec![string], TypeRef::Int),
            Rc::new(|args: &[Value]| match args.first() {
                Some(Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
                Some(Value::Array(a)) => Ok(Value::Int(a.borrow().len() as i64)),
                Some(other) => Err(format!("len does not apply to {}", other.type_name())),
                None => Err("len takes one argument".to_owned()),
            }),
        ),
        numeric("sqrt", f64::sqrt),
        numeric("floor", f64::floor),
        numeric("abs", f64::abs),
        HostExport::new(
            "pow",
            Signature::new(vec![TypeRef::Double, TypeRef::Double], TypeRef::Double),
            Rc::new(|args: &[Value]| {
                match (
                    args.first().and_then(Value::as_double),
                    args.get(1).and_then(Value::as_double),
                ) {
                    (Some(base), Some(exp)) => Ok(Value::Double(base.powf(exp))),
                    _ => Err("pow takes two numbers".to_owned()),
                }
            }),
        ),
    ];

    // A fresh table cannot clash with the builtin names.
    let _ = loader.register(MODULE, exports, table, Span::DUMMY);
}

fn numeric(name: &str, op: fn(f64) -> f64) -> HostExport {
    let label = name.to_owned();
    HostExport::new(
        name,
        Signature::new(vec![TypeRef::Double], TypeRef::Double),
        Rc::new(move |args: &[Value]| match args.first().and_then(Value::as_double) {
            Some(x) => Ok(Value::Double(op(x))),
            None => Err(format!("{label} takes a number")),
        }),
    )
}
