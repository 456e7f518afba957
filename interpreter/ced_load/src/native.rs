//! Native shared-library backend.
//!
//! Every exported function shares one C ABI:
//!
//! ```c
//! int name(int argc, const char **argv, char *out, int out_size);
//! ```
//!
//! Arguments cross the boundary rendered as strings and the result comes
//! back the same way, parsed per the manifest signature. A nonzero return
//! reports failure and surfaces as a fault at the call site.

use crate::manifest::{parse_manifest, ManifestEntry, MANIFEST_SYMBOL};
use crate::LoadError;
use ced_ir::{Name, TypeRef};
use ced_rt::Value;
use ced_table::ForeignFn;
use libloading::Library;
use std::ffi::{c_char, c_int, CStr, CString};
use std::path::Path;
use std::rc::Rc;

const OUT_BUF_SIZE: usize = 4096;

type RawExport = unsafe extern "C" fn(c_int, *const *const c_char, *mut c_char, c_int) -> c_int;
type RawManifest = unsafe extern "C" fn() -> *const c_char;

#[allow(unsafe_code, reason = "opening a shared library is inherently FFI")]
pub(crate) fn open(path: &Path) -> Result<Library, LoadError> {
    unsafe { Library::new(path) }.map_err(|err| LoadError::Open {
        path: path.to_owned(),
        message: err.to_string(),
    })
}

#[allow(unsafe_code, reason = "reads the module's export manifest over FFI")]
pub(crate) fn read_manifest(
    library: &Library,
    path: &Path,
    string_type: Name,
) -> Result<Vec<ManifestEntry>, LoadError> {
    let text = unsafe {
        let symbol = library
            .get::<RawManifest>(MANIFEST_SYMBOL.as_bytes())
            .map_err(|_| LoadError::MissingManifest {
                path: path.to_owned(),
            })?;
        let raw = symbol();
        if raw.is_null() {
            return Err(LoadError::MissingManifest {
                path: path.to_owned(),
            });
        }
        CStr::from_ptr(raw).to_string_lossy().into_owned()
    };
    parse_manifest(&text, string_type)
}

#[allow(unsafe_code, reason = "resolves and wraps a C entry point")]
pub(crate) fn bind(library: &Library, entry: &ManifestEntry) -> Result<ForeignFn, LoadError> {
    // The raw pointer stays valid for as long as the Library is alive; the
    // bridge keeps the Library until every wrapper is released.
    let raw: RawExport = unsafe {
        library
            .get::<RawExport>(entry.name.as_bytes())
            .map(|symbol| *symbol)
            .map_err(|_| LoadError::MissingSymbol {
                symbol: entry.name.clone(),
            })?
    };
    let name = entry.name.clone();
    let ret = entry.signature.ret.clone();
    Ok(Rc::new(move |args: &[Value]| call(raw, &name, &ret, args)))
}

#[allow(unsafe_code, reason = "invokes the module entry point")]
fn call(raw: RawExport, name: &str, ret: &TypeRef, args: &[Value]) -> Result<Value, String> {
    let rendered: Vec<CString> = args.iter().map(render).collect::<Result<_, _>>()?;
    let argv: Vec<*const c_char> = rendered.iter().map(|arg| arg.as_ptr()).collect();
    let mut out = vec![0u8; OUT_BUF_SIZE];
    let status = unsafe {
        raw(
            argv.len() as c_int,
            argv.as_ptr(),
            out.as_mut_ptr().cast::<c_char>(),
            OUT_BUF_SIZE as c_int,
        )
    };
    if status != 0 {
        return Err(format!("`{name}` failed with status {status}"));
    }
    let end = out.iter().position(|b| *b == 0).unwrap_or(out.len());
    let text = String::from_utf8_lossy(&out[..end]).into_owned();
    parse_result(&text, ret, name)
}

fn render(value: &Value) -> Result<CString, String> {
    let text = match value {
        Value::Void => String::new(),
        Value::Null => "0".to_owned(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_owned(),
        Value::Char(c) => c.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Str(s) => s.to_string(),
        Value::Object(_) | Value::Array(_) => {
            return Err(format!(
                "{} values cannot cross the module boundary",
                value.type_name()
            ));
        }
    };
    CString::new(text).map_err(|_| "argument contains an interior nul byte".to_owned())
}

fn parse_result(text: &str, ret: &TypeRef, name: &str) -> Result<Value, String> {
    match ret {
        TypeRef::Void => Ok(Value::Void),
        TypeRef::Int => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| bad_result(name, text)),
        TypeRef::Double => text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| bad_result(name, text)),
        TypeRef::Bool => {
            let text = text.trim();
            Ok(Value::Bool(!text.is_empty() && text != "0"))
        }
        TypeRef::Char => Ok(Value::Char(text.chars().next().unwrap_or('\0'))),
        _ => Ok(Value::string(text)),
    }
}

fn bad_result(name: &str, text: &str) -> String {
    format!("`{name}` returned an unparsable result `{text}`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_values_render_as_strings() {
        assert_eq!(render(&Value::Int(-7)).unwrap().to_str().unwrap(), "-7");
        assert_eq!(render(&Value::Bool(true)).unwrap().to_str().unwrap(), "1");
        assert_eq!(
            render(&Value::string("hi")).unwrap().to_str().unwrap(),
            "hi"
        );
        assert!(render(&Value::array(vec![])).is_err());
    }

    #[test]
    fn results_parse_per_return_type() {
        assert_eq!(parse_result("42", &TypeRef::Int, "f").unwrap(), Value::Int(42));
        assert_eq!(
            parse_result("2.5", &TypeRef::Double, "f").unwrap(),
            Value::Double(2.5)
        );
        assert_eq!(
            parse_result("0", &TypeRef::Bool, "f").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(parse_result("", &TypeRef::Void, "f").unwrap(), Value::Void);
        assert!(parse_result("nope", &TypeRef::Int, "f").is_err());
    }
}
