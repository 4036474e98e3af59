//! The built-in `Std` library namespaces.
//!
//! These have no Magolor source. The registry seeds an empty module for each
//! one and imports of them always resolve to themselves.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::module::SymbolKind;

/// The root built-in namespace.
pub const BUILTIN_ROOT: &str = "Std";

/// Functions callable without any `using`.
pub const INTRINSICS: &[&str] = &["print", "println", "eprint", "eprintln", "readLine"];

const STD: &[&str] = &[
    "print", "println", "eprint", "eprintln", "readLine", "IO", "Parse", "Option", "Math",
    "String", "Array", "Map", "Set", "File", "Network", "Time", "Random", "System",
];

const IO: &[&str] = &[
    "print", "println", "eprint", "eprintln", "readLine", "read", "readChar", "readFile",
    "writeFile", "appendFile",
];

const PARSE: &[&str] = &["parseInt", "parseFloat", "parseBool"];

const OPTION: &[&str] = &["isSome", "isNone", "unwrap", "unwrapOr"];

const MATH: &[&str] = &[
    "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "abs", "pow", "exp", "log",
    "log10", "log2", "floor", "ceil", "round", "min", "max", "clamp", "PI", "E",
];

const STRING: &[&str] = &[
    "length", "isEmpty", "trim", "toLower", "toUpper", "startsWith", "endsWith", "contains",
    "replace", "split", "join", "repeat", "substring",
];

const ARRAY: &[&str] = &[
    "length", "isEmpty", "push", "pop", "contains", "reverse", "sort", "indexOf", "clear",
];

const MAP: &[&str] = &[
    "create", "insert", "get", "getOr", "contains", "remove", "size", "isEmpty", "clear", "keys",
    "values",
];

const SET: &[&str] = &[
    "create", "insert", "contains", "remove", "size", "isEmpty", "clear", "toArray", "union_",
    "intersection", "difference",
];

const FILE: &[&str] = &[
    "exists", "isFile", "isDirectory", "createDir", "remove", "removeAll", "copy", "rename",
    "size", "readFile", "writeFile", "appendFile", "Handle", "Mode", "Seek", "open", "close",
    "read", "write", "read_bytes", "write_u32", "write_u64", "seek", "tell", "flush",
];

const NETWORK: &[&str] = &[
    "HttpServer", "HttpRequest", "HttpResponse", "jsonResponse", "htmlResponse", "textResponse",
    "redirectResponse", "urlEncode", "urlDecode", "parseQuery", "ping", "getLocalIP", "httpGet",
    "Status", "serveFile", "HTTP", "WebSocket", "TCP", "UDP", "Security", "JSON", "Routing",
];

const CONSTANTS: &[&str] = &["PI", "E"];

const TIME: &[&str] = &["now", "sleep", "timestamp"];

const RANDOM: &[&str] = &["randInt", "randFloat", "randBool"];

const SYSTEM: &[&str] = &["exit", "getEnv", "execute"];

lazy_static! {
    static ref BUILTIN_MODULES: HashMap<&'static str, &'static [&'static str]> = {
        let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        map.insert("Std", STD);
        map.insert("Std.IO", IO);
        map.insert("Std.Parse", PARSE);
        map.insert("Std.Option", OPTION);
        map.insert("Std.Math", MATH);
        map.insert("Std.String", STRING);
        map.insert("Std.Array", ARRAY);
        map.insert("Std.Map", MAP);
        map.insert("Std.Set", SET);
        map.insert("Std.File", FILE);
        map.insert("Std.Network", NETWORK);
        map.insert("Std.Time", TIME);
        map.insert("Std.Random", RANDOM);
        map.insert("Std.System", SYSTEM);
        map.insert("Std.Network.HTTP", &[]);
        map.insert("Std.Network.WebSocket", &[]);
        map.insert("Std.Network.TCP", &[]);
        map.insert("Std.Network.UDP", &[]);
        map.insert("Std.Network.Security", &[]);
        map.insert("Std.Network.JSON", &[]);
        map.insert("Std.Network.Routing", &[]);
        map
    };
}

pub fn is_builtin_module(path: &str) -> bool {
    BUILTIN_MODULES.contains_key(path)
}

pub fn is_intrinsic(name: &str) -> bool {
    INTRINSICS.contains(&name)
}

/// Members exported by a built-in namespace, `None` for any other path.
pub fn builtin_members(path: &str) -> Option<&'static [&'static str]> {
    BUILTIN_MODULES.get(path).copied()
}

/// Every built-in namespace path, sorted.
pub fn builtin_module_paths() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = BUILTIN_MODULES.keys().copied().collect();
    paths.sort_unstable();
    paths
}

/// Classifies a built-in member: the math constants are variables, other
/// capitalised names are types or nested namespaces.
pub fn builtin_member_kind(name: &str) -> SymbolKind {
    if CONSTANTS.contains(&name) {
        SymbolKind::Variable
    } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        SymbolKind::Class
    } else {
        SymbolKind::Function
    }
}
