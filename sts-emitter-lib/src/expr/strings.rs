//! String manipulation functions layered on top of the CEL standard library
//!
//! These mirror CEL's `strings` extension. Indices count Unicode code points,
//! not bytes, so `'héllo'.charAt(1)` is `'é'`. `quote` is namespaced and is
//! called as `strings.quote(s)`.

use cel_interpreter::extractors::{Arguments, This};
use cel_interpreter::{Context, ExecutionError, Value};
use std::sync::Arc;

type Result<T> = core::result::Result<T, ExecutionError>;

/// Names of every function registered by [`register`]
pub const FUNCTIONS: &[&str] = &[
    "charAt",
    "format",
    "indexOf",
    "join",
    "lastIndexOf",
    "lowerAscii",
    "quote",
    "replace",
    "reverse",
    "split",
    "substring",
    "trim",
    "upperAscii",
];

/// Receiver that namespaced functions such as `strings.quote` are called on
pub const NAMESPACE: &str = "strings";

/// Functions that are only called through [`NAMESPACE`]
pub const NAMESPACED_FUNCTIONS: &[&str] = &["quote"];

/// Register the string extension functions with a CEL context
pub fn register(context: &mut Context<'_>) {
    context.add_variable_from_value(NAMESPACE, Value::Null);

    context.add_function("charAt", char_at);
    context.add_function("format", format);
    context.add_function("indexOf", index_of);
    context.add_function("join", join);
    context.add_function("lastIndexOf", last_index_of);
    context.add_function("lowerAscii", lower_ascii);
    context.add_function("quote", quote);
    context.add_function("replace", replace);
    context.add_function("reverse", reverse);
    context.add_function("split", split);
    context.add_function("substring", substring);
    context.add_function("trim", trim);
    context.add_function("upperAscii", upper_ascii);
}

fn char_at(This(this): This<Arc<String>>, index: i64) -> Result<Value> {
    let chars: Vec<char> = this.chars().collect();
    let index = code_point_index("charAt", index, chars.len())?;
    Ok(string_value(chars.get(index).map(ToString::to_string).unwrap_or_default()))
}

fn index_of(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let needle: Vec<char> = string_arg("indexOf", &args, 0)?.chars().collect();
    let haystack: Vec<char> = this.chars().collect();
    let start = match optional_int_arg("indexOf", &args, 1)? {
        Some(offset) => code_point_index("indexOf", offset, haystack.len())?,
        None => 0,
    };

    let found = (start..=haystack.len().saturating_sub(needle.len()))
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle.as_slice()));
    Ok(Value::Int(found.map_or(-1, to_int)))
}

fn last_index_of(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let needle: Vec<char> = string_arg("lastIndexOf", &args, 0)?.chars().collect();
    let haystack: Vec<char> = this.chars().collect();
    let end = match optional_int_arg("lastIndexOf", &args, 1)? {
        Some(offset) => code_point_index("lastIndexOf", offset, haystack.len())?,
        None => haystack.len(),
    };

    if needle.len() > haystack.len() {
        return Ok(Value::Int(-1));
    }

    let last_start = end.min(haystack.len() - needle.len());
    let found = (0..=last_start)
        .rev()
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle.as_slice()));
    Ok(Value::Int(found.map_or(-1, to_int)))
}

fn lower_ascii(This(this): This<Arc<String>>) -> String {
    this.to_ascii_lowercase()
}

fn upper_ascii(This(this): This<Arc<String>>) -> String {
    this.to_ascii_uppercase()
}

fn trim(This(this): This<Arc<String>>) -> String {
    this.trim().to_string()
}

fn reverse(This(this): This<Arc<String>>) -> String {
    this.chars().rev().collect()
}

fn quote(Arguments(args): Arguments) -> Result<Value> {
    let text = string_arg("quote", &args, 0)?;

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\u{7}' => quoted.push_str("\\a"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{c}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{b}' => quoted.push_str("\\v"),
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            c => quoted.push(c),
        }
    }
    quoted.push('"');

    Ok(string_value(quoted))
}

/// `printf`-style formatting: `%s`, `%d`, `%f`, `%e`, `%x`, `%X`, `%o`, `%b` and `%%`,
/// with an optional precision for `%f` and `%e`
fn format(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let Some(Value::List(values)) = args.first() else {
        return Err(ExecutionError::function_error("format", "format expects a list of arguments"));
    };

    let mut values = values.iter();
    let mut out = String::with_capacity(this.len());
    let mut chars = this.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            let _ = chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            precision = Some(
                digits
                    .parse::<usize>()
                    .map_err(|_| ExecutionError::function_error("format", "invalid precision in format string"))?,
            );
        }

        let verb = chars
            .next()
            .ok_or_else(|| ExecutionError::function_error("format", "format string ends with an unterminated '%'"))?;
        if verb == '%' {
            out.push('%');
            continue;
        }

        let value = values
            .next()
            .ok_or_else(|| ExecutionError::function_error("format", format!("missing argument for '%{verb}'")))?;
        out.push_str(&format_value(verb, precision, value)?);
    }

    if values.next().is_some() {
        return Err(ExecutionError::function_error("format", "too many arguments for format string"));
    }

    Ok(string_value(out))
}

fn format_value(verb: char, precision: Option<usize>, value: &Value) -> Result<String> {
    let precision = precision.unwrap_or(6);
    let unsupported = || ExecutionError::function_error("format", format!("'%{verb}' cannot format '{value:?}'"));

    match (verb, value) {
        ('s', _) => display_value(value).ok_or_else(unsupported),
        ('d', Value::Int(i)) => Ok(i.to_string()),
        ('d', Value::UInt(u)) => Ok(u.to_string()),
        ('f', _) => numeric(value).map(|f| format!("{f:.precision$}")).ok_or_else(unsupported),
        ('e', _) => numeric(value).map(|f| scientific(f, precision)).ok_or_else(unsupported),
        ('x', Value::Int(i)) => Ok(signed_radix(*i, |u| format!("{u:x}"))),
        ('X', Value::Int(i)) => Ok(signed_radix(*i, |u| format!("{u:X}"))),
        ('o', Value::Int(i)) => Ok(signed_radix(*i, |u| format!("{u:o}"))),
        ('b', Value::Int(i)) => Ok(signed_radix(*i, |u| format!("{u:b}"))),
        ('x', Value::UInt(u)) => Ok(format!("{u:x}")),
        ('X', Value::UInt(u)) => Ok(format!("{u:X}")),
        ('o', Value::UInt(u)) => Ok(format!("{u:o}")),
        ('b', Value::UInt(u)) => Ok(format!("{u:b}")),
        ('x', Value::String(s)) => Ok(s.bytes().map(|b| format!("{b:02x}")).collect()),
        ('X', Value::String(s)) => Ok(s.bytes().map(|b| format!("{b:02X}")).collect()),
        ('d' | 'x' | 'X' | 'o' | 'b', _) => Err(unsupported()),
        _ => Err(ExecutionError::function_error("format", format!("unrecognized formatting clause '%{verb}'"))),
    }
}

fn signed_radix(value: i64, render: impl Fn(u64) -> String) -> String {
    let digits = render(value.unsigned_abs());
    if value < 0 { format!("-{digits}") } else { digits }
}

#[expect(clippy::cast_precision_loss, reason = "integers are formatted as doubles on request")]
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::UInt(u) => Some(*u as f64),
        _ => None,
    }
}

/// Scientific notation with a signed, two-digit exponent, e.g. `1.500000e+03`
fn scientific(value: f64, precision: usize) -> String {
    let rendered = format!("{value:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = exponent.strip_prefix('-').map_or(("+", exponent), |d| ("-", d));
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => rendered,
    }
}

/// The `%s` rendering of a value, or `None` for values without a text form
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::List(items) => {
            let items = items.iter().map(display_value).collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", items.join(", ")))
        }
        _ => None,
    }
}

fn replace(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let from = string_arg("replace", &args, 0)?;
    let to = string_arg("replace", &args, 1)?;
    let replaced = match optional_int_arg("replace", &args, 2)? {
        Some(limit) if limit >= 0 => this.replacen(from.as_str(), to.as_str(), usize::try_from(limit).unwrap_or(usize::MAX)),
        _ => this.replace(from.as_str(), to.as_str()),
    };
    Ok(string_value(replaced))
}

fn split(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let separator = string_arg("split", &args, 0)?;
    let limit = optional_int_arg("split", &args, 1)?.unwrap_or(-1);

    let parts: Vec<String> = if limit == 0 {
        Vec::new()
    } else if separator.is_empty() {
        let chars: Vec<String> = this.chars().map(String::from).collect();
        match usize::try_from(limit) {
            Ok(limit) if limit < chars.len() => {
                let mut parts: Vec<String> = chars[..limit - 1].to_vec();
                parts.push(chars[limit - 1..].concat());
                parts
            }
            _ => chars,
        }
    } else {
        match usize::try_from(limit) {
            Ok(limit) => this.splitn(limit, separator.as_str()).map(str::to_string).collect(),
            Err(_) => this.split(separator.as_str()).map(str::to_string).collect(),
        }
    };

    Ok(Value::List(Arc::new(parts.into_iter().map(string_value).collect())))
}

fn substring(This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let chars: Vec<char> = this.chars().collect();
    let start = code_point_index("substring", int_arg("substring", &args, 0)?, chars.len())?;
    let end = match optional_int_arg("substring", &args, 1)? {
        Some(end) => code_point_index("substring", end, chars.len())?,
        None => chars.len(),
    };

    if start > end {
        return Err(ExecutionError::function_error(
            "substring",
            format!("invalid substring range, start {start} is greater than end {end}"),
        ));
    }

    Ok(string_value(chars[start..end].iter().collect()))
}

fn join(This(this): This<Value>, Arguments(args): Arguments) -> Result<Value> {
    let Value::List(items) = this else {
        return Err(ExecutionError::function_error("join", "join can only be applied to a list of strings"));
    };

    let separator = if args.is_empty() {
        String::new()
    } else {
        string_arg("join", &args, 0)?.to_string()
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items.iter() {
        match item {
            Value::String(s) => parts.push(s.as_str()),
            other => {
                return Err(ExecutionError::function_error("join", format!("join expects a list of strings, found '{other:?}'")));
            }
        }
    }

    Ok(string_value(parts.join(&separator)))
}

fn string_value(s: String) -> Value {
    Value::String(Arc::new(s))
}

fn to_int(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Validate a code point index against a string length; `len` itself is a valid index
fn code_point_index(function: &str, index: i64, len: usize) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i <= len => Ok(i),
        _ => Err(ExecutionError::function_error(function, format!("index out of range: {index}"))),
    }
}

fn string_arg(function: &str, args: &[Value], position: usize) -> Result<Arc<String>> {
    match args.get(position) {
        Some(Value::String(s)) => Ok(Arc::clone(s)),
        Some(other) => Err(ExecutionError::function_error(
            function,
            format!("argument {position} must be a string, found '{other:?}'"),
        )),
        None => Err(ExecutionError::function_error(function, format!("missing argument {position}"))),
    }
}

fn int_arg(function: &str, args: &[Value], position: usize) -> Result<i64> {
    optional_int_arg(function, args, position)?
        .ok_or_else(|| ExecutionError::function_error(function, format!("missing argument {position}")))
}

fn optional_int_arg(function: &str, args: &[Value], position: usize) -> Result<Option<i64>> {
    match args.get(position) {
        None => Ok(None),
        Some(Value::Int(i)) => Ok(Some(*i)),
        Some(Value::UInt(u)) => Ok(Some(i64::try_from(*u).unwrap_or(i64::MAX))),
        Some(other) => Err(ExecutionError::function_error(
            function,
            format!("argument {position} must be an integer, found '{other:?}'"),
        )),
    }
}
