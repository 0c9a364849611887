//! Python literal and call-expression helpers shared by every renderer.

/// `True` / `False`.
pub fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// A double-quoted string literal.
pub fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A float literal that always reads back as a Python float.
pub fn py_float(value: f64) -> String {
    // Debug keeps a trailing ".0" on whole numbers; Display would not.
    format!("{:?}", value)
}

pub fn py_opt<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

/// A tuple literal; one element gets the trailing comma Python requires.
pub fn py_tuple<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [single] => format!("({},)", single.as_ref()),
        _ => format!("({})", join(items)),
    }
}

pub fn py_list<S: AsRef<str>>(items: &[S]) -> String {
    format!("[{}]", join(items))
}

pub fn py_pair(pair: (u32, u32)) -> String {
    format!("({}, {})", pair.0, pair.1)
}

/// A shape tuple where `None` marks an unknown dimension.
pub fn py_shape(shape: &[Option<u32>]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| py_opt(*d)).collect();
    py_tuple(&dims)
}

/// `callee(arg, key=value, ...)` on one line.
pub fn call(callee: &str, args: &[String]) -> String {
    format!("{}({})", callee, args.join(", "))
}

/// `callee(` + one argument per line indented four spaces + `)`.
pub fn call_multiline(callee: &str, args: &[String]) -> String {
    if args.is_empty() {
        return format!("{}()", callee);
    }
    let body: Vec<String> = args.iter().map(|a| format!("    {}", a)).collect();
    format!("{}(\n{}\n)", callee, body.join(",\n"))
}

pub fn kwarg(key: &str, value: impl AsRef<str>) -> String {
    format!("{}={}", key, value.as_ref())
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_py_str_escapes() {
        assert_eq!(py_str("plain"), "\"plain\"");
        assert_eq!(py_str("a\"b"), "\"a\\\"b\"");
        assert_eq!(py_str("c:\\x"), "\"c:\\\\x\"");
    }

    #[test]
    fn test_py_float_keeps_fraction() {
        assert_eq!(py_float(1.0), "1.0");
        assert_eq!(py_float(0.001), "0.001");
        assert_eq!(py_float(255.0), "255.0");
    }

    #[test]
    fn test_tuples() {
        assert_eq!(py_tuple::<&str>(&[]), "()");
        assert_eq!(py_tuple(&["1"]), "(1,)");
        assert_eq!(py_tuple(&["1", "2"]), "(1, 2)");
        assert_eq!(py_shape(&[None, Some(28)]), "(None, 28)");
        assert_eq!(py_shape(&[Some(784)]), "(784,)");
    }

    #[test]
    fn test_lists() {
        assert_eq!(py_list::<&str>(&[]), "[]");
        assert_eq!(py_list(&["a", "b"]), "[a, b]");
    }

    #[test]
    fn test_calls() {
        assert_eq!(call("f", &[]), "f()");
        assert_eq!(
            call("f", &["1".to_string(), kwarg("name", py_str("x"))]),
            "f(1, name=\"x\")"
        );
        assert_eq!(
            call_multiline("m.fit", &["x".to_string(), "y".to_string()]),
            "m.fit(\n    x,\n    y\n)"
        );
    }
}
