//! Composite message formatting.
//!
//! Templates use positional placeholders: `{0}` is the member's display
//! name and `{1}`, `{2}`, ... are the check's arguments. Array-shaped
//! arguments are flattened in place, so a length check contributing
//! `[min, max]` fills `{1}` and `{2}`. `{member}` is an alias for `{0}`.
//! Literal braces are written `{{` and `}}`; unknown placeholders are left
//! as they are.

use std::fmt::Write;

/// One format argument contributed by a check.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatArg {
    Scalar(String),
    List(Vec<String>),
}

impl FormatArg {
    pub fn scalar(value: impl ToString) -> Self {
        FormatArg::Scalar(value.to_string())
    }

    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        FormatArg::List(values.into_iter().map(|v| v.to_string()).collect())
    }
}

fn flatten<'a>(display_name: &'a str, args: &'a [FormatArg]) -> Vec<&'a str> {
    let mut positional = vec![display_name];
    for arg in args {
        match arg {
            FormatArg::Scalar(value) => positional.push(value),
            FormatArg::List(values) => positional.extend(values.iter().map(String::as_str)),
        }
    }
    positional
}

/// Formats `template` with the display name and check arguments.
pub fn format_message(template: &str, display_name: &str, args: &[FormatArg]) -> String {
    let positional = flatten(display_name, args);
    let mut out = String::with_capacity(template.len() + display_name.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                let resolved = if name == "member" {
                    Some(display_name)
                } else {
                    name.parse::<usize>()
                        .ok()
                        .and_then(|index| positional.get(index).copied())
                };
                match (resolved, closed) {
                    (Some(value), true) => out.push_str(value),
                    (_, true) => {
                        let _ = write!(out, "{{{name}}}");
                    }
                    (_, false) => {
                        out.push('{');
                        out.push_str(&name);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}
