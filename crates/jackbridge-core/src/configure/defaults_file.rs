//! Shell defaults file text handling.
//!
//! The defaults file is sourced by the managed service's init script, so it
//! holds `KEY=value` lines, optionally prefixed with `export` and optionally
//! quoted. Comments and unrelated lines must survive a rewrite untouched.

/// Split a line into `(key, raw value)` if it is an assignment.
fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, value) = line.split_once('=')?;
    let key = key.trim_end();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value))
}

/// Remove one level of shell quoting from a raw value.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 {
        if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
            return inner.to_string();
        }
        if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    match chars.next() {
                        Some(next @ ('"' | '\\' | '$' | '`')) => out.push(next),
                        Some(next) => {
                            out.push('\\');
                            out.push(next);
                        }
                        None => out.push('\\'),
                    }
                } else {
                    out.push(c);
                }
            }
            return out;
        }
    }
    // Unquoted: drop a trailing comment
    raw.split_once(" #")
        .map_or(raw, |(value, _)| value)
        .trim_end()
        .to_string()
}

/// Value assigned to `key`, if any. The last assignment wins, as when the
/// file is sourced.
#[must_use]
pub fn read_variable(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .filter_map(parse_assignment)
        .filter(|(k, _)| *k == key)
        .last()
        .map(|(_, value)| unquote(value))
}

/// Render `key=value` so that sourcing it yields exactly `value`.
#[must_use]
pub fn format_assignment(key: &str, value: &str) -> String {
    let is_plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':' | '/' | ',' | '+' | '@' | '='));
    if is_plain {
        return format!("{key}={value}");
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    format!("{key}={quoted}")
}

/// Leading indentation and `export ` keyword of an assignment line.
fn assignment_prefix(line: &str) -> &str {
    let trimmed = line.trim_start();
    let mut len = line.len() - trimmed.len();
    if let Some(rest) = trimmed.strip_prefix("export ") {
        len += "export ".len() + rest.len() - rest.trim_start().len();
    }
    &line[..len]
}

/// Replace the assignment of `key` in `content`, or append one.
///
/// The first assignment is rewritten in place, keeping its indentation and
/// `export` keyword, and later duplicates are dropped. All other lines are
/// kept. The result ends with a newline.
#[must_use]
pub fn upsert_variable(content: &str, key: &str, value: &str) -> String {
    let assignment = format_assignment(key, value);
    let mut updated = false;
    let mut output: Vec<String> = Vec::with_capacity(content.lines().count() + 1);

    for line in content.lines() {
        match parse_assignment(line) {
            Some((k, _)) if k == key => {
                if !updated {
                    output.push(format!("{}{assignment}", assignment_prefix(line)));
                    updated = true;
                }
            }
            _ => output.push(line.to_string()),
        }
    }

    if !updated {
        output.push(assignment);
    }

    let mut rendered = output.join("\n");
    rendered.push('\n');
    rendered
}
