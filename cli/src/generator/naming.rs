//! # Name Sanitization
//!
//! File: cli/src/generator/naming.rs
//!
//! Application and pod names must be lowercase `[a-z0-9-]` starting with a
//! letter, with no doubled or trailing dashes. `sanitize_name` maps anything
//! onto that form and is idempotent.
//!

/// Lowercases, replaces every character outside `[a-z0-9-]` with `-`,
/// collapses dash runs and trims dashes at both ends. The result gets an
/// `app-` prefix when it does not start with a letter; nothing left becomes
/// `app`.
pub fn sanitize_name(raw: &str) -> String {
    let mut mapped = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        let c = match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        };
        if c == '-' && (mapped.is_empty() || mapped.ends_with('-')) {
            continue;
        }
        mapped.push(c);
    }
    if mapped.ends_with('-') {
        mapped.pop();
    }

    match mapped.chars().next() {
        None => "app".to_string(),
        Some(c) if c.is_ascii_lowercase() => mapped,
        Some(_) => format!("app-{}", mapped),
    }
}
