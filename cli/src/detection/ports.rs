//! # Port Extraction
//!
//! File: cli/src/detection/ports.rs
//!
//! Helpers that pull a listening port out of scripts and source files.
//! Every function returns `None` when no port is found; detectors apply
//! their own framework default.
//!
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SCRIPT_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:--port[=\s]+|(?:^|\s)-p\s+|\bPORT=)(\d{2,5})\b").expect("valid regex")
});

static GO_LISTEN_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:ListenAndServe(?:TLS)?|\.Run|\.Listen|\.Start)\(\s*"[^"]*?:(\d{2,5})""#,
    )
    .expect("valid regex")
});

static PYTHON_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\.run|uvicorn\.run)\([^)]*?\bport\s*=\s*(\d{2,5})").expect("valid regex")
});

static DOCKER_EXPOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*EXPOSE\s+(\d{2,5})").expect("valid regex"));

static FIRST_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

fn capture_port(re: &Regex, text: &str) -> Option<u16> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|p| *p > 0)
}

/// First run of digits in `text` as a port.
pub fn parse_port(text: &str) -> Option<u16> {
    FIRST_DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|p| *p > 0)
}

/// Port passed to a dev server command (`--port 4000`, `-p 4000`, `PORT=4000`).
pub fn script_port(command: &str) -> Option<u16> {
    capture_port(&SCRIPT_PORT, command)
}

/// Port from the first of `names` (e.g. `dev`, `start`) that sets one.
pub fn port_from_scripts(scripts: &BTreeMap<String, String>, names: &[&str]) -> Option<u16> {
    names
        .iter()
        .filter_map(|name| scripts.get(*name))
        .find_map(|cmd| script_port(cmd))
}

/// Port from `http.ListenAndServe(":9090", ...)`, `r.Run(":8000")` and friends.
pub fn go_listen_port(source: &str) -> Option<u16> {
    capture_port(&GO_LISTEN_PORT, source)
}

/// Port from `app.run(port=5000)` or `uvicorn.run(app, port=8001)`.
pub fn python_port(source: &str) -> Option<u16> {
    capture_port(&PYTHON_PORT, source).or_else(|| script_port(source))
}

/// First `EXPOSE` port of a Dockerfile.
pub fn dockerfile_expose(content: &str) -> Option<u16> {
    capture_port(&DOCKER_EXPOSE, content)
}
