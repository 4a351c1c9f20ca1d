use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Select the output mode and install the log subscriber (`RUST_LOG`,
/// default `warn`). Logs always go to stderr.
pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print a command result: pretty JSON in JSON mode, otherwise one
/// `key: value` line per top-level field.
pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    if is_json() {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut out = stdout();
    match &value {
        Value::Object(map) => {
            for (key, v) in map {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
                write!(out, "{key}")?;
                out.reset()?;
                writeln!(out, ": {}", human(v))?;
            }
        }
        other => writeln!(out, "{}", human(other))?,
    }
    Ok(())
}

fn human(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(items) if items.iter().all(|i| !i.is_object() && !i.is_array()) => {
            items.iter().map(human).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
