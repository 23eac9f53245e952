//! Subcommand implementations

pub mod channel;
pub mod posts;

use anyhow::{Context, Result};
use serde_json::Value;

pub use channel::{run_channel, ChannelArgs};
pub use posts::{
    run_create, run_delete, run_edit, run_etag, run_get, run_page, run_search, CreateArgs,
    DeleteArgs, EditArgs, EtagArgs, GetArgs, PageArgs, SearchArgs,
};

/// Print `value` to stdout as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

/// Print a one-field JSON object
pub fn print_field(key: &str, value: impl Into<Value>) -> Result<()> {
    let mut object = serde_json::Map::new();
    object.insert(key.to_string(), value.into());
    print_json(&Value::Object(object))
}
