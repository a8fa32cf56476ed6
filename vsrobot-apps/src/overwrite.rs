//! Scripts given with `--config`, applied on top of a TOML document.
//!
//! A script is a newline-separated list of:
//!
//! - `<key> = <value>`: sets the value. Missing keys and tables are created.
//! - `<key> =`: deletes the key or the array element. Missing keys are ignored.
//!
//! Keys are dotted paths, array elements are written `key[index]`.
//!
//! # Example
//!
//! ```
//! let doc = "[ros_robot]\nodom_topic = \"odom\"\nqueue_size = 1\n";
//! let doc = vsrobot_apps::overwrite::overwrite_str(
//!     doc,
//!     "ros_robot.odom_topic = \"wheel_odom\"\nros_robot.queue_size =",
//! )
//! .unwrap();
//! assert!(doc.contains("odom_topic = \"wheel_odom\""));
//! assert!(!doc.contains("queue_size"));
//! ```

use toml::Value;
use toml_query::{
    delete::TomlValueDeleteExt, insert::TomlValueInsertExt, read::TomlValueReadExt,
    set::TomlValueSetExt,
};
use tracing::debug;

use crate::Error;

#[derive(Debug, PartialEq)]
struct Script {
    line: usize,
    query: String,
    /// `None` deletes.
    value: Option<Value>,
}

/// Applies `scripts` to `doc`.
pub fn overwrite(doc: &mut Value, scripts: &str) -> Result<(), Error> {
    for Script { line, query, value } in parse(scripts)? {
        let err = |source: toml_query::error::Error| Error::Overwrite { line, source };
        let exists = doc.read(&query).map_err(err)?.is_some();
        match value {
            Some(value) if exists => {
                debug!(line, %query, ?value, "set");
                doc.set(&query, value).map_err(err)?;
            }
            Some(value) => {
                debug!(line, %query, ?value, "insert");
                doc.insert(&query, value).map_err(err)?;
            }
            None if exists => {
                // toml-query refuses to delete non-empty tables and arrays
                match doc.read_mut(&query).map_err(err)? {
                    Some(Value::Table(t)) => t.clear(),
                    Some(Value::Array(a)) => a.clear(),
                    _ => {}
                }
                debug!(line, %query, "delete");
                doc.delete(&query).map_err(err)?;
            }
            None => debug!(line, %query, "nothing to delete"),
        }
    }
    Ok(())
}

/// Like [`overwrite`], on a TOML string.
pub fn overwrite_str(doc: &str, scripts: &str) -> Result<String, Error> {
    let mut doc: Value = toml::from_str(doc).map_err(Error::InvalidConfig)?;
    overwrite(&mut doc, scripts)?;
    Ok(toml::to_string(&doc)?)
}

fn parse(scripts: &str) -> Result<Vec<Script>, Error> {
    scripts
        .lines()
        .enumerate()
        .map(|(i, s)| (i + 1, s.trim()))
        .filter(|(_, s)| !s.is_empty())
        .map(|(line, s)| {
            let invalid = |message: String| Error::InvalidScript { line, message };
            let (key, value) = s
                .split_once('=')
                .ok_or_else(|| invalid(format!("`=` not found: {s}")))?;
            let query = to_query(key.trim()).map_err(invalid)?;
            let value = value.trim();
            let value = if value.is_empty() {
                None
            } else {
                let mut table: toml::value::Table = toml::from_str(&format!("v = {value}"))
                    .map_err(|e| invalid(format!("{value}: {e}")))?;
                table.remove("v")
            };
            Ok(Script { line, query, value })
        })
        .collect()
}

/// `a[0].b` -> `a.[0].b`
fn to_query(key: &str) -> Result<String, String> {
    if key.is_empty() || key.starts_with('[') {
        return Err(format!("invalid key: {key:?}"));
    }
    if key.contains(|c| c == '"' || c == '\'') {
        return Err(format!("quoted keys are not supported: {key}"));
    }
    Ok(key.replace('[', ".["))
}
