use crate::context::{Context, Options};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use serde::Serialize;
use triage_core::ConfigKey;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show which settings are present
    Status,

    /// Print one setting
    Get {
        /// token, workspace, or initials
        key: String,
    },

    /// Store a setting in the OS keychain
    Set {
        /// token, workspace, or initials
        key: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(opts: &Options, subcommand: ConfigSubcommand) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Status => status(opts),
        ConfigSubcommand::Get { key } => get(opts, &key),
        ConfigSubcommand::Set { key, value } => set(opts, &key, &value),
    }
}

#[derive(Serialize)]
struct StatusRow {
    key: ConfigKey,
    set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

fn status(opts: &Options) -> anyhow::Result<()> {
    let ctx = Context::load(opts)?;
    let rows: Vec<StatusRow> = ConfigKey::all()
        .iter()
        .map(|&key| {
            let value = ctx.config.get(key);
            StatusRow {
                key,
                set: value.is_some(),
                value: value.map(|v| display_value(key, &v)),
            }
        })
        .collect();

    if ctx.json {
        return print_json(&serde_json::json!({
            "configured": ctx.config.is_configured(),
            "keys": rows,
        }));
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.key.to_string(),
                r.value.clone().unwrap_or_else(|| "(not set)".to_string()),
            ]
        })
        .collect();
    print_table(&["KEY", "VALUE"], &table);
    if !ctx.config.is_configured() {
        println!();
        println!("Run `triage config set <key> <value>` for each missing key.");
    }
    Ok(())
}

fn get(opts: &Options, key: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    let ctx = Context::load(opts)?;
    let value = ctx.config.get(key);

    if ctx.json {
        return print_json(&serde_json::json!({ "key": key, "value": value }));
    }
    match value {
        Some(v) => println!("{v}"),
        None => anyhow::bail!("{key} is not set"),
    }
    Ok(())
}

fn set(opts: &Options, key: &str, value: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    if opts.no_keyring {
        anyhow::bail!("cannot store {key} without the keychain; set {} instead", key.env_var());
    }
    if value.trim().is_empty() {
        anyhow::bail!("{key} cannot be empty");
    }
    let ctx = Context::load(opts)?;
    ctx.config.set(key, value)?;

    if ctx.json {
        return print_json(&serde_json::json!({ "key": key, "stored": true }));
    }
    println!("Stored {key}.");
    Ok(())
}

/// Tokens are shown by their last four characters only.
fn display_value(key: ConfigKey, value: &str) -> String {
    match key {
        ConfigKey::Token => {
            let tail: String = value
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("…{tail}")
        }
        _ => value.to_string(),
    }
}
