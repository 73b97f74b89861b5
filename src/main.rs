//! collab-adapter - replay collaboration-engine operations against the
//! reference editor.
//!
//! # Usage
//!
//! ```bash
//! collab-adapter ops.json
//! collab-adapter --input draft.txt --invert ops.json
//! collab-adapter --history-limit 20 --save ops.json
//! ```
//!
//! `ops.json` holds a JSON array of operations in wire form, e.g.
//! `[[5, " world"], [5, -6]]`.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use collab_adapter::adapter::EditorAdapter;
use collab_adapter::config::{
    AdapterConfig, ConfigFlags, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use collab_adapter::editor::RopeEditorAdapter;
use collab_adapter::event::{EditorEvent, Listener};
use collab_adapter::operation::TextOperation;

/// Replay collaboration-engine operations against a rope-backed editor
#[derive(Parser, Debug)]
#[command(name = "collab-adapter", version, about, long_about = None)]
struct Cli {
    /// JSON file holding an array of operations
    #[arg(value_name = "OPS")]
    ops: PathBuf,

    /// Initial document content (empty when omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the inverse of each applied operation
    #[arg(long)]
    invert: bool,

    /// Disable the editor's own undo/redo stack
    #[arg(long)]
    no_native_undo: bool,

    /// Maximum number of local edits kept for native undo
    #[arg(long, value_name = "N")]
    history_limit: Option<usize>,

    /// Log every operation crossing the adapter at debug level
    /// (shown by default; an explicit RUST_LOG takes precedence)
    #[arg(long)]
    trace_ops: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn load_operations(cli: &Cli) -> Result<Vec<TextOperation>> {
    let raw = std::fs::read_to_string(&cli.ops)
        .with_context(|| format!("Failed to read operations {}", cli.ops.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Malformed operation list in {}", cli.ops.display()))
}

/// Filter used when `RUST_LOG` is unset.
const fn default_log_directives(trace_ops: bool) -> &'static str {
    if trace_ops {
        "warn,collab_adapter=debug"
    } else {
        "warn"
    }
}

/// `RUST_LOG` wins when set, with no extra directives added on top.
fn init_logging(trace_ops: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_log_directives(trace_ops))
    });
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    init_logging(effective.trace_ops);
    let config = AdapterConfig::from(&effective);

    let initial = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display()))?,
        None => String::new(),
    };
    let operations = load_operations(&cli)?;

    let mut adapter = RopeEditorAdapter::with_config(&initial, config);
    tracing::debug!(config = ?adapter.config(), "effective configuration");
    let failures = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&failures);
    adapter.on(
        EditorEvent::Error,
        Listener::error(move |error, operation, state| {
            counter.set(counter.get() + 1);
            eprintln!(
                "[error] {error}: {operation} (retained {}, skipped {}, length {})",
                state.retain, state.skipped_chars, state.content_length
            );
        }),
    )?;

    for (index, operation) in operations.iter().enumerate() {
        if adapter.apply_operation(operation).is_err() {
            tracing::warn!(index, "operation rejected");
            continue;
        }
        if cli.invert {
            let inverse = adapter.invert_operation(operation)?;
            eprintln!("{index}: {operation} -> {inverse}");
        }
    }

    print!("{}", adapter.get_text()?);

    if failures.get() > 0 {
        anyhow::bail!("{} operation(s) could not be applied", failures.get());
    }
    Ok(())
}
