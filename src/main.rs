//! Typesync CLI - GraphQL type generation watcher
//!
//! Usage: typesync <COMMAND>
//!
//! Commands:
//!   generate  Extract the schema snapshot and emit type definitions once
//!   watch     Watch for changes and regenerate continuously
//!   annotate  Inject generated type names into untyped call sites

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Typesync - GraphQL type generation watcher
#[derive(Parser, Debug)]
#[command(name = "typesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, default_value = "false", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the schema snapshot and emit type definitions once
    Generate {
        /// Project root containing typesync.toml
        #[arg(short, long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Watch for changes and regenerate continuously
    Watch {
        /// Project root containing typesync.toml
        #[arg(short, long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Inject generated type names into untyped call sites
    Annotate {
        /// Project root containing typesync.toml
        #[arg(short, long, default_value = ".")]
        project_root: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { project_root } => cmd_generate(&project_root, cli.json),
        Commands::Watch { project_root } => cmd_watch(&project_root, cli.json),
        Commands::Annotate {
            project_root,
            dry_run,
        } => cmd_annotate(&project_root, dry_run, cli.json),
    }
}

/// Load project config, surfacing unknown-key warnings
fn load_config(project_root: &Path, json: bool) -> typesync::Config {
    let path = project_root.join(typesync::config::CONFIG_FILE);
    if !path.exists() {
        return typesync::Config::default();
    }
    match typesync::Config::load_with_warnings(&path) {
        Ok((config, warnings)) => {
            if !json {
                for warning in warnings {
                    eprintln!(
                        "⚠ Unknown config key '{}' in {}",
                        warning.key,
                        warning.file.display()
                    );
                }
            }
            config
        }
        Err(e) => {
            eprintln!("⚠ {e} - using defaults");
            typesync::Config::default()
        }
    }
}

fn cmd_generate(project_root: &Path, json: bool) -> Result<()> {
    use typesync::{DocumentStore, Engine, FileSchemaSource, SchemaStore, TypeScriptBackend};

    let config = load_config(project_root, json);

    if !json {
        println!("📦 Typesync Generate");
        println!("Root: {}", project_root.display());
    }

    let source = FileSchemaSource::new(config.schema_source_path(project_root));
    let mut store = SchemaStore::new(config.schema_output_path(project_root));
    let outcome = store.extract(&source)?;

    if !json && outcome.written {
        println!("📸 Schema snapshot written: {}", outcome.path.display());
    }

    let sources = typesync::discover::discover_sources(&config.source_dir_path(project_root))?;
    let mut documents = DocumentStore::new();
    let mut parse_errors = 0usize;
    documents.load_all(&sources, |e| {
        parse_errors += 1;
        eprintln!("✗ {e}");
    });

    let output = config.type_defs_output_path(project_root);
    let mut engine = Engine::new(store, documents, TypeScriptBackend::new(), config, output);
    let summary = engine.regenerate()?;

    if json {
        let event = serde_json::json!({
            "event": "generate",
            "snapshot_written": outcome.written,
            "documents": summary.documents,
            "operations": summary.operations,
            "parse_errors": parse_errors,
            "output": summary.output.display().to_string(),
        });
        println!("{}", serde_json::to_string(&event)?);
    } else {
        println!(
            "✓ Generated {} operations from {} documents",
            summary.operations, summary.documents
        );
        println!("Output: {}", summary.output.display());
        if parse_errors > 0 {
            println!("⚠ {} files skipped with parse errors", parse_errors);
        }
    }

    Ok(())
}

fn cmd_annotate(project_root: &Path, dry_run: bool, json: bool) -> Result<()> {
    let config = load_config(project_root, json);

    if !json {
        println!("🔍 Typesync Annotate");
        println!("Root: {}", project_root.display());
        if dry_run {
            println!("Mode: Dry run");
        }
    }

    let sources = typesync::discover::discover_sources(&config.source_dir_path(project_root))?;

    let mut annotated = 0usize;
    let mut injected = 0usize;
    let mut errors = 0usize;

    for path in &sources {
        if dry_run {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    errors += 1;
                    eprintln!("✗ {}: {}", path.display(), e);
                    continue;
                }
            };
            let matches = typesync::annotate::find_annotations(&text);
            if !matches.is_empty() {
                annotated += 1;
                injected += matches.len();
                if !json {
                    println!("~ {} ({} call sites)", path.display(), matches.len());
                }
            }
            continue;
        }

        match typesync::annotate_file(path) {
            Ok(outcome) if outcome.written => {
                annotated += 1;
                injected += outcome.injected;
                if !json {
                    println!("✏ {} ({} call sites)", path.display(), outcome.injected);
                }
            }
            Ok(_) => {}
            Err(e) => {
                errors += 1;
                eprintln!("✗ {e}");
            }
        }
    }

    if json {
        let event = serde_json::json!({
            "event": "annotate",
            "dry_run": dry_run,
            "files": annotated,
            "injected": injected,
            "errors": errors,
        });
        println!("{}", serde_json::to_string(&event)?);
    } else {
        println!(
            "✓ {} call sites across {} files{}",
            injected,
            annotated,
            if dry_run { " (not written)" } else { "" }
        );
        if errors > 0 {
            println!("⚠ {} files skipped with errors", errors);
        }
    }

    Ok(())
}

fn cmd_watch(project_root: &Path, json: bool) -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use typesync::{watch, WatchEvent, WatchOptions};

    let config = load_config(project_root, json);

    let options = WatchOptions {
        project_root: project_root.to_path_buf(),
        config,
        json,
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if !json {
        println!("👀 Typesync Watch");
        println!("Root: {}", project_root.display());
        println!("Press Ctrl+C to stop\n");
    }

    watch(options, running, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            let ts = chrono::Local::now().format("%H:%M:%S");
            match event {
                WatchEvent::WatchStarted { root } => {
                    println!("[{ts}] 📂 Watching: {root}");
                }
                WatchEvent::SnapshotWritten { path } => {
                    println!("[{ts}] 📸 Schema snapshot written: {path}");
                }
                WatchEvent::FileChanged { path } => {
                    println!("[{ts}] 📝 Changed: {path}");
                }
                WatchEvent::GenerateStarted => {
                    println!("[{ts}] 🔄 Generating types...");
                }
                WatchEvent::GenerateComplete {
                    documents,
                    operations,
                    output,
                } => {
                    println!(
                        "[{ts}] ✓ Types: {operations} operations from {documents} documents ({output})"
                    );
                }
                WatchEvent::FileAnnotated { path, injected } => {
                    println!("[{ts}] ✏ Annotated: {path} ({injected} call sites)");
                }
                WatchEvent::Error { phase, message } => {
                    eprintln!("[{ts}] ✗ [{phase}] {message}");
                }
                WatchEvent::Shutdown => {
                    println!("\n👋 Shutting down...");
                }
            }
        }
    })?;

    Ok(())
}
