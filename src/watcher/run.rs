//! Watch loop wiring
//!
//! All work is triggered by discrete events on a single thread: a file-system
//! event updates the tracked state synchronously, regeneration itself only
//! runs when the debounce window elapses. A regeneration executes inline in
//! the loop, so two runs can never overlap; requests arriving during a run
//! are merged into the next debounce cycle.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::annotate::annotate_file;
use crate::discover::{discover_sources, is_declaration_file, is_source_path};
use crate::documents::DocumentStore;
use crate::emitter::{CodegenBackend, TypeScriptBackend};
use crate::engine::Engine;
use crate::error::{TypesyncError, TypesyncResult};
use crate::fs::hash_content;
use crate::schema::{FileSchemaSource, SchemaStore};
use crate::scheduler::RegenScheduler;

use super::event::{WatchEvent, WatchOptions};

/// Start watching for file changes
pub fn watch(
    options: WatchOptions,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> TypesyncResult<()> {
    let root = &options.project_root;
    let config = &options.config;

    let schema_source_path = config.schema_source_path(root);
    let snapshot_path = config.schema_output_path(root);
    let source_dir = config.source_dir_path(root);
    let output_path = config.type_defs_output_path(root);

    event_callback(WatchEvent::WatchStarted {
        root: root.display().to_string(),
    });

    // Initial baseline before watching begins: extraction, discovery and
    // document load are synchronous here so the first regeneration reflects
    // a complete file set, never a partial one.
    let source = FileSchemaSource::new(&schema_source_path);
    let mut store = SchemaStore::new(&snapshot_path);
    let outcome = store.extract(&source)?;
    if outcome.written {
        event_callback(WatchEvent::SnapshotWritten {
            path: outcome.path.display().to_string(),
        });
    }

    let sources: Vec<PathBuf> = discover_sources(&source_dir)?
        .into_iter()
        .map(|p| p.canonicalize().unwrap_or(p))
        .collect();
    let mut documents = DocumentStore::new();
    documents.load_all(&sources, |e| {
        event_callback(WatchEvent::Error {
            phase: "load".to_string(),
            message: e.to_string(),
        });
    });

    let mut engine = Engine::new(
        store,
        documents,
        TypeScriptBackend::new(),
        config.clone(),
        output_path,
    );
    run_generate(&mut engine, &event_callback);

    // Set up file watcher
    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let removed = matches!(event.kind, EventKind::Remove(_));
                for path in event.paths {
                    let _ = tx.send((path, removed));
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| TypesyncError::Io(std::io::Error::other(e.to_string())))?;

    // Watch parent directories rather than the files themselves: the
    // snapshot and schema are replaced by rename, which would silently
    // detach a watch on the old inode.
    let snapshot_parent = snapshot_path.parent().unwrap_or(root.as_path()).to_path_buf();
    let schema_parent = schema_source_path
        .parent()
        .unwrap_or(root.as_path())
        .to_path_buf();

    watcher
        .watch(&source_dir, RecursiveMode::Recursive)
        .map_err(|e| TypesyncError::Io(std::io::Error::other(e.to_string())))?;
    if snapshot_parent != source_dir {
        watcher
            .watch(&snapshot_parent, RecursiveMode::NonRecursive)
            .map_err(|e| TypesyncError::Io(std::io::Error::other(e.to_string())))?;
    }
    if schema_parent != source_dir && schema_parent != snapshot_parent {
        watcher
            .watch(&schema_parent, RecursiveMode::NonRecursive)
            .map_err(|e| TypesyncError::Io(std::io::Error::other(e.to_string())))?;
    }

    let schema_source_canon = schema_source_path
        .canonicalize()
        .unwrap_or_else(|_| schema_source_path.clone());
    let snapshot_canon = snapshot_path
        .canonicalize()
        .unwrap_or_else(|_| snapshot_path.clone());

    let mut scheduler = RegenScheduler::new(Duration::from_millis(config.watch.debounce_ms));
    // Track content hashes to filter out IDE auto-save noise
    let mut content_hashes: HashMap<PathBuf, String> = HashMap::new();

    // Startup cooldown: drain any initial events from notify (it sometimes
    // sends events for existing files when the watcher is first registered)
    let cooldown_end = Instant::now() + Duration::from_millis(500);
    while Instant::now() < cooldown_end {
        let _ = rx.recv_timeout(Duration::from_millis(50));
    }

    while running.load(Ordering::SeqCst) {
        // Check for file changes (non-blocking with timeout)
        if let Ok((path, removed)) = rx.recv_timeout(Duration::from_millis(50)) {
            if removed {
                if engine.documents.remove(&path) {
                    event_callback(WatchEvent::FileChanged {
                        path: path.display().to_string(),
                    });
                    content_hashes.remove(&path);
                    scheduler.request();
                }
                continue;
            }

            let path = path.canonicalize().unwrap_or(path);

            if path == snapshot_canon {
                // the snapshot was rewritten; regenerate against it
                scheduler.request();
            } else if path == schema_source_canon {
                match engine.store.extract(&source) {
                    Ok(outcome) if outcome.written => {
                        event_callback(WatchEvent::SnapshotWritten {
                            path: outcome.path.display().to_string(),
                        });
                        scheduler.request();
                    }
                    // identical schema: hash-gated, nothing to do
                    Ok(_) => {}
                    Err(e) => {
                        event_callback(WatchEvent::Error {
                            phase: "extract".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            } else if is_source_path(&path) && !is_declaration_file(&path) {
                // Check if content actually changed before doing any work
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(_) => continue,
                };
                let new_hash = hash_content(&content);
                if content_hashes.get(&path) == Some(&new_hash) {
                    continue;
                }
                content_hashes.insert(path.clone(), new_hash);

                event_callback(WatchEvent::FileChanged {
                    path: path.display().to_string(),
                });

                if let Err(e) = engine.documents.update_one(&path) {
                    event_callback(WatchEvent::Error {
                        phase: "parse".to_string(),
                        message: e.to_string(),
                    });
                }
                scheduler.request();

                if config.annotate.auto_fix {
                    match annotate_file(&path) {
                        Ok(outcome) if outcome.written => {
                            event_callback(WatchEvent::FileAnnotated {
                                path: path.display().to_string(),
                                injected: outcome.injected,
                            });
                            // remember the rewritten content so the echo of
                            // our own write is filtered out
                            if let Ok(rewritten) = std::fs::read_to_string(&path) {
                                content_hashes.insert(path.clone(), hash_content(&rewritten));
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            event_callback(WatchEvent::Error {
                                phase: "annotate".to_string(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        // Run a regeneration once the debounce window has elapsed
        if scheduler.take() {
            run_generate(&mut engine, &event_callback);
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

/// Run one regeneration, reporting instead of crashing the watch process.
/// On failure the output file stays at its last successful state.
fn run_generate<B: CodegenBackend>(engine: &mut Engine<B>, callback: &impl Fn(WatchEvent)) {
    callback(WatchEvent::GenerateStarted);
    match engine.regenerate() {
        Ok(summary) => callback(WatchEvent::GenerateComplete {
            documents: summary.documents,
            operations: summary.operations,
            output: summary.output.display().to_string(),
        }),
        Err(e) => callback(WatchEvent::Error {
            phase: "generate".to_string(),
            message: e.to_string(),
        }),
    }
}
