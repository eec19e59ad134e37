// src/lib.rs

#![doc = r#"
# dirwatch

dirwatch watches a single directory and prints one line per file system
change, e.g. `File created: ./monitor/a.txt`.

## Modules

- [`config`]: Configuration loading and merging from CLI, file, and environment.
- [`error`]: Error taxonomy for setup and steady-state failures.
- [`event`]: File event type, change flags, and classification.
- [`relay`]: Receiver and handler tasks connected by hand-off queues.
- [`watcher`]: Directory setup and the file system notification handle.
"#]

pub mod config;
pub mod error;
pub mod event;
pub mod relay;
pub mod watcher;
