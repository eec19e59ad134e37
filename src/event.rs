// src/event.rs
use bitflags::bitflags;
use notify::event::{EventKind, ModifyKind, RenameMode};
use std::fmt;

bitflags! {
    /// The set of change kinds carried by a single file system event.
    ///
    /// A backend may report several kinds at once; [`Op::action`] reduces the
    /// set to the one kind that gets reported.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Op: u8 {
        const CREATE = 1 << 0;
        const WRITE = 1 << 1;
        const REMOVE = 1 << 2;
        const RENAME = 1 << 3;
        const CHMOD = 1 << 4;
    }
}

/// The single dominant kind of an event, as printed by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Modified,
    Deleted,
    Renamed,
    PermissionsChanged,
}

impl Action {
    /// Past-tense label used in the output line.
    pub fn label(self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Modified => "modified",
            Action::Deleted => "deleted",
            Action::Renamed => "renamed",
            Action::PermissionsChanged => "permissions changed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification order. First match wins, so CREATE|WRITE is "created".
const PRIORITY: [(Op, Action); 5] = [
    (Op::CREATE, Action::Created),
    (Op::WRITE, Action::Modified),
    (Op::REMOVE, Action::Deleted),
    (Op::RENAME, Action::Renamed),
    (Op::CHMOD, Action::PermissionsChanged),
];

impl Op {
    /// Returns the dominant action for this flag set, or `None` if no known
    /// flag is set.
    pub fn action(self) -> Option<Action> {
        PRIORITY
            .iter()
            .find(|(flag, _)| self.contains(*flag))
            .map(|(_, action)| *action)
    }

    /// Maps a `notify` event kind onto the flag set.
    ///
    /// The old name of a rename maps to RENAME and the new name to CREATE.
    /// `RenameMode::Both` returns `None`: backends that emit it also emit the
    /// `From`/`To` halves, which are reported individually.
    pub fn from_kind(kind: &EventKind) -> Option<Op> {
        let op = match kind {
            EventKind::Create(_) => Op::CREATE,
            EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Other) => Op::WRITE,
            EventKind::Modify(ModifyKind::Metadata(_)) => Op::CHMOD,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Op::CREATE,
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => return None,
            EventKind::Modify(ModifyKind::Name(_)) => Op::RENAME,
            EventKind::Remove(_) => Op::REMOVE,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Op::empty(),
        };
        Some(op)
    }
}

/// A single observed change to an entry in the watched directory.
///
/// # Fields
/// - `path`: The affected entry, as reported by the watcher.
/// - `op`: The change kinds reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEvent {
    pub path: String,
    pub op: Op,
}

impl FileSystemEvent {
    pub fn new(path: impl Into<String>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Splits a `notify` event into one `FileSystemEvent` per path.
    pub fn from_notify(event: &notify::Event) -> Vec<FileSystemEvent> {
        let Some(op) = Op::from_kind(&event.kind) else {
            return Vec::new();
        };
        event
            .paths
            .iter()
            .map(|p| FileSystemEvent::new(p.to_string_lossy(), op))
            .collect()
    }

    /// Formats the output line for this event, or `None` when the event
    /// carries no reportable kind.
    pub fn describe(&self) -> Option<String> {
        self.op
            .action()
            .map(|action| format!("File {}: {}", action, self.path))
    }
}
