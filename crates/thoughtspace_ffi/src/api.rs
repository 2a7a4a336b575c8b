//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the canvas/space use-cases to Dart via FRB.
//! - Own the process-wide session backed by the on-device store.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every mutating call returns the post-operation space view, so the UI
//!   never re-reads state separately.
//! - Session access is serialized by one mutex.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use thoughtspace_core::model::timestamp;
use thoughtspace_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, is_valid_position,
    ping as ping_inner, Space, SpaceMetadata, SpaceSession, SqliteKvStore, Thought,
};

const STORE_FILE_NAME: &str = "thoughtspace.sqlite3";
const STORE_PATH_ENV: &str = "THOUGHTSPACE_DB_PATH";

static STORE_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<Option<SpaceSession<SqliteKvStore>>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One thought bubble as rendered by the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtView {
    pub id: i64,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Current space as rendered by the canvas screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceView {
    pub id: String,
    pub name: String,
    pub thoughts: Vec<ThoughtView>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    /// RFC 3339 UTC timestamp.
    pub updated_at: String,
    pub is_saved: bool,
    /// Drives the "save before switching?" prompt.
    pub has_unsaved_changes: bool,
}

/// Envelope returned by every space use-case.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Session state after the call; `None` only when the session could not
    /// be opened.
    pub space: Option<SpaceView>,
}

/// One row of the space picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceListItem {
    pub id: String,
    pub name: String,
    /// e.g. `3 thoughts`.
    pub summary: String,
    pub thought_count: u32,
    /// RFC 3339 UTC timestamp.
    pub updated_at: String,
}

/// Envelope for the space picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceListResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<SpaceListItem>,
}

/// Opens the session (restoring the last current space) and returns it.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Repeated calls return the already-open session.
#[flutter_rust_bridge::frb(sync)]
pub fn space_bootstrap() -> SpaceActionResponse {
    run_action("space_bootstrap", |_| Ok("Space ready.".to_string()))
}

/// Adds a thought at a random canvas position.
///
/// Blank text is rejected with `ok=false` and leaves the space unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn space_add_thought(text: String) -> SpaceActionResponse {
    run_action("space_add_thought", |session| {
        match session.add_thought(text.as_str()) {
            Some(id) => Ok(format!("Thought {id} added.")),
            None => Err("Thought text is empty or no thought id is left.".to_string()),
        }
    })
}

/// Records a thought's position after a drag ends.
///
/// Non-finite coordinates return `ok=false` with the space unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn space_move_thought(id: i64, x: f64, y: f64) -> SpaceActionResponse {
    run_action("space_move_thought", |session| {
        if !is_valid_position(x, y) {
            return Err(format!("Position ({x}, {y}) is not finite."));
        }
        if session.update_thought_position(id, x, y) {
            Ok("Thought moved.".to_string())
        } else {
            Err(format!("Thought {id} not found."))
        }
    })
}

/// Removes one thought.
#[flutter_rust_bridge::frb(sync)]
pub fn space_remove_thought(id: i64) -> SpaceActionResponse {
    run_action("space_remove_thought", |session| {
        if session.remove_thought(id) {
            Ok("Thought removed.".to_string())
        } else {
            Err(format!("Thought {id} not found."))
        }
    })
}

/// Empties the current space.
#[flutter_rust_bridge::frb(sync)]
pub fn space_clear_thoughts() -> SpaceActionResponse {
    run_action("space_clear_thoughts", |session| {
        session.clear_all_thoughts();
        Ok("Thoughts cleared.".to_string())
    })
}

/// Saves the current space, renaming it when `name` is non-blank.
#[flutter_rust_bridge::frb(sync)]
pub fn space_save(name: Option<String>) -> SpaceActionResponse {
    run_action("space_save", |session| {
        session
            .save_current_space(name.as_deref())
            .map(|()| "Space saved.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Starts a fresh space, optionally saving unsaved changes first.
#[flutter_rust_bridge::frb(sync)]
pub fn space_new(save_current_first: bool) -> SpaceActionResponse {
    run_action("space_new", |session| {
        session
            .create_new_space(save_current_first)
            .map(|()| "New space created.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Switches to a stored space.
///
/// Unknown ids return `ok=false` with the session unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn space_load(space_id: String) -> SpaceActionResponse {
    run_action("space_load", |session| {
        match session.load_space(space_id.trim()) {
            Ok(true) => Ok("Space loaded.".to_string()),
            Ok(false) => Err(format!("Space `{}` not found.", space_id.trim())),
            Err(err) => Err(err.to_string()),
        }
    })
}

/// Deletes a stored space.
#[flutter_rust_bridge::frb(sync)]
pub fn space_delete(space_id: String) -> SpaceActionResponse {
    run_action("space_delete", |session| {
        session
            .delete_space(space_id.trim())
            .map(|()| "Space deleted.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Lists saved spaces for the picker, in index order.
#[flutter_rust_bridge::frb(sync)]
pub fn spaces_list() -> SpaceListResponse {
    let listed = with_session(|session| session.list_spaces().map_err(|err| err.to_string()));
    match listed {
        Ok(entries) => {
            let items: Vec<SpaceListItem> = entries.iter().map(to_space_list_item).collect();
            let message = if items.is_empty() {
                "No spaces found.".to_string()
            } else {
                format!("Found {} space(s).", items.len())
            };
            SpaceListResponse {
                ok: true,
                message,
                items,
            }
        }
        Err(err) => SpaceListResponse {
            ok: false,
            message: format!("spaces_list failed: {err}"),
            items: Vec::new(),
        },
    }
}

fn run_action(
    operation: &'static str,
    f: impl FnOnce(&mut SpaceSession<SqliteKvStore>) -> Result<String, String>,
) -> SpaceActionResponse {
    let outcome = with_session(|session| {
        let result = f(session);
        Ok((result, to_space_view(session)))
    });

    match outcome {
        Ok((Ok(message), space)) => SpaceActionResponse {
            ok: true,
            message,
            space,
        },
        Ok((Err(err), space)) => {
            warn!("event=ffi_call module=ffi status=error operation={operation} error={err}");
            SpaceActionResponse {
                ok: false,
                message: format!("{operation} failed: {err}"),
                space,
            }
        }
        Err(err) => SpaceActionResponse {
            ok: false,
            message: format!("{operation} failed: {err}"),
            space: None,
        },
    }
}

fn with_session<T>(
    f: impl FnOnce(&mut SpaceSession<SqliteKvStore>) -> Result<T, String>,
) -> Result<T, String> {
    let lock = SESSION.get_or_init(|| Mutex::new(None));
    let mut guard = lock
        .lock()
        .map_err(|_| "session lock poisoned".to_string())?;

    if guard.is_none() {
        let store = SqliteKvStore::open(resolve_store_path())
            .map_err(|err| format!("store open failed: {err}"))?;
        let mut session = SpaceSession::new(store);
        session.initialize();
        *guard = Some(session);
    }

    match guard.as_mut() {
        Some(session) => f(session),
        None => Err("session unavailable".to_string()),
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_FILE_NAME)
        })
        .clone()
}

fn to_space_view(session: &SpaceSession<SqliteKvStore>) -> Option<SpaceView> {
    let space: &Space = session.current_space()?;
    Some(SpaceView {
        id: space.id.clone(),
        name: space.name.clone(),
        thoughts: space.thoughts.iter().map(to_thought_view).collect(),
        created_at: timestamp::format(&space.created_at),
        updated_at: timestamp::format(&space.updated_at),
        is_saved: space.is_saved,
        has_unsaved_changes: session.has_unsaved_changes(),
    })
}

fn to_thought_view(thought: &Thought) -> ThoughtView {
    ThoughtView {
        id: thought.id,
        text: thought.text.clone(),
        x: thought.x,
        y: thought.y,
    }
}

fn to_space_list_item(entry: &SpaceMetadata) -> SpaceListItem {
    SpaceListItem {
        id: entry.id.clone(),
        name: entry.name.clone(),
        summary: entry.summary(),
        thought_count: u32::try_from(entry.thought_count).unwrap_or(u32::MAX),
        updated_at: timestamp::format(&entry.updated_at),
    }
}
