//! Current-space session state.
//!
//! # Responsibility
//! - Own the single in-memory "current space" and its unsaved flag.
//! - Expose the thought/space use-cases the canvas screen drives.
//! - Persist only on explicit save; keep the current-space pointer in sync
//!   when the active space changes.
//!
//! # Invariants
//! - After `initialize` returns, the session is `Ready` with some space.
//! - `has_unsaved_changes` is `false` only directly after a successful save
//!   or after loading a document whose `is_saved` is `true`.
//! - A failed save restores the pre-save document and flag.

use crate::config::SessionConfig;
use crate::model::space::{Space, SpaceMetadata};
use crate::model::thought::ThoughtId;
use crate::repo::space_repo::SpaceRepository;
use crate::repo::thought_repo::ThoughtRepository;
use crate::repo::RepoError;
use crate::service::commit_with_rollback;
use crate::store::KeyValueStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

/// Session use-case error.
#[derive(Debug)]
pub enum SessionError {
    /// Save requested before any space is active.
    NoCurrentSpace,
    /// Persistence failure.
    Repo(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCurrentSpace => write!(f, "no current space to save"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoCurrentSpace => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Default)]
struct Workspace {
    current: Option<Space>,
    has_unsaved_changes: bool,
}

/// State holder for the active space.
pub struct SpaceSession<S> {
    repo: SpaceRepository<S>,
    config: SessionConfig,
    state: SessionState,
    workspace: Workspace,
}

impl<S: KeyValueStore> SpaceSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    pub fn with_config(store: S, config: SessionConfig) -> Self {
        Self {
            repo: SpaceRepository::new(store),
            config,
            state: SessionState::Uninitialized,
            workspace: Workspace::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn current_space(&self) -> Option<&Space> {
        self.workspace.current.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.workspace.has_unsaved_changes
    }

    pub fn repository(&self) -> &SpaceRepository<S> {
        &self.repo
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Restores the space named by the current-space pointer, or starts a
    /// fresh one.
    ///
    /// Never fails: storage errors are logged and the session falls back to
    /// a fresh unsaved space.
    pub fn initialize(&mut self) -> &Space {
        self.state = SessionState::Loading;
        info!("event=session_init module=service status=start");

        let space = match self.restore_pointed_space() {
            Ok(Some(space)) => {
                info!(
                    "event=session_init module=service status=ok source=pointer space_id={} is_saved={}",
                    space.id, space.is_saved
                );
                space
            }
            Ok(None) => {
                info!("event=session_init module=service status=ok source=fresh");
                self.fresh_pointed_space()
            }
            Err(err) => {
                error!(
                    "event=session_init module=service status=error error_code=restore_failed error={}",
                    err
                );
                self.fresh_pointed_space()
            }
        };

        self.state = SessionState::Ready;
        self.activate(space)
    }

    /// Adds a thought at a random canvas position.
    ///
    /// Returns the new thought id, or `None` for blank text / no space.
    pub fn add_thought(&mut self, text: &str) -> Option<ThoughtId> {
        let (x, y) = self.config.canvas.random_position();
        self.add_thought_at(text, x, y)
    }

    /// Adds a thought at a caller-chosen position.
    pub fn add_thought_at(&mut self, text: &str, x: f64, y: f64) -> Option<ThoughtId> {
        let id = self.workspace.current.as_mut()?.push_thought(text, x, y)?;
        self.workspace.has_unsaved_changes = true;
        Some(id)
    }

    /// Moves one thought. Unknown ids are ignored and return `false`.
    pub fn update_thought_position(&mut self, id: ThoughtId, x: f64, y: f64) -> bool {
        let moved = self
            .workspace
            .current
            .as_mut()
            .is_some_and(|space| space.move_thought(id, x, y));
        if moved {
            self.workspace.has_unsaved_changes = true;
        }
        moved
    }

    /// Removes one thought. Unknown ids are ignored and return `false`.
    pub fn remove_thought(&mut self, id: ThoughtId) -> bool {
        let removed = self
            .workspace
            .current
            .as_mut()
            .is_some_and(|space| space.remove_thought(id));
        if removed {
            self.workspace.has_unsaved_changes = true;
        }
        removed
    }

    /// Empties the current space.
    pub fn clear_all_thoughts(&mut self) {
        if let Some(space) = self.workspace.current.as_mut() {
            space.clear_thoughts();
            self.workspace.has_unsaved_changes = true;
        }
    }

    /// Persists the current space, optionally renaming it.
    ///
    /// # Errors
    /// - `NoCurrentSpace` when nothing is active.
    /// - `Repo` when the store rejects the write; in-memory state is then
    ///   restored to what it was before the call.
    pub fn save_current_space(&mut self, name: Option<&str>) -> SessionResult<()> {
        let Some(current) = self.workspace.current.as_ref() else {
            return Err(SessionError::NoCurrentSpace);
        };

        let mut saved = current.clone();
        saved.mark_saved(name);
        let next = Workspace {
            current: Some(saved),
            has_unsaved_changes: false,
        };

        let repo = &self.repo;
        commit_with_rollback(&mut self.workspace, next, |workspace| {
            match workspace.current.as_ref() {
                Some(space) => repo.save_space(space),
                None => Ok(()),
            }
        })
        .map_err(|err| {
            warn!(
                "event=session_save module=service status=error error_code=rolled_back error={}",
                err
            );
            SessionError::from(err)
        })
    }

    /// Replaces the current space with a fresh unsaved one.
    ///
    /// With `save_current_first`, unsaved changes are saved before switching;
    /// a failed save aborts the switch.
    pub fn create_new_space(&mut self, save_current_first: bool) -> SessionResult<()> {
        if save_current_first
            && self.workspace.current.is_some()
            && self.workspace.has_unsaved_changes
        {
            self.save_current_space(None)?;
        }

        let space = self.new_space();
        let space_id = space.id.clone();
        self.workspace = Workspace {
            current: Some(space),
            has_unsaved_changes: true,
        };
        self.repo.set_current_space_id(&space_id)?;
        info!(
            "event=space_new module=service status=ok space_id={}",
            space_id
        );
        Ok(())
    }

    /// Makes a stored space current.
    ///
    /// Returns `Ok(false)` and leaves the session unchanged when no document
    /// exists for `space_id`. Callers confirm discarding unsaved changes
    /// before calling this.
    pub fn load_space(&mut self, space_id: &str) -> SessionResult<bool> {
        let Some(space) = self.repo.get_space(space_id)? else {
            info!(
                "event=space_load module=service status=skip reason=not_found space_id={}",
                space_id
            );
            return Ok(false);
        };

        self.activate(space);
        self.repo.set_current_space_id(space_id)?;
        Ok(true)
    }

    /// Metadata index for the space picker.
    pub fn list_spaces(&self) -> SessionResult<Vec<SpaceMetadata>> {
        Ok(self.repo.get_spaces_metadata()?)
    }

    /// Deletes a stored space.
    ///
    /// Deleting the current space switches the session to a fresh unsaved
    /// space and repoints the current-space pointer at it.
    pub fn delete_space(&mut self, space_id: &str) -> SessionResult<()> {
        self.repo.delete_space(space_id)?;

        let deleted_current = self
            .workspace
            .current
            .as_ref()
            .is_some_and(|space| space.id == space_id);
        if deleted_current {
            self.create_new_space(false)?;
        }
        Ok(())
    }

    /// Copies thoughts stored under the flat `@thoughts` key into the current
    /// space, numbering them after the existing ids.
    ///
    /// Returns how many thoughts were imported. The flat key is left in
    /// place.
    pub fn import_legacy_thoughts(&mut self) -> usize {
        let legacy = ThoughtRepository::new(self.repo.store()).load();
        let Some(space) = self.workspace.current.as_mut() else {
            return 0;
        };

        let imported = legacy
            .iter()
            .filter_map(|thought| space.push_thought(&thought.text, thought.x, thought.y))
            .count();
        if imported > 0 {
            self.workspace.has_unsaved_changes = true;
        }
        info!(
            "event=legacy_import module=service status=ok imported={} space_id={}",
            imported, space.id
        );
        imported
    }

    fn restore_pointed_space(&self) -> SessionResult<Option<Space>> {
        let Some(space_id) = self.repo.get_current_space_id()? else {
            return Ok(None);
        };
        let space = self.repo.get_space(&space_id)?;
        if space.is_none() {
            warn!(
                "event=session_init module=service status=skip reason=dangling_pointer space_id={}",
                space_id
            );
        }
        Ok(space)
    }

    /// Builds a fresh space and points the store at it. A failed pointer
    /// write is logged only.
    fn fresh_pointed_space(&self) -> Space {
        let space = self.new_space();
        if let Err(err) = self.repo.set_current_space_id(&space.id) {
            error!(
                "event=session_init module=service status=error error_code=pointer_write_failed space_id={} error={}",
                space.id, err
            );
        }
        space
    }

    fn activate(&mut self, space: Space) -> &Space {
        self.workspace.has_unsaved_changes = !space.is_saved;
        self.workspace.current.insert(space)
    }

    fn new_space(&self) -> Space {
        SpaceRepository::<S>::create_new_space(Some(self.config.default_space_name.as_str()))
    }
}
