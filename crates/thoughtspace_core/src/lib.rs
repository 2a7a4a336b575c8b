//! Core domain logic for ThoughtSpace.
//! This crate is the single source of truth for thought/space invariants
//! and for the on-device storage layout.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{CanvasBounds, SessionConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::space::{Space, SpaceId, SpaceMetadata, DEFAULT_SPACE_NAME};
pub use model::thought::{is_valid_position, next_thought_id, Thought, ThoughtId};
pub use repo::space_repo::{
    generate_space_id, space_key, SpaceRepository, CURRENT_SPACE_KEY, SPACES_KEY,
    SPACE_KEY_PREFIX,
};
pub use repo::thought_repo::{ThoughtRepository, THOUGHTS_KEY};
pub use repo::{RepoError, RepoResult};
pub use service::space_session::{SessionError, SessionResult, SessionState, SpaceSession};
pub use service::thought_board::ThoughtBoard;
pub use store::{KeyValueStore, KvWrite, MemoryStore, SqliteKvStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
