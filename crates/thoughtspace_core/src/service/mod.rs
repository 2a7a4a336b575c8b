//! Stateful use-case layer consumed by the FFI surface.
//!
//! # Responsibility
//! - Hold the in-memory document the UI renders.
//! - Decide when in-memory changes reach the persistence adapters.
//!
//! # Invariants
//! - Services never bypass the repository adapters.
//! - A failed persistence step leaves in-memory state as it was before the
//!   operation started (see [`commit_with_rollback`]).

pub mod space_session;
pub mod thought_board;

/// Replaces `state` with `next`, then runs `persist` against the new value.
///
/// On persistence failure the previous value is restored and the error is
/// returned unchanged.
pub fn commit_with_rollback<T, E>(
    state: &mut T,
    next: T,
    persist: impl FnOnce(&T) -> Result<(), E>,
) -> Result<(), E> {
    let previous = std::mem::replace(state, next);
    if let Err(err) = persist(state) {
        *state = previous;
        return Err(err);
    }
    Ok(())
}
