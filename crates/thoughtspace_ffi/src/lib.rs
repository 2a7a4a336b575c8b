//! Flutter-facing FFI surface for ThoughtSpace core.

pub mod api;
