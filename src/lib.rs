//! Purpose: Library crate behind the `joinery` CLI and its tests.
//! Exports: `api` (join operation, separator, error model); `core` (implementation modules).
//! Role: Pure string joining plus the error type shared with the binary.
//! Invariants: Library code performs no I/O and holds no global mutable state.
pub mod api;
pub mod core;
