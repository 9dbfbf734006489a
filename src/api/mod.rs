//! Purpose: Define the stable public Rust API boundary for joinery.
//! Exports: The join operation, its separator, and the error model used by the CLI.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path the binary and tests rely on.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::join::{SEPARATOR, join_strings};
