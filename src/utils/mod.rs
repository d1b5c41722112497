//! Utility Functions
//!
//! User-friendly error formatting for the `ir-cursor` binary.
//!
//! ```rust,no_run
//! use ir_cursor::utils::format_user_error;
//!
//! # fn operation() -> anyhow::Result<()> { Ok(()) }
//! if let Err(e) = operation() {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```

pub mod errors;

pub use errors::format_user_error;
