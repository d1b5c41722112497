//! Pointer Injection
//!
//! The seam between the cursor state machine and whatever actually moves the
//! host pointer. The controller only ever sees [`PointerBackend`]; the binary
//! ships [`DryRunBackend`], which logs every event through `tracing`.
//!
//! ```text
//! CursorController
//!       ↓  move_to / button_press / button_release
//! ┌─────────────────────┐
//! │  PointerBackend     │
//! └─────────────────────┘
//!       ↓
//! Display server
//! ```

pub mod backend;
pub mod mouse;

pub use backend::{DryRunBackend, PointerBackend};
pub use mouse::{MouseButton, ScreenSize};

#[cfg(test)]
pub use backend::MockPointerBackend;
