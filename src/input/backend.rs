//! Pointer Injection Backends
//!
//! The cursor controller drives the host pointer through [`PointerBackend`].
//! Calls are made while the controller lock is held, so implementations must
//! return in bounded time and must not call back into the controller.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::mouse::{MouseButton, ScreenSize};
use crate::cursor::InjectionError;

/// Pointer movement and button injection primitives
#[cfg_attr(test, mockall::automock)]
pub trait PointerBackend: Send + Sync {
    /// Screen size, queried once when the controller is built
    fn screen_size(&self) -> ScreenSize;

    /// Move the pointer to an absolute position
    fn move_to(&self, x: i32, y: i32) -> Result<(), InjectionError>;

    /// Press a button
    fn button_press(&self, button: MouseButton) -> Result<(), InjectionError>;

    /// Release a button
    fn button_release(&self, button: MouseButton) -> Result<(), InjectionError>;
}

/// Backend that only logs what it would inject
///
/// Tracks button state so redundant releases show up in the logs.
pub struct DryRunBackend {
    screen: ScreenSize,
    state: Mutex<DryRunState>,
}

#[derive(Debug, Default)]
struct DryRunState {
    position: (i32, i32),
    pressed: [bool; 3],
    events: u64,
}

impl DryRunBackend {
    /// Create a dry-run backend for the given screen
    pub fn new(screen: ScreenSize) -> Self {
        info!("Dry-run pointer backend on {} screen", screen);
        Self {
            screen,
            state: Mutex::new(DryRunState::default()),
        }
    }

    /// Last position moved to
    pub fn position(&self) -> (i32, i32) {
        self.state.lock().position
    }

    /// Check if button is currently pressed
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.state.lock().pressed[button.index()]
    }

    /// Number of events injected so far
    pub fn events(&self) -> u64 {
        self.state.lock().events
    }
}

impl PointerBackend for DryRunBackend {
    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        let mut state = self.state.lock();
        state.position = (x, y);
        state.events += 1;
        debug!("Pointer move: ({}, {})", x, y);
        Ok(())
    }

    fn button_press(&self, button: MouseButton) -> Result<(), InjectionError> {
        let mut state = self.state.lock();
        state.pressed[button.index()] = true;
        state.events += 1;
        info!(
            "Button press: {} (code {}) at ({}, {})",
            button,
            button.to_linux_button(),
            state.position.0,
            state.position.1
        );
        Ok(())
    }

    fn button_release(&self, button: MouseButton) -> Result<(), InjectionError> {
        let mut state = self.state.lock();
        if !state.pressed[button.index()] {
            debug!("Release of {} button that was not pressed", button);
        }
        state.pressed[button.index()] = false;
        state.events += 1;
        info!(
            "Button release: {} (code {})",
            button,
            button.to_linux_button()
        );
        Ok(())
    }
}

impl Drop for DryRunBackend {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.pressed.iter().any(|p| *p) {
            warn!("Dry-run backend dropped with buttons held: {:?}", state.pressed);
        }
    }
}
