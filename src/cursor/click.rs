//! Click Sessions
//!
//! A session is the span during which a simulated button stays pressed.
//! It is kept alive by fresh on-screen samples and released by the polling
//! loop once samples stop arriving for [`UP_TIMEOUT`].
//!
//! ```text
//! begin ──> Active ──(no refresh for UP_TIMEOUT)──> Released
//!             ↑  │
//!             └──┘ keep_alive
//! ```

use std::time::Instant;

use tracing::debug;

use super::error::InjectionError;
use super::zones::ButtonKind;
use super::UP_TIMEOUT;
use crate::input::{MouseButton, PointerBackend};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Button held
    Active,
    /// Button released, session finished
    Released,
}

/// One simulated button press
#[derive(Debug, Clone)]
pub struct ClickSession {
    /// Action the session was started with
    kind: ButtonKind,

    /// Button actually pressed, `None` when the press was suppressed
    pressed: Option<MouseButton>,

    started_at: Instant,
    last_refresh: Instant,
    state: SessionState,
}

impl ClickSession {
    /// Start a session: release, then press
    ///
    /// The release comes first so a button left logically down by an
    /// earlier cycle cannot swallow the new press. With `clicks_enabled`
    /// false, or for [`ButtonKind::MoveOnly`], nothing is pressed and the
    /// session's own release is skipped as well.
    pub fn begin(
        backend: &dyn PointerBackend,
        kind: ButtonKind,
        clicks_enabled: bool,
        now: Instant,
    ) -> Result<Self, InjectionError> {
        if let Some(button) = kind.button() {
            backend.button_release(button)?;
        }

        let pressed = if clicks_enabled { kind.button() } else { None };
        if let Some(button) = pressed {
            backend.button_press(button)?;
        }

        debug!("Click session begin: {} (pressed: {:?})", kind, pressed);

        Ok(Self {
            kind,
            pressed,
            started_at: now,
            last_refresh: now,
            state: SessionState::Active,
        })
    }

    /// Refresh the idle deadline
    pub fn keep_alive(&mut self, now: Instant) {
        self.last_refresh = now;
    }

    /// Release the button once the session has gone idle
    ///
    /// Returns `Ok(true)` while the session is still active and `Ok(false)`
    /// once it has been released.
    pub fn check_expiry(
        &mut self,
        backend: &dyn PointerBackend,
        now: Instant,
    ) -> Result<bool, InjectionError> {
        if self.state == SessionState::Released {
            return Ok(false);
        }

        if now.saturating_duration_since(self.last_refresh) <= UP_TIMEOUT {
            return Ok(true);
        }

        // Mark released before injecting so a failed release is not retried
        self.state = SessionState::Released;
        if let Some(button) = self.pressed {
            backend.button_release(button)?;
        }

        debug!(
            "Click session released: {} after {:?}",
            self.kind,
            now.saturating_duration_since(self.started_at)
        );

        Ok(false)
    }

    /// Action the session was started with
    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    /// Button held by this session, if any
    pub fn pressed(&self) -> Option<MouseButton> {
        self.pressed
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MockPointerBackend;
    use mockall::{predicate::eq, Sequence};
    use std::time::Duration;

    #[test]
    fn test_begin_releases_then_presses() {
        let mut backend = MockPointerBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_button_release()
            .with(eq(MouseButton::Left))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        backend
            .expect_button_press()
            .with(eq(MouseButton::Left))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let now = Instant::now();
        let session = ClickSession::begin(&backend, ButtonKind::Left, true, now).unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.pressed(), Some(MouseButton::Left));
    }

    #[test]
    fn test_move_only_presses_nothing() {
        let mut backend = MockPointerBackend::new();
        backend.expect_button_release().never();
        backend.expect_button_press().never();

        let now = Instant::now();
        let mut session = ClickSession::begin(&backend, ButtonKind::MoveOnly, true, now).unwrap();
        assert_eq!(session.pressed(), None);
        assert!(!session
            .check_expiry(&backend, now + Duration::from_millis(150))
            .unwrap());
    }

    #[test]
    fn test_clicks_disabled_only_releases() {
        let mut backend = MockPointerBackend::new();
        backend
            .expect_button_release()
            .with(eq(MouseButton::Right))
            .times(1)
            .returning(|_| Ok(()));
        backend.expect_button_press().never();

        let session =
            ClickSession::begin(&backend, ButtonKind::Right, false, Instant::now()).unwrap();
        assert_eq!(session.kind(), ButtonKind::Right);
        assert_eq!(session.pressed(), None);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut backend = MockPointerBackend::new();
        backend.expect_button_release().times(2).returning(|_| Ok(()));
        backend.expect_button_press().times(1).returning(|_| Ok(()));

        let t0 = Instant::now();
        let mut session = ClickSession::begin(&backend, ButtonKind::Middle, true, t0).unwrap();

        // Exactly UP_TIMEOUT is still alive
        assert!(session.check_expiry(&backend, t0 + UP_TIMEOUT).unwrap());
        assert!(!session
            .check_expiry(&backend, t0 + UP_TIMEOUT + Duration::from_millis(1))
            .unwrap());
        assert_eq!(session.state(), SessionState::Released);

        // Released sessions stay released without injecting again
        assert!(!session
            .check_expiry(&backend, t0 + Duration::from_secs(1))
            .unwrap());
    }

    #[test]
    fn test_keep_alive_extends_deadline() {
        let mut backend = MockPointerBackend::new();
        backend.expect_button_release().times(1).returning(|_| Ok(()));
        backend.expect_button_press().times(1).returning(|_| Ok(()));

        let t0 = Instant::now();
        let mut session = ClickSession::begin(&backend, ButtonKind::Left, true, t0).unwrap();
        session.keep_alive(t0 + Duration::from_millis(80));
        assert!(session
            .check_expiry(&backend, t0 + Duration::from_millis(150))
            .unwrap());
    }

    #[test]
    fn test_press_failure_propagates() {
        let mut backend = MockPointerBackend::new();
        backend.expect_button_release().returning(|_| Ok(()));
        backend
            .expect_button_press()
            .returning(|_| Err(InjectionError::Unavailable("display gone".to_string())));

        let result = ClickSession::begin(&backend, ButtonKind::Left, true, Instant::now());
        assert_eq!(
            result.unwrap_err(),
            InjectionError::Unavailable("display gone".to_string())
        );
    }
}
