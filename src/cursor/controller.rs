//! Cursor Controller
//!
//! Owns every piece of cross-call state and runs the click heuristic. Two
//! threads drive it: the sensor callback calls [`CursorController::on_sample`]
//! and the polling loop calls [`CursorController::on_tick`]. Both take the
//! same lock for the whole transition, so the session, the filter and the
//! dwell flags are always observed together.
//!
//! # Interaction Model
//!
//! ```text
//!            first on-screen sample
//!   Idle ───────────────────────────> Dwell (anchor recorded)
//!                                       │
//!     ┌─────────────────────────────────┼──────────────────────────────┐
//!     │ moved > 4px                     │ still > 750ms                │ still > 60ms,
//!     │ (snap back to anchor,           │ (right button, press on      │ then silent
//!     │  press there, drag)             │  next sample)                │ > 100ms (tap)
//!     ↓                                 ↓                              ↓
//!   Running ─── samples keep the session alive ───────────────────> Running
//!     │
//!     │ no samples for > 100ms
//!     ↓
//!   release, reset to Idle with left button
//! ```
//!
//! Samples past a screen edge never move the cursor; they only select the
//! button bound to that edge for the next press.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use super::click::ClickSession;
use super::error::{CursorError, InjectionError, Result};
use super::filter::SmoothingFilter;
use super::zones::{classify, ButtonKind, Placement, ZoneMap};
use super::{Sample, CLICK_TIMEOUT, DRAG_THRESHOLD_SQUARED, RIGHT_CLICK_TIMEOUT, UP_TIMEOUT};
use crate::input::{PointerBackend, ScreenSize};

/// Setup-time controller parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Smoothing window capacity, at least 1
    pub smoothing: usize,

    /// Edge to button bindings
    pub zones: ZoneMap,

    /// Press buttons at all (false = move-only mode)
    pub clicks_enabled: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            smoothing: 5,
            zones: ZoneMap::default(),
            clicks_enabled: true,
        }
    }
}

/// Interaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Samples received
    pub samples: u64,
    /// Samples past a screen edge
    pub off_screen_samples: u64,
    /// Click sessions started
    pub sessions_begun: u64,
    /// Sessions started by a tap
    pub taps: u64,
    /// Sessions started by moving out of a dwell
    pub drags: u64,
    /// Long dwells promoted to a right-button interaction
    pub right_clicks: u64,
    /// Sessions released
    pub sessions_ended: u64,
}

/// Point-in-time view of the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// An interaction is underway
    pub running: bool,
    /// The current dwell is long enough to count as a tap
    pub to_click: bool,
    /// Dwell timer started and not yet resolved
    pub dwell_pending: bool,
    /// Button the next press will use
    pub click_type: ButtonKind,
    /// A click session exists
    pub session_active: bool,
    /// Samples in the smoothing window, `None` without a filter
    pub filter_len: Option<usize>,
    /// Presses are suppressed
    pub no_clicks: bool,
    /// Shutdown requested
    pub shutdown: bool,
}

/// Everything guarded by the controller lock
#[derive(Debug)]
struct ControllerState {
    filter: Option<SmoothingFilter>,
    session: Option<ClickSession>,

    /// Start of the current dwell
    pending_begin: Option<Instant>,
    /// Smoothed position when the dwell started
    anchor: Option<Sample>,
    /// Last on-screen sample seen during the dwell
    last_data: Option<Instant>,

    running: bool,
    to_click: bool,
    click_type: ButtonKind,
    no_clicks: bool,

    shutdown: bool,
    failure: Option<InjectionError>,

    stats: ControllerStats,
}

impl ControllerState {
    fn new(clicks_enabled: bool) -> Self {
        Self {
            filter: None,
            session: None,
            pending_begin: None,
            anchor: None,
            last_data: None,
            running: false,
            to_click: false,
            click_type: ButtonKind::Left,
            no_clicks: !clicks_enabled,
            shutdown: false,
            failure: None,
            stats: ControllerStats::default(),
        }
    }

    fn clear_dwell(&mut self) {
        self.pending_begin = None;
        self.anchor = None;
        self.last_data = None;
        self.to_click = false;
    }

    /// Back to idle after a session ends
    fn reset(&mut self) {
        self.session = None;
        self.filter = None;
        self.clear_dwell();
        self.running = false;
        self.click_type = ButtonKind::Left;
    }

    fn ensure_healthy(&self) -> Result<()> {
        match &self.failure {
            Some(cause) => Err(CursorError::Halted(cause.clone())),
            None => Ok(()),
        }
    }

    /// Record an injection failure and stop the controller
    fn latch(&mut self, result: std::result::Result<(), InjectionError>) -> Result<()> {
        result.map_err(|e| {
            error!("Pointer injection failed, stopping cursor control: {}", e);
            self.failure = Some(e.clone());
            self.shutdown = true;
            CursorError::Injection(e)
        })
    }
}

/// Click/drag state machine driving a pointer backend
pub struct CursorController {
    state: Mutex<ControllerState>,
    backend: Arc<dyn PointerBackend>,
    zones: ZoneMap,
    screen: ScreenSize,

    /// Validated empty filter, cloned at the start of each interaction
    empty_filter: SmoothingFilter,
}

impl CursorController {
    /// Create a controller
    ///
    /// The screen size is queried from the backend once, here.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Configuration`] for a zero smoothing window.
    pub fn new(backend: Arc<dyn PointerBackend>, settings: ControllerSettings) -> Result<Self> {
        let empty_filter = SmoothingFilter::new(settings.smoothing)?;
        let screen = backend.screen_size();

        info!(
            "Cursor controller: screen={}, smoothing={}, zones={}, clicks={}",
            screen,
            settings.smoothing,
            settings.zones.to_codes(),
            settings.clicks_enabled
        );

        Ok(Self {
            state: Mutex::new(ControllerState::new(settings.clicks_enabled)),
            backend,
            zones: settings.zones,
            screen,
            empty_filter,
        })
    }

    /// Handle one raw sensor sample, timestamped now
    pub fn on_sample(&self, raw: Sample) -> Result<()> {
        self.on_sample_at(raw, Instant::now())
    }

    /// Handle one raw sensor sample taken at `now`
    ///
    /// Samples arriving after [`finish`](Self::finish) are ignored.
    pub fn on_sample_at(&self, raw: Sample, now: Instant) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_healthy()?;
        if state.shutdown {
            trace!("Sample after shutdown ignored: ({}, {})", raw.x, raw.y);
            return Ok(());
        }

        state.stats.samples += 1;
        let result = self.apply_sample(&mut state, raw, now);
        state.latch(result)
    }

    /// Advance timeouts, called by the polling loop
    pub fn on_tick(&self, now: Instant) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_healthy()?;
        if state.shutdown {
            return Ok(());
        }

        let result = self.apply_tick(&mut state, now);
        state.latch(result)
    }

    /// Request shutdown of the polling loop
    ///
    /// Releases a held button and drops the session and filter. Does not
    /// wait for the loop; the owner of the loop thread joins it.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        if state.shutdown {
            return;
        }
        state.shutdown = true;

        if let Some(button) = state.session.as_ref().and_then(ClickSession::pressed) {
            if let Err(e) = self.backend.button_release(button) {
                warn!("Failed to release {} button on shutdown: {}", button, e);
                state.failure.get_or_insert(e);
            }
        }
        if state.session.is_some() {
            state.stats.sessions_ended += 1;
        }
        state.reset();

        info!("Cursor controller finishing");
    }

    /// True once [`finish`](Self::finish) ran or an injection failed
    pub fn is_finished(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Injection failure that stopped the controller, if any
    pub fn failure(&self) -> Option<InjectionError> {
        self.state.lock().failure.clone()
    }

    /// Enable or suppress button presses
    pub fn set_clicks_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.no_clicks = !enabled;
        debug!("Clicks {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Interaction counters
    pub fn stats(&self) -> ControllerStats {
        self.state.lock().stats
    }

    /// Current state, read atomically
    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.state.lock();
        ControllerSnapshot {
            running: state.running,
            to_click: state.to_click,
            dwell_pending: state.pending_begin.is_some(),
            click_type: state.click_type,
            session_active: state.session.is_some(),
            filter_len: state.filter.as_ref().map(SmoothingFilter::len),
            no_clicks: state.no_clicks,
            shutdown: state.shutdown,
        }
    }

    fn apply_sample(
        &self,
        state: &mut ControllerState,
        raw: Sample,
        now: Instant,
    ) -> std::result::Result<(), InjectionError> {
        if let Placement::Outside(zone) = classify(raw, self.screen) {
            let action = self.zones.action(zone);
            if state.click_type != action {
                debug!("Sample in {:?} zone selects {} button", zone, action);
            }
            state.click_type = action;
            state.stats.off_screen_samples += 1;
            return Ok(());
        }

        let position = state
            .filter
            .get_or_insert_with(|| self.empty_filter.clone())
            .update(raw);
        self.backend.move_to(position.x, position.y)?;

        if state.running {
            match state.session.as_mut() {
                Some(session) => session.keep_alive(now),
                None => self.begin_session(state, now)?,
            }
            return Ok(());
        }

        let Some(begin) = state.pending_begin else {
            state.pending_begin = Some(now);
            state.anchor = Some(position);
            trace!("Dwell started at ({}, {})", position.x, position.y);
            return Ok(());
        };

        state.last_data = Some(now);
        let elapsed = now.saturating_duration_since(begin);

        if elapsed > CLICK_TIMEOUT {
            state.to_click = true;
        }

        if elapsed > RIGHT_CLICK_TIMEOUT {
            state.pending_begin = None;
            state.running = true;
            state.click_type = ButtonKind::Right;
            state.stats.right_clicks += 1;
            debug!("Long dwell ({:?}): right button", elapsed);
        } else if let Some(anchor) = state.anchor {
            if position.distance_squared(anchor) > DRAG_THRESHOLD_SQUARED {
                state.pending_begin = None;
                state.running = true;
                state.stats.drags += 1;
                debug!(
                    "Moved out of dwell after {:?}: press at ({}, {}) and drag",
                    elapsed, anchor.x, anchor.y
                );

                self.backend.move_to(anchor.x, anchor.y)?;
                self.begin_session(state, now)?;
            }
        }

        Ok(())
    }

    fn apply_tick(
        &self,
        state: &mut ControllerState,
        now: Instant,
    ) -> std::result::Result<(), InjectionError> {
        let silent = state
            .last_data
            .is_some_and(|t| now.saturating_duration_since(t) > UP_TIMEOUT);

        if state.to_click && !state.running && silent {
            state.clear_dwell();
            state.running = true;
            state.stats.taps += 1;
            debug!("Tap detected");
            self.begin_session(state, now)?;
        }

        if let Some(session) = state.session.as_mut() {
            let active = session.check_expiry(self.backend.as_ref(), now);
            if !matches!(active, Ok(true)) {
                debug!("{} session ended", session.kind());
                state.reset();
                state.stats.sessions_ended += 1;
            }
            active?;
        }

        Ok(())
    }

    fn begin_session(
        &self,
        state: &mut ControllerState,
        now: Instant,
    ) -> std::result::Result<(), InjectionError> {
        assert!(
            state.session.is_none(),
            "click session started while another is active"
        );

        let session =
            ClickSession::begin(self.backend.as_ref(), state.click_type, !state.no_clicks, now)?;
        state.session = Some(session);
        state.stats.sessions_begun += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MockPointerBackend, MouseButton};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn screen_backend() -> MockPointerBackend {
        let mut backend = MockPointerBackend::new();
        backend
            .expect_screen_size()
            .returning(|| ScreenSize::new(1920, 1080));
        backend
    }

    fn controller(backend: MockPointerBackend, smoothing: usize) -> CursorController {
        CursorController::new(
            Arc::new(backend),
            ControllerSettings {
                smoothing,
                ..ControllerSettings::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_zero_smoothing_is_configuration_error() {
        let backend = screen_backend();
        let result = CursorController::new(
            Arc::new(backend),
            ControllerSettings {
                smoothing: 0,
                ..ControllerSettings::default()
            },
        );
        assert!(matches!(result, Err(CursorError::Configuration(_))));
    }

    #[test]
    fn test_oversized_smoothing_is_configuration_error() {
        let result = CursorController::new(
            Arc::new(screen_backend()),
            ControllerSettings {
                smoothing: usize::MAX / 2,
                ..ControllerSettings::default()
            },
        );
        assert!(matches!(result, Err(CursorError::Configuration(_))));
    }

    #[test]
    fn test_off_screen_sample_only_selects_button() {
        let mut backend = screen_backend();
        backend.expect_move_to().never();
        backend.expect_button_press().never();
        backend.expect_button_release().never();

        let zones = ZoneMap::from_codes("2301").unwrap();
        let controller = CursorController::new(
            Arc::new(backend),
            ControllerSettings {
                smoothing: 3,
                zones,
                clicks_enabled: true,
            },
        )
        .unwrap();

        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(100, -5), t0).unwrap();
        assert_eq!(controller.snapshot().click_type, ButtonKind::Right);

        controller.on_sample_at(Sample::new(2000, 5), t0).unwrap();
        assert_eq!(controller.snapshot().click_type, ButtonKind::Middle);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.filter_len, None);
        assert!(!snapshot.dwell_pending);
        assert_eq!(controller.stats().off_screen_samples, 2);
    }

    #[test]
    fn test_first_sample_starts_dwell() {
        let mut backend = screen_backend();
        backend
            .expect_move_to()
            .with(eq(50), eq(60))
            .times(1)
            .returning(|_, _| Ok(()));

        let controller = controller(backend, 4);
        controller
            .on_sample_at(Sample::new(50, 60), Instant::now())
            .unwrap();

        let snapshot = controller.snapshot();
        assert!(snapshot.dwell_pending);
        assert!(!snapshot.running);
        assert_eq!(snapshot.filter_len, Some(1));
    }

    #[test]
    fn test_drag_snaps_back_and_presses_at_anchor() {
        let mut backend = screen_backend();
        let mut seq = Sequence::new();
        backend
            .expect_move_to()
            .with(eq(100), eq(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        // Smoothing of 1 passes the raw jump straight through
        backend
            .expect_move_to()
            .with(eq(110), eq(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        backend
            .expect_move_to()
            .with(eq(100), eq(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
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

        let controller = controller(backend, 1);
        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(100, 100), t0).unwrap();
        controller
            .on_sample_at(Sample::new(110, 100), t0 + ms(10))
            .unwrap();

        let snapshot = controller.snapshot();
        assert!(snapshot.running);
        assert!(snapshot.session_active);
        assert!(!snapshot.dwell_pending);
        assert_eq!(controller.stats().drags, 1);
    }

    #[test]
    fn test_four_pixel_move_is_not_a_drag() {
        let mut backend = screen_backend();
        backend.expect_move_to().returning(|_, _| Ok(()));
        backend.expect_button_press().never();

        let controller = controller(backend, 1);
        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(100, 100), t0).unwrap();
        // 4 px exactly: squared distance 16 is not above the threshold
        controller
            .on_sample_at(Sample::new(104, 100), t0 + ms(10))
            .unwrap();

        assert!(!controller.snapshot().running);
    }

    #[test]
    fn test_tap_then_release() {
        let mut backend = screen_backend();
        backend.expect_move_to().returning(|_, _| Ok(()));
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
        backend
            .expect_button_release()
            .with(eq(MouseButton::Left))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let controller = controller(backend, 3);
        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(500, 500), t0).unwrap();
        controller
            .on_sample_at(Sample::new(501, 500), t0 + ms(70))
            .unwrap();
        assert!(controller.snapshot().to_click);

        // Still within UP_TIMEOUT of the last sample
        controller.on_tick(t0 + ms(150)).unwrap();
        assert!(!controller.snapshot().running);

        controller.on_tick(t0 + ms(171)).unwrap();
        let snapshot = controller.snapshot();
        assert!(snapshot.running);
        assert!(snapshot.session_active);
        assert!(!snapshot.to_click);

        // Session idles out after another UP_TIMEOUT
        controller.on_tick(t0 + ms(272)).unwrap();
        let snapshot = controller.snapshot();
        assert!(!snapshot.running);
        assert!(!snapshot.session_active);
        assert_eq!(snapshot.filter_len, None);

        let stats = controller.stats();
        assert_eq!(stats.taps, 1);
        assert_eq!(stats.sessions_begun, 1);
        assert_eq!(stats.sessions_ended, 1);
    }

    #[test]
    fn test_long_dwell_selects_right_button() {
        let mut backend = screen_backend();
        backend.expect_move_to().returning(|_, _| Ok(()));
        let mut seq = Sequence::new();
        backend
            .expect_button_release()
            .with(eq(MouseButton::Right))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        backend
            .expect_button_press()
            .with(eq(MouseButton::Right))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let controller = controller(backend, 2);
        let t0 = Instant::now();
        for i in 0..=77 {
            controller
                .on_sample_at(Sample::new(300, 300), t0 + ms(i * 10))
                .unwrap();
        }

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.click_type, ButtonKind::Right);
        assert!(snapshot.running);
        assert!(snapshot.session_active);
        assert_eq!(controller.stats().right_clicks, 1);
    }

    #[test]
    fn test_clicks_disabled_never_presses() {
        let mut backend = screen_backend();
        backend.expect_move_to().returning(|_, _| Ok(()));
        backend.expect_button_release().returning(|_| Ok(()));
        backend.expect_button_press().never();

        let controller = controller(backend, 1);
        controller.set_clicks_enabled(false);
        assert!(controller.snapshot().no_clicks);

        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(100, 100), t0).unwrap();
        controller
            .on_sample_at(Sample::new(150, 100), t0 + ms(5))
            .unwrap();
        assert!(controller.snapshot().session_active);
    }

    #[test]
    fn test_injection_failure_halts_controller() {
        let mut backend = screen_backend();
        backend
            .expect_move_to()
            .times(1)
            .returning(|_, _| Err(InjectionError::Unavailable("no display".to_string())));

        let controller = controller(backend, 1);
        let t0 = Instant::now();
        let err = controller
            .on_sample_at(Sample::new(10, 10), t0)
            .unwrap_err();
        assert!(matches!(err, CursorError::Injection(_)));
        assert!(controller.is_finished());
        assert_eq!(
            controller.failure(),
            Some(InjectionError::Unavailable("no display".to_string()))
        );

        assert!(matches!(
            controller.on_sample_at(Sample::new(10, 10), t0 + ms(1)),
            Err(CursorError::Halted(_))
        ));
        assert!(matches!(
            controller.on_tick(t0 + ms(2)),
            Err(CursorError::Halted(_))
        ));
    }

    #[test]
    fn test_finish_releases_held_button() {
        let mut backend = screen_backend();
        backend.expect_move_to().returning(|_, _| Ok(()));
        backend.expect_button_press().times(1).returning(|_| Ok(()));
        // Defensive release at begin, then the shutdown release
        backend
            .expect_button_release()
            .with(eq(MouseButton::Left))
            .times(2)
            .returning(|_| Ok(()));

        let controller = controller(backend, 1);
        let t0 = Instant::now();
        controller.on_sample_at(Sample::new(100, 100), t0).unwrap();
        controller
            .on_sample_at(Sample::new(200, 100), t0 + ms(5))
            .unwrap();
        assert!(controller.snapshot().session_active);

        controller.finish();
        let snapshot = controller.snapshot();
        assert!(snapshot.shutdown);
        assert!(!snapshot.session_active);
        assert_eq!(snapshot.filter_len, None);

        // Ignored after shutdown
        controller
            .on_sample_at(Sample::new(300, 300), t0 + ms(10))
            .unwrap();
        assert_eq!(controller.stats().samples, 2);
    }
}
