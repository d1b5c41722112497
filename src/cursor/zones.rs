//! Off-Screen Boundary Zones
//!
//! Moving the pointer past an edge of the screen selects which button the
//! next click will use. Each of the four edges is bound to a [`ButtonKind`]
//! through a [`ZoneMap`].
//!
//! ```text
//!              Top (y < 0)
//!          ┌──────────────────┐
//!  Left    │                  │   Right
//! (x < 0)  │      Inside      │ (x > width)
//!          │                  │
//!          └──────────────────┘
//!            Bottom (y > height)
//! ```
//!
//! A corner matches two zones; the checks run in the order top, right,
//! bottom, left and the first match wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CursorError, Result};
use super::Sample;
use crate::input::{MouseButton, ScreenSize};

/// Button action bound to a click session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// Left button (default)
    #[default]
    Left,
    /// Middle button
    Middle,
    /// Right button
    Right,
    /// Move the cursor, never press
    MoveOnly,
}

impl ButtonKind {
    /// Decode a single-character zone code
    ///
    /// `'0'` left, `'1'` move-only, `'2'` right, `'3'` middle. Anything else
    /// decodes to left.
    pub fn from_code(code: char) -> Self {
        match code {
            '0' => ButtonKind::Left,
            '1' => ButtonKind::MoveOnly,
            '2' => ButtonKind::Right,
            '3' => ButtonKind::Middle,
            _ => ButtonKind::Left,
        }
    }

    /// Zone code for this action
    pub fn code(&self) -> char {
        match self {
            ButtonKind::Left => '0',
            ButtonKind::MoveOnly => '1',
            ButtonKind::Right => '2',
            ButtonKind::Middle => '3',
        }
    }

    /// Physical button pressed for this action
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            ButtonKind::Left => Some(MouseButton::Left),
            ButtonKind::Middle => Some(MouseButton::Middle),
            ButtonKind::Right => Some(MouseButton::Right),
            ButtonKind::MoveOnly => None,
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonKind::Left => write!(f, "left"),
            ButtonKind::Middle => write!(f, "middle"),
            ButtonKind::Right => write!(f, "right"),
            ButtonKind::MoveOnly => write!(f, "move-only"),
        }
    }
}

/// Screen edge a sample left through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Above the screen
    Top,
    /// Right of the screen
    Right,
    /// Below the screen
    Bottom,
    /// Left of the screen
    Left,
}

impl Zone {
    /// All zones in classification priority order
    pub const ALL: [Zone; 4] = [Zone::Top, Zone::Right, Zone::Bottom, Zone::Left];

    fn index(self) -> usize {
        match self {
            Zone::Top => 0,
            Zone::Right => 1,
            Zone::Bottom => 2,
            Zone::Left => 3,
        }
    }
}

/// Where a raw sample falls relative to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// On screen, edges included
    Inside,
    /// Past one of the edges
    Outside(Zone),
}

/// Classify a raw position against the screen bounds
pub fn classify(position: Sample, screen: ScreenSize) -> Placement {
    let width = screen.width as i64;
    let height = screen.height as i64;
    let (x, y) = (position.x as i64, position.y as i64);

    if y < 0 {
        Placement::Outside(Zone::Top)
    } else if x > width {
        Placement::Outside(Zone::Right)
    } else if y > height {
        Placement::Outside(Zone::Bottom)
    } else if x < 0 {
        Placement::Outside(Zone::Left)
    } else {
        Placement::Inside
    }
}

/// Zone to button action table
///
/// Always holds an action for every zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneMap {
    actions: [ButtonKind; 4],
}

impl ZoneMap {
    /// Decode a zone code string
    ///
    /// Characters map to top, right, bottom, left in order. Missing or
    /// unknown codes decode to left.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Configuration`] for more than four codes.
    pub fn from_codes(codes: &str) -> Result<Self> {
        let count = codes.chars().count();
        if count > Zone::ALL.len() {
            return Err(CursorError::Configuration(format!(
                "zone table has {} codes, expected at most 4: {:?}",
                count, codes
            )));
        }

        let mut actions = [ButtonKind::default(); 4];
        for (slot, code) in actions.iter_mut().zip(codes.chars()) {
            *slot = ButtonKind::from_code(code);
        }

        Ok(Self { actions })
    }

    /// Action bound to a zone
    pub fn action(&self, zone: Zone) -> ButtonKind {
        self.actions[zone.index()]
    }

    /// Encode back into a four-character code string
    pub fn to_codes(&self) -> String {
        self.actions.iter().map(ButtonKind::code).collect()
    }
}
