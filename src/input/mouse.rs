//! Mouse Buttons and Screen Geometry

use std::fmt;

/// Mouse button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Convert to Linux button code
    pub fn to_linux_button(&self) -> u32 {
        match self {
            MouseButton::Left => 0x110,   // BTN_LEFT
            MouseButton::Right => 0x111,  // BTN_RIGHT
            MouseButton::Middle => 0x112, // BTN_MIDDLE
        }
    }

    /// Convert from Linux button code
    pub fn from_linux_button(code: u32) -> Option<Self> {
        match code {
            0x110 => Some(MouseButton::Left),
            0x111 => Some(MouseButton::Right),
            0x112 => Some(MouseButton::Middle),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

/// Visible screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenSize {
    /// Create a screen size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(MouseButton::Left.to_linux_button(), 272);
        assert_eq!(MouseButton::Right.to_linux_button(), 273);
        assert_eq!(MouseButton::Middle.to_linux_button(), 274);
    }

    #[test]
    fn test_button_code_roundtrip() {
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            assert_eq!(
                MouseButton::from_linux_button(button.to_linux_button()),
                Some(button)
            );
        }
        assert_eq!(MouseButton::from_linux_button(0x113), None);
    }

    #[test]
    fn test_screen_size_display() {
        assert_eq!(ScreenSize::new(1920, 1080).to_string(), "1920x1080");
    }
}
