//! Mouse input replayed against resolved widgets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::widget::Point;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button
    #[default]
    #[serde(alias = "LeftButton")]
    Left,
    /// Secondary button
    #[serde(alias = "RightButton")]
    Right,
    /// Middle button
    #[serde(alias = "MiddleButton")]
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        };
        write!(f, "{name}")
    }
}

/// Keyboard modifier held during a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// No modifier
    #[default]
    #[serde(alias = "NoModifier")]
    None,
    /// Shift held
    #[serde(alias = "ShiftModifier")]
    Shift,
    /// Control held
    #[serde(alias = "ControlModifier")]
    Control,
    /// Alt held
    #[serde(alias = "AltModifier")]
    Alt,
}

/// A mouse gesture addressed to one widget, in widget-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MouseEvent {
    /// Press and release at one point
    Click {
        /// Position inside the widget
        at: Point,
        /// Button used
        button: MouseButton,
    },
    /// Press at `from`, move by `delta`, release
    Drag {
        /// Start position inside the widget
        from: Point,
        /// Displacement from the start position
        delta: Point,
        /// Modifier held during the drag
        modifier: Modifier,
        /// Button used
        button: MouseButton,
    },
}

impl MouseEvent {
    /// Create a left click
    #[must_use]
    pub const fn click(x: i32, y: i32) -> Self {
        Self::Click {
            at: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    /// Create a left-button drag without modifiers
    #[must_use]
    pub const fn drag(x: i32, y: i32, dx: i32, dy: i32) -> Self {
        Self::Drag {
            from: Point::new(x, y),
            delta: Point::new(dx, dy),
            modifier: Modifier::None,
            button: MouseButton::Left,
        }
    }

    /// Where the gesture starts
    #[must_use]
    pub const fn origin(&self) -> Point {
        match self {
            Self::Click { at, .. } => *at,
            Self::Drag { from, .. } => *from,
        }
    }

    /// Button used
    #[must_use]
    pub const fn button(&self) -> MouseButton {
        match self {
            Self::Click { button, .. } | Self::Drag { button, .. } => *button,
        }
    }
}

impl fmt::Display for MouseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { at, button } => write!(f, "{button} click at ({}, {})", at.x, at.y),
            Self::Drag {
                from,
                delta,
                button,
                ..
            } => write!(
                f,
                "{button} drag from ({}, {}) by ({}, {})",
                from.x, from.y, delta.x, delta.y
            ),
        }
    }
}
