//! Button token parsing
//!
//! The host's input layer emits strings like `"Left - Pressed"`. Older
//! emitters send bare `"Fire"` / `"Start"`. Tokens are parsed once into a
//! typed `ButtonEvent`; anything unrecognized yields `None` and is ignored.

/// Physical buttons known to the cabinet games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    A,
    B,
    /// `"Fire"` and `"Fire Button"`
    Fire,
    Start,
    /// Two-player diagonal pads (`"Up/Left"` etc.)
    UpLeft,
    DownLeft,
    UpRight,
    DownRight,
}

impl Button {
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.trim() {
            "Left" => Button::Left,
            "Right" => Button::Right,
            "Up" => Button::Up,
            "Down" => Button::Down,
            "A Button" => Button::A,
            "B Button" => Button::B,
            "Fire" | "Fire Button" => Button::Fire,
            "Start" => Button::Start,
            "Up/Left" => Button::UpLeft,
            "Down/Left" => Button::DownLeft,
            "Up/Right" => Button::UpRight,
            "Down/Right" => Button::DownRight,
            _ => return None,
        };
        Some(button)
    }

    /// A, B and Fire all trigger the primary action
    pub fn is_fire(&self) -> bool {
        matches!(self, Button::A | Button::B | Button::Fire)
    }
}

/// A parsed press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn pressed(button: Button) -> Self {
        Self {
            button,
            pressed: true,
        }
    }

    pub fn released(button: Button) -> Self {
        Self {
            button,
            pressed: false,
        }
    }

    /// Parse a host token
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.rsplit_once(" - ") {
            Some((name, "Pressed")) => Button::from_name(name).map(Self::pressed),
            Some((name, "Released")) => Button::from_name(name).map(Self::released),
            Some(_) => None,
            // Legacy bare tokens are presses
            None => match token {
                "Fire" => Some(Self::pressed(Button::Fire)),
                "Start" => Some(Self::pressed(Button::Start)),
                _ => None,
            },
        }
    }

    pub fn is_fire_press(&self) -> bool {
        self.pressed && self.button.is_fire()
    }
}
