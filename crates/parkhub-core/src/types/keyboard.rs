//! Inline keyboard render object passed through to surfaces.

use serde::{Deserialize, Serialize};

/// A single keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Text shown on the button.
    pub caption: String,
    /// Opaque data sent back when the button is pressed.
    pub callback: String,
}

impl Button {
    /// Create a new button.
    pub fn new(caption: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            callback: callback.into(),
        }
    }
}

/// Rows of buttons attached to a status surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Button rows, top to bottom.
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Create an empty keyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons.
    pub fn push_row(&mut self, row: Vec<Button>) {
        self.rows.push(row);
    }

    /// Iterate over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Find the button carrying the given callback data.
    pub fn find(&self, callback: &str) -> Option<&Button> {
        self.buttons().find(|b| b.callback == callback)
    }
}
