use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a notebook's blocks are laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One block per row, in order.
    #[default]
    Row,
    /// Blocks flow left to right across a fixed number of columns.
    Grid,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Row => f.write_str("row"),
            Layout::Grid => f.write_str("grid"),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "row" | "rows" | "flex" => Ok(Layout::Row),
            "grid" | "columns" => Ok(Layout::Grid),
            other => Err(format!("Unknown layout: {} (expected row or grid)", other)),
        }
    }
}

/// Holds the current layout choice. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayController {
    layout: Layout,
}

impl DisplayController {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}
