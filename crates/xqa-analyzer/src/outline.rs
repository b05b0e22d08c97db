//! Structural outline entries.
//!
//! The outline is a flat list today; `items` is reserved for nesting
//! and always empty.

use serde::{Deserialize, Serialize};
use xqa_common::PositionRange;

/// Icon the front end renders next to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineIcon {
    Method,
    Property,
}

/// One navigable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Range of the identifier token, for placing the caret.
    #[serde(rename = "displayPos")]
    pub display_pos: Option<PositionRange>,
    pub icon: OutlineIcon,
    /// Rendered label: `name(p1, p2)` for functions, `$name` for variables.
    pub name: String,
    /// Range of the whole declaration, for navigation.
    pub pos: PositionRange,
    /// Reserved for nested entries; always empty.
    pub items: Vec<OutlineEntry>,
}

impl OutlineEntry {
    /// Entry for a function declaration.
    pub fn function(name: String, display_pos: Option<PositionRange>, pos: PositionRange) -> Self {
        OutlineEntry {
            display_pos,
            icon: OutlineIcon::Method,
            name,
            pos,
            items: Vec::new(),
        }
    }

    /// Entry for a module-level variable declaration.
    pub fn variable(name: String, display_pos: Option<PositionRange>, pos: PositionRange) -> Self {
        OutlineEntry {
            display_pos,
            icon: OutlineIcon::Property,
            name,
            pos,
            items: Vec::new(),
        }
    }
}
