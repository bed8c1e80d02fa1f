use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single tool entry on a setup sheet.
///
/// Owned by its containing [`Part`]; the order within a spindle list mirrors
/// the machining sequence and must survive storage round trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A persisted setup sheet.
///
/// `id` 0 means the store has not assigned one yet; the store hands out the
/// next free id on insert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Part {
    pub id: i64,
    pub title: String,
    pub coordinates: String,
    pub content: String,
    pub main_spindle_tools: Vec<Tool>,
    pub sub_spindle_tools: Vec<Tool>,
    pub projection_length: String,
    pub bar_size: String,
    pub sub_spindle_collet_size: String,
}

static COORDINATES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"X:(\S+)\s+Y:(\S+)\s+Z:(\S+)").expect("coordinate pattern compiles"));

/// Combine the three offset components into the stored text form.
pub fn format_coordinates(x: &str, y: &str, z: &str) -> String {
    format!("X:{x} Y:{y} Z:{z}")
}

/// Split a stored coordinate string back into its components.
///
/// Returns `None` when the text does not follow the `X:<x> Y:<y> Z:<z>`
/// form; the editor then starts from blank components.
pub fn split_coordinates(coordinates: &str) -> Option<(String, String, String)> {
    let caps = COORDINATES_PATTERN.captures(coordinates)?;
    Some((caps[1].to_string(), caps[2].to_string(), caps[3].to_string()))
}
