//! Form state behind the editor screen: pre-population, keystroke gating,
//! validation, and assembly of the record to persist. The rendering layer
//! binds to this; nothing here draws.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::model::{self, Part, Tool};

/// Navigation sentinel meaning "open the editor in create mode".
pub const NEW_PART_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("part name is required")]
    MissingTitle,
    #[error("all three coordinates are required")]
    MissingCoordinates,
    #[error("at least one main spindle tool is required")]
    MissingMainSpindleTool,
    #[error("projection length is required")]
    MissingProjectionLength,
    #[error("bar size is required")]
    MissingBarSize,
}

/// One editable tool row in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolRow {
    pub name: String,
    pub description: String,
}

impl ToolRow {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.description.trim().is_empty()
    }
}

static COORDINATE_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d*\.?\d*$").expect("coordinate gate compiles"));
static SIZE_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d*\.?\d*$").expect("size gate compiles"));

#[derive(Debug, Clone, Default)]
pub struct EditorForm {
    pub title: String,
    pub x_coord: String,
    pub y_coord: String,
    pub z_coord: String,
    pub content: String,
    pub main_tools: Vec<ToolRow>,
    pub sub_tools: Vec<ToolRow>,
    pub projection_length: String,
    pub bar_size: String,
    pub sub_spindle_collet_size: String,
    editing_id: Option<i64>,
}

impl EditorForm {
    /// Create mode: a blank form with one empty main-tool row ready to type
    /// into.
    pub fn new() -> Self {
        Self {
            main_tools: vec![ToolRow::default()],
            ..Self::default()
        }
    }

    /// Edit mode: pre-populate every field from the stored record, splitting
    /// the coordinate string back into its three components and expanding
    /// both tool lists into editable rows.
    pub fn from_part(part: &Part) -> Self {
        let (x_coord, y_coord, z_coord) =
            model::split_coordinates(&part.coordinates).unwrap_or_default();
        Self {
            title: part.title.clone(),
            x_coord,
            y_coord,
            z_coord,
            content: part.content.clone(),
            main_tools: tool_rows(&part.main_spindle_tools),
            sub_tools: tool_rows(&part.sub_spindle_tools),
            projection_length: part.projection_length.clone(),
            bar_size: part.bar_size.clone(),
            sub_spindle_collet_size: part.sub_spindle_collet_size.clone(),
            editing_id: Some(part.id),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn add_main_tool_row(&mut self) {
        self.main_tools.push(ToolRow::default());
    }

    pub fn add_sub_tool_row(&mut self) {
        self.sub_tools.push(ToolRow::default());
    }

    /// Keystroke gate for the coordinate fields: optionally signed decimal,
    /// partial input allowed while typing.
    pub fn accepts_coordinate(input: &str) -> bool {
        COORDINATE_INPUT.is_match(input)
    }

    /// Keystroke gate for bar size, collet size, and projection length.
    pub fn accepts_size(input: &str) -> bool {
        SIZE_INPUT.is_match(input)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.x_coord.trim().is_empty()
            || self.y_coord.trim().is_empty()
            || self.z_coord.trim().is_empty()
        {
            return Err(ValidationError::MissingCoordinates);
        }
        if !self.main_tools.iter().any(|row| !row.is_blank()) {
            return Err(ValidationError::MissingMainSpindleTool);
        }
        if self.projection_length.trim().is_empty() {
            return Err(ValidationError::MissingProjectionLength);
        }
        if self.bar_size.trim().is_empty() {
            return Err(ValidationError::MissingBarSize);
        }
        Ok(())
    }

    /// Validate and assemble the record to persist.
    ///
    /// Fully blank tool rows are dropped from both lists. Nothing reaches
    /// the repository when validation fails.
    pub fn build_part(&self) -> Result<Part, ValidationError> {
        self.validate()?;
        Ok(Part {
            id: self.editing_id.unwrap_or(0),
            title: self.title.clone(),
            coordinates: model::format_coordinates(&self.x_coord, &self.y_coord, &self.z_coord),
            content: self.content.clone(),
            main_spindle_tools: collect_tools(&self.main_tools),
            sub_spindle_tools: collect_tools(&self.sub_tools),
            projection_length: self.projection_length.clone(),
            bar_size: self.bar_size.clone(),
            sub_spindle_collet_size: self.sub_spindle_collet_size.clone(),
        })
    }
}

fn tool_rows(tools: &[Tool]) -> Vec<ToolRow> {
    tools
        .iter()
        .map(|tool| ToolRow::new(&tool.name, &tool.description))
        .collect()
}

fn collect_tools(rows: &[ToolRow]) -> Vec<Tool> {
    rows.iter()
        .filter(|row| !row.is_blank())
        .map(|row| Tool::new(&row.name, &row.description))
        .collect()
}
