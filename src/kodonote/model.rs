use crate::blocks::Blocks;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Code,
    Text,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Code => "code",
            SectionType::Text => "text",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "code" => Ok(SectionType::Code),
            "text" | "note" => Ok(SectionType::Text),
            other => Err(format!("Unknown section type: {} (expected code or text)", other)),
        }
    }
}

/// One unit of notebook content. The type is fixed at creation; only the value
/// is ever edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    section_type: SectionType,
    pub value: String,
}

impl ContentBlock {
    pub fn new(section_type: SectionType) -> Self {
        Self::with_value(section_type, "")
    }

    pub fn with_value(section_type: SectionType, value: impl Into<String>) -> Self {
        Self {
            section_type,
            value: value.into(),
        }
    }

    pub fn section_type(&self) -> SectionType {
        self.section_type
    }
}

/// A notebook as stored remotely: display metadata plus the block body.
///
/// `(owner_id, title)` is the lookup key of the remote counterpart and is never
/// edited through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    owner_id: String,
    color: String,
    title: String,
    /// Advisory marker. Nothing here updates it unless the session is told to.
    #[serde(default)]
    last_edited: String,
    #[serde(default)]
    pub blocks: Blocks,
}

impl Notebook {
    pub fn new(
        owner_id: impl Into<String>,
        color: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            color: color.into(),
            title: title.into(),
            last_edited: String::new(),
            blocks: Blocks::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: impl Into<Blocks>) -> Self {
        self.blocks = blocks.into();
        self
    }

    pub fn with_last_edited(mut self, marker: impl Into<String>) -> Self {
        self.last_edited = marker.into();
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn last_edited(&self) -> &str {
        &self.last_edited
    }

    pub fn set_last_edited(&mut self, marker: impl Into<String>) {
        self.last_edited = marker.into();
    }
}

/// Which notebook a session is focused on.
///
/// Only `owner_id` and `title` take part in matching; `color` seeds the
/// placeholder shown before the remote copy arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusIdentity {
    pub owner_id: String,
    pub title: String,
    pub color: String,
}

impl FocusIdentity {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            color: String::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn matches(&self, notebook: &Notebook) -> bool {
        notebook.owner_id == self.owner_id && notebook.title == self.title
    }

    /// The empty notebook a session holds until it is hydrated.
    pub fn placeholder(&self) -> Notebook {
        Notebook::new(&self.owner_id, &self.color, &self.title)
    }
}

impl fmt::Display for FocusIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.title)
    }
}
