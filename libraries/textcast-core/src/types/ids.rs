/// Identifier types for TextCast items
use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between container and child parts of a composite identifier
pub const ID_SEPARATOR: char = '/';

/// Two-part address of a playable item.
///
/// Episodic content is addressed as `"{containerId}/{childId}"` (podcast
/// show + episode); books and other single-file items use the container id
/// alone. Only the first separator splits, so a child id may itself contain
/// `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeId {
    container: String,
    child: Option<String>,
}

impl CompositeId {
    /// Create a composite ID from its parts
    pub fn new(container: impl Into<String>, child: Option<String>) -> Self {
        Self {
            container: container.into(),
            child,
        }
    }

    /// Split an identifier on its first separator.
    ///
    /// An identifier without a separator is a container-only id.
    pub fn parse(id: &str) -> Self {
        match id.split_once(ID_SEPARATOR) {
            Some((container, child)) => Self::new(container, Some(child.to_string())),
            None => Self::new(id, None),
        }
    }

    /// Parse an identifier that must address a child item.
    ///
    /// Server mutations on episodes need both parts; anything else is
    /// `MalformedIdentifier`.
    pub fn parse_child(id: &str) -> Result<Self> {
        match id.split_once(ID_SEPARATOR) {
            Some((container, child)) if !container.is_empty() && !child.is_empty() => {
                Ok(Self::new(container, Some(child.to_string())))
            }
            _ => Err(MediaError::MalformedIdentifier(id.to_string())),
        }
    }

    /// Container (library item) part
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Child (episode) part, if any
    pub fn child(&self) -> Option<&str> {
        self.child.as_deref()
    }

    /// Whether this id addresses a child item
    pub fn is_composite(&self) -> bool {
        self.child.is_some()
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.child {
            Some(child) => write!(f, "{}{}{}", self.container, ID_SEPARATOR, child),
            None => write!(f, "{}", self.container),
        }
    }
}

impl From<&str> for CompositeId {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}
