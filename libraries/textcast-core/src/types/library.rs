use serde::{Deserialize, Serialize};

/// Media type reported for podcast libraries
pub const PODCAST_MEDIA_TYPE: &str = "podcast";

/// A library on the media server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: String,
    pub name: String,
    /// `"book"` or `"podcast"`
    pub media_type: String,
}

impl Library {
    /// Whether this library holds episodic content of the given media type
    pub fn is_episodic(&self, media_type: &str) -> bool {
        self.media_type.eq_ignore_ascii_case(media_type)
    }
}

/// First library whose media type matches `media_type`
pub fn find_episodic<'a>(libraries: &'a [Library], media_type: &str) -> Option<&'a Library> {
    libraries.iter().find(|library| library.is_episodic(media_type))
}
