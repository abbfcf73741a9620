mod ids;
mod item;
mod library;
mod progress;
mod session;

pub use ids::{CompositeId, ID_SEPARATOR};
pub use item::{format_duration, QueueItem};
pub use library::{find_episodic, Library, PODCAST_MEDIA_TYPE};
pub use progress::{ProgressEntry, ProgressIndex};
pub use session::{PlaybackSessionInfo, ProgressPatch, SyncReport};
