pub mod error;
pub mod flow;
pub mod intent;
pub mod reply;
pub mod traits;

pub use error::AfyaError;
pub use flow::{route, FALLBACK_TEXT};
pub use intent::Intent;
pub use reply::{Button, ListRow, ListSection, ReplySpec};
pub use traits::ReplySender;
