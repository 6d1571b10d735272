pub mod follow;
pub mod notification;
pub mod suggestion;
pub mod user;

pub use follow::Follow;
pub use notification::{Notification, NotificationKind};
pub use suggestion::SuggestionRecord;
pub use user::{Profile, User};
