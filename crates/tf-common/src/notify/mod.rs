pub mod queue;

pub use queue::{NotificationJob, NotificationKind, NotificationQueue, SendResult};
