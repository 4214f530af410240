//! Candidate notifications, the arbiter that gates them and the message
//! board that tracks what is on screen.

mod arbiter;
mod candidate;
mod presenter;

pub use arbiter::{Arbiter, Rejection};
pub use candidate::{ActionKind, NotificationAction, NotificationCandidate, NotificationKind, Priority};
pub use presenter::{
    ActionButton, MessageBoard, Presentation, PresentationSink, RecordingSink, RetiredMessage,
    SinkCall,
};
