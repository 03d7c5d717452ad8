//! Subscriptions and events, the vocabulary of the polling primitive.

#[allow(clippy::module_inception)]
mod event;
mod events;
mod subscription;

pub use self::event::{Event, EventKind};
pub use self::events::{Events, Iter};
pub use self::subscription::{ClockId, Direction, Subscription, Userdata};
