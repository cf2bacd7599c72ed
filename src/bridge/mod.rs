//! Background activities feeding or fed by the main loop.
//!
//! - [`listener`]: hardware button thread posting [`BoothEvent`]s
//! - [`mail`]: detached strip delivery
//! - [`events`]: the bounded queue between them and the main loop

pub mod events;
pub mod listener;
pub mod mail;

pub use events::{event_queue, BoothEvent, EventReceiver, EventSender, DEFAULT_QUEUE_CAPACITY};
pub use listener::{spawn_listener, InputSourceError, SignalToken};
pub use mail::{EmailPolicy, MailDispatcher, MailError, StripMailer};
