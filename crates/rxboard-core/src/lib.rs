//! rxboard Core Library
//!
//! Domain logic for the pharmacy display board: the state broadcaster that
//! keeps every viewer on the latest payload, and the independent patient
//! relationship lookup.

pub mod announce;
pub mod broadcaster;
pub mod error;
pub mod event;
pub mod lookup;
pub mod notifier;
pub mod store;

pub use broadcaster::{Broadcaster, Subscription};
pub use error::{BoardError, BoardResult};
pub use event::{ClientEvent, ServerEvent};
pub use lookup::{LookupOutcome, LookupService};
