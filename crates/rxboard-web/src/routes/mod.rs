//! Route handlers.

pub mod announce;
pub mod api;
pub mod display;
pub mod internal;
pub mod lookup;
