//! Route handlers.

pub mod avatar;
