//! External service clients.

pub mod notify;

pub use notify::{NotifyClient, NotifyError};
