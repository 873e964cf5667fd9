//! Command handlers

pub(crate) mod common;
pub mod session;
pub(crate) mod signal;
pub mod start;
pub mod status;
pub mod stop;

pub use session::handle_session;
pub use start::handle_start;
pub use status::handle_status;
pub use stop::handle_stop;
