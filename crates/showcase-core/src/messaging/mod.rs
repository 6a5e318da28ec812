//! Transport-neutral outbound model and the session port.

pub mod port;
pub mod paced;
pub mod types;
