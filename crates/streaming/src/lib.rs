pub mod channel;
pub mod forwarder;
pub mod location;
pub mod protocol;

pub use channel::*;
pub use forwarder::*;
pub use location::*;
pub use protocol::*;
