pub mod types;
pub mod notify_request;
pub mod broadcast_target;
pub mod status;
pub mod matcher;

pub use types::*;
pub use notify_request::*;
pub use broadcast_target::*;
pub use status::*;
pub use matcher::matches;
