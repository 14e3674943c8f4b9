pub mod ports;
pub mod dispatcher;
pub mod status_cache;
pub mod scheduler;
pub mod usecases;

pub use ports::*;
pub use dispatcher::DeliveryDispatcher;
