pub mod poll_watches;
pub mod broadcast_once;
pub mod manage_watches;

pub use poll_watches::{PollReport, PollWatchesUseCase};
pub use broadcast_once::{BroadcastOnceUseCase, BroadcastReport};
pub use manage_watches::{ManageWatchesUseCase, RegisterBroadcastTargetUseCase};
