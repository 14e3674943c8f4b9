pub mod memory_store;
pub mod sqlite_store;
pub mod fake_source;
pub mod steam_profile_source;
pub mod steam_deals_provider;
pub mod console_transport;
pub mod telegram_transport;
