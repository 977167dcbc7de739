pub mod config;
pub mod devices;
pub mod payments;
pub mod runs;
pub mod tickets;
pub mod timing;
pub mod users;
