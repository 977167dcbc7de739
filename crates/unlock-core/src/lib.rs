pub mod config;
pub mod device;
pub mod error;
pub mod io;
pub mod lookup;
pub mod paths;
pub mod payment;
pub mod run;
pub mod ticket;
pub mod timing;
pub mod types;
pub mod user;

pub use error::{Result, UnlockError};
