pub mod device;
pub mod init;
pub mod payment;
pub mod serve;
pub mod simulate;
pub mod ticket;
pub mod timing;
pub mod user;
