pub mod account;
pub mod booking;
pub mod club;
pub mod price;
