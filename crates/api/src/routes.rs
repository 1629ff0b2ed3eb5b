pub mod auth;
pub mod booking;
pub mod clubs;
pub mod health;
