//! # PadelUp Core
//!
//! Domain types and the pure booking logic behind the PadelUp front-end.
//!
//! - **Availability**: free half-hour cells per court and date
//! - **Scanner**: the free run around a clicked or hovered cell
//! - **Resolver**: duration options, prices and start times
//! - **Selection**: the click/duration/confirm state machine
//! - **Browse**: club filters and the booking grid
//!
//! Nothing in this crate performs I/O.

pub mod availability;
pub mod browse;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod selection;
pub mod slot;
