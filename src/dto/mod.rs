pub mod auth;
pub mod bills;
pub mod menu;
pub mod reservations;
pub mod reviews;
pub mod tables;
pub mod users;
