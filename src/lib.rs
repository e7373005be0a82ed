pub mod audit;
pub mod codes;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod money;
pub mod notify;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod validation;
