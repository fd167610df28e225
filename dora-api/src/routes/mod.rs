pub mod alerts;
pub mod auth;
pub mod health;
pub mod subscribers;
pub mod users;
