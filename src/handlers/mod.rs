pub mod auth;
pub mod health;
pub mod profile;
pub mod tasks;
