pub mod health;
pub mod jobs;
pub mod services;
pub mod users;
