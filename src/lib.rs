// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod derived;
pub mod lifecycle;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod scheduler;
pub mod settings;
pub mod state_repo;
pub mod store;
pub mod update;
pub mod version;
