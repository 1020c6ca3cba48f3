pub mod app;
pub mod config;
pub mod events;
pub mod sys;
