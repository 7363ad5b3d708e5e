pub mod app;
pub mod callrecord;
pub mod config;
pub mod event;
pub mod handler;
pub mod notify;
pub mod phone;
pub mod provider;
pub mod store;
