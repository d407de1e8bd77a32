pub mod configuration;
pub mod controller;
pub mod dao;
pub mod error;
pub mod handler;
pub mod helpers;
pub mod mailbox;
pub mod provider;
pub mod push;
pub mod server;
pub mod types;
