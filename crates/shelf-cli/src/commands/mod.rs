//! Command handlers

pub mod book;
pub mod config;
pub mod debug;
pub mod loan;
pub mod log;
pub mod member;
pub mod request;
pub mod status;
