// Core chat transport and conversation state without UI dependencies

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod test_utils;
