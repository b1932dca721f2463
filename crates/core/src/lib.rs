//! Core domain models, profile store access, and IdP client for the Agora
//! identity synchronization service.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod idp;
pub mod models;
