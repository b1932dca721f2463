pub mod account;
pub mod mapping;
pub mod profile;
pub mod sync;
pub mod token;
