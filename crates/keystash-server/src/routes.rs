pub mod exists;
pub mod files;
pub mod health;
pub mod strings;
