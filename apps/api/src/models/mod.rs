pub mod history;
pub mod platform;
