pub mod commands;
pub mod host;
pub mod runtime;
pub mod tone;
