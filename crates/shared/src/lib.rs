pub mod ai;
pub mod archive;
pub mod audio;
pub mod config;
mod config_env;
pub mod conversation;
pub mod models;
pub mod prompts;
pub mod sessions;
pub mod voice;
