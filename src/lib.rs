pub mod broadcast;
pub mod cache;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod library;
pub mod mix_spec;
pub mod mixer;
pub mod output;
pub mod pattern;
pub mod pattern_config;
pub mod patterns;
pub mod protocol;
pub mod scheduler;
pub mod segment;
pub mod selector;
pub mod time;
