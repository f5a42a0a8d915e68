pub mod config;
pub mod template_engine;
