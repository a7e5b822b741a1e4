//! Engine configuration, loaded from the `[permissions]` TOML section.

mod engine_config;

pub use engine_config::EngineConfig;
