//! CLI command implementations.

pub mod config;
pub mod plan;
pub mod sweep;

use anyhow::Result;
use gatebuf_engine::NetworkBufferConfig;

use crate::BufferArgs;

/// Loads the config file, if any, and applies command-line overrides.
pub fn load_config(args: &BufferArgs) -> Result<NetworkBufferConfig> {
    let mut config = match &args.config {
        Some(path) => NetworkBufferConfig::from_json_file(path)?,
        None => NetworkBufferConfig::default(),
    };

    if let Some(exclusive) = args.exclusive {
        config = config.with_exclusive_buffers_per_channel(exclusive);
    }
    if let Some(floating) = args.floating {
        config = config.with_floating_buffers_per_gate(floating);
    }
    if let Some(max_required) = args.max_required {
        config = config.with_max_required_buffers_per_gate(max_required);
    }

    config.validate()?;
    Ok(config)
}
