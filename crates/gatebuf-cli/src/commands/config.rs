//! Effective configuration command.

use anyhow::Result;
use gatebuf_core::budget::resolve_ceiling;
use gatebuf_core::regime::{ExchangeRegime, PartitionType};
use gatebuf_engine::NetworkBufferConfig;
use serde::Serialize;

use crate::output::{self, Format};
use crate::{BufferArgs, OutputFormat};

#[derive(Serialize)]
struct ConfigOutput {
    #[serde(flatten)]
    config: NetworkBufferConfig,
    pipelined_ceiling: String,
    blocking_ceiling: String,
}

/// Run the config command.
pub fn run(buffers: &BufferArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = super::load_config(buffers)?;
    let override_buffers = config
        .gate_request(PartitionType::Blocking, 1)?
        .max_required_override;
    let ceiling_for = |regime: ExchangeRegime| -> Result<String> {
        Ok(resolve_ceiling(regime, override_buffers)?.to_string())
    };

    let output = ConfigOutput {
        pipelined_ceiling: ceiling_for(ExchangeRegime::Pipelined)?,
        blocking_ceiling: ceiling_for(ExchangeRegime::Blocking)?,
        config: config.clone(),
    };

    match Format::from(format) {
        Format::Json => output::print_json(&output, quiet)?,
        Format::Table => {
            let items = vec![
                (
                    "Exclusive / Channel",
                    output.config.exclusive_buffers_per_channel.to_string(),
                ),
                (
                    "Floating / Gate",
                    output.config.floating_buffers_per_gate.to_string(),
                ),
                (
                    "Max Required Override",
                    output
                        .config
                        .max_required_buffers_per_gate
                        .map_or_else(|| "(default)".to_string(), |n| n.to_string()),
                ),
                ("Pipelined Ceiling", output.pipelined_ceiling),
                ("Blocking Ceiling", output.blocking_ceiling),
            ];
            output::print_key_value_table(&items, quiet);
        }
    }

    Ok(())
}
