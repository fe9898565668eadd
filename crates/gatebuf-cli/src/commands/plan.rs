//! Single-gate plan command.

use anyhow::Result;
use gatebuf_core::budget::{BufferCeiling, GateBufferPlan};
use gatebuf_core::regime::PartitionType;
use serde::Serialize;

use crate::output::{self, Format};
use crate::{BufferArgs, OutputFormat};

/// A gate's buffer plan as printed.
#[derive(Serialize)]
pub struct PlanOutput {
    pub partition_type: String,
    pub regime: String,
    pub ceiling: String,
    pub channels: usize,
    pub exclusive_per_channel: usize,
    pub required_floating: usize,
    pub total_floating: usize,
    pub target_total: usize,
    pub capped: bool,
}

impl PlanOutput {
    pub fn new(
        partition_type: PartitionType,
        ceiling: BufferCeiling,
        plan: &GateBufferPlan,
    ) -> Self {
        Self {
            partition_type: partition_type.to_string(),
            regime: partition_type.regime().to_string(),
            ceiling: ceiling.to_string(),
            channels: plan.channel_count(),
            exclusive_per_channel: plan.effective_exclusive_per_channel(),
            required_floating: plan.required_floating(),
            total_floating: plan.total_floating(),
            target_total: plan.target_total_per_gate(),
            capped: plan.is_capped(),
        }
    }
}

/// Run the plan command.
pub fn run(
    partition: &str,
    channels: usize,
    buffers: &BufferArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let config = super::load_config(buffers)?;
    let partition_type: PartitionType = partition.parse()?;
    let (ceiling, plan) = config.plan_gate(partition_type, channels)?;
    let output = PlanOutput::new(partition_type, ceiling, &plan);

    match Format::from(format) {
        Format::Json => output::print_json(&output, quiet)?,
        Format::Table => {
            let items = vec![
                ("Partition", output.partition_type),
                ("Regime", output.regime),
                ("Ceiling", output.ceiling),
                ("Channels", output.channels.to_string()),
                ("Exclusive / Channel", output.exclusive_per_channel.to_string()),
                ("Required Floating", output.required_floating.to_string()),
                ("Total Floating", output.total_floating.to_string()),
                ("Target Total", output.target_total.to_string()),
                ("Capped", output.capped.to_string()),
            ];
            output::print_key_value_table(&items, quiet);
        }
    }

    Ok(())
}
