//! Network buffer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use gatebuf_common::utils::check::{non_negative, positive};
use gatebuf_common::utils::error::Result;
use gatebuf_core::budget::{
    BufferCeiling, GateBufferPlan, GateBufferRequest, plan_gate_buffers, resolve_ceiling,
};
use gatebuf_core::regime::PartitionType;

/// Default exclusive buffers per channel.
pub const DEFAULT_EXCLUSIVE_BUFFERS_PER_CHANNEL: i64 = 2;

/// Default floating buffers per gate.
pub const DEFAULT_FLOATING_BUFFERS_PER_GATE: i64 = 8;

/// Buffer settings shared by every input gate of a task manager.
///
/// Values are kept as read from a config file or the command line and only
/// checked by [`validate`](Self::validate), so negative inputs surface as
/// configuration errors instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkBufferConfig {
    /// Buffers reserved exclusively for each channel.
    pub exclusive_buffers_per_channel: i64,
    /// Baseline size of each gate's floating pool.
    pub floating_buffers_per_gate: i64,
    /// Ceiling on the buffers a gate may require up front.
    pub max_required_buffers_per_gate: Option<i64>,
}

impl Default for NetworkBufferConfig {
    fn default() -> Self {
        Self {
            exclusive_buffers_per_channel: DEFAULT_EXCLUSIVE_BUFFERS_PER_CHANNEL,
            floating_buffers_per_gate: DEFAULT_FLOATING_BUFFERS_PER_GATE,
            max_required_buffers_per_gate: None,
        }
    }
}

impl NetworkBufferConfig {
    /// Sets the exclusive buffers per channel.
    #[must_use]
    pub fn with_exclusive_buffers_per_channel(mut self, buffers: i64) -> Self {
        self.exclusive_buffers_per_channel = buffers;
        self
    }

    /// Sets the floating buffers per gate.
    #[must_use]
    pub fn with_floating_buffers_per_gate(mut self, buffers: i64) -> Self {
        self.floating_buffers_per_gate = buffers;
        self
    }

    /// Sets the ceiling override.
    #[must_use]
    pub fn with_max_required_buffers_per_gate(mut self, buffers: i64) -> Self {
        self.max_required_buffers_per_gate = Some(buffers);
        self
    }

    /// Parses a configuration from JSON. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for negative exclusive buffers,
    /// non-positive floating buffers or a non-positive ceiling override.
    pub fn validate(&self) -> Result<()> {
        self.exclusive_per_channel()?;
        self.floating_per_gate()?;
        self.max_required_override()?;
        Ok(())
    }

    /// Builds the planning request for a gate with `channel_count` channels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is invalid.
    pub fn gate_request(
        &self,
        partition_type: PartitionType,
        channel_count: usize,
    ) -> Result<GateBufferRequest> {
        let mut request = GateBufferRequest::new(
            channel_count,
            self.exclusive_per_channel()?,
            self.floating_per_gate()?,
            partition_type.regime(),
        );
        request.max_required_override = self.max_required_override()?;
        request.validate()?;
        Ok(request)
    }

    /// Resolves the ceiling and computes the plan for a gate with
    /// `channel_count` channels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is invalid or
    /// `channel_count` is zero.
    pub fn plan_gate(
        &self,
        partition_type: PartitionType,
        channel_count: usize,
    ) -> Result<(BufferCeiling, GateBufferPlan)> {
        let request = self.gate_request(partition_type, channel_count)?;
        let ceiling = resolve_ceiling(request.regime, request.max_required_override)?;
        let plan = plan_gate_buffers(&request, ceiling)?;
        Ok((ceiling, plan))
    }

    fn exclusive_per_channel(&self) -> Result<usize> {
        non_negative(
            self.exclusive_buffers_per_channel,
            "exclusive buffers per channel",
        )
    }

    fn floating_per_gate(&self) -> Result<usize> {
        positive(self.floating_buffers_per_gate, "floating buffers per gate")
    }

    fn max_required_override(&self) -> Result<Option<usize>> {
        self.max_required_buffers_per_gate
            .map(|buffers| positive(buffers, "max required buffers per gate"))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatebuf_core::regime::ExchangeRegime;

    #[test]
    fn test_defaults() {
        let config = NetworkBufferConfig::default();
        assert_eq!(config.exclusive_buffers_per_channel, 2);
        assert_eq!(config.floating_buffers_per_gate, 8);
        assert_eq!(config.max_required_buffers_per_gate, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gate_request() {
        let config = NetworkBufferConfig::default().with_max_required_buffers_per_gate(100);
        let request = config.gate_request(PartitionType::HybridFull, 42).unwrap();

        assert_eq!(request.channel_count, 42);
        assert_eq!(request.configured_exclusive_per_channel, 2);
        assert_eq!(request.configured_floating_per_gate, 8);
        assert_eq!(request.regime, ExchangeRegime::Blocking);
        assert_eq!(request.max_required_override, Some(100));
    }

    #[test]
    fn test_negative_exclusive_rejected() {
        let config = NetworkBufferConfig::default().with_exclusive_buffers_per_channel(-1);
        assert!(config.validate().unwrap_err().is_invalid_configuration());
        assert!(
            config
                .gate_request(PartitionType::Blocking, 10)
                .unwrap_err()
                .is_invalid_configuration()
        );
    }

    #[test]
    fn test_non_positive_floating_rejected() {
        for buffers in [0, -8] {
            let config = NetworkBufferConfig::default().with_floating_buffers_per_gate(buffers);
            assert!(config.validate().unwrap_err().is_invalid_configuration());
        }
    }

    #[test]
    fn test_non_positive_override_rejected() {
        for buffers in [0, -100] {
            let config = NetworkBufferConfig::default().with_max_required_buffers_per_gate(buffers);
            assert!(config.validate().unwrap_err().is_invalid_configuration());
        }
    }

    #[test]
    fn test_zero_channels_rejected() {
        let err = NetworkBufferConfig::default()
            .gate_request(PartitionType::Pipelined, 0)
            .unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_plan_gate() {
        let config = NetworkBufferConfig::default();
        let (ceiling, plan) = config.plan_gate(PartitionType::Blocking, 999).unwrap();
        assert_eq!(ceiling.limit(), Some(1000));
        assert_eq!(plan.effective_exclusive_per_channel(), 1);
        assert_eq!(plan.total_floating(), 1007);

        let (ceiling, plan) = config.plan_gate(PartitionType::Pipelined, 999).unwrap();
        assert_eq!(ceiling, BufferCeiling::Unbounded);
        assert_eq!(plan.total_floating(), 8);

        assert!(
            config
                .plan_gate(PartitionType::Blocking, 0)
                .unwrap_err()
                .is_invalid_configuration()
        );
    }

    #[test]
    fn test_json_partial() {
        let config =
            NetworkBufferConfig::from_json_str(r#"{"max_required_buffers_per_gate": 500}"#)
                .unwrap();
        assert_eq!(config.exclusive_buffers_per_channel, 2);
        assert_eq!(config.max_required_buffers_per_gate, Some(500));

        let back = NetworkBufferConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_unknown_key() {
        let err = NetworkBufferConfig::from_json_str(r#"{"buffers": 3}"#).unwrap_err();
        assert!(!err.is_invalid_configuration());
    }
}
