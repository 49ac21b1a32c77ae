//! Transceiver instruction encoding
//!
//! The last argument of `NttManager.transfer` is a packed list of per-transceiver
//! instructions:
//!
//! ```text
//! | count (u8) | index (u8) | length (u8) | payload ... | index | length | ... |
//! ```
//!
//! The Wormhole transceiver's payload is a single byte, `shouldSkipRelayerSend`.

use alloy::primitives::Bytes;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

/// How the destination side of a transfer gets delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Skip the standard relayer; the VAA is redeemed separately
    #[default]
    Manual,
    /// Pay the standard relayer to deliver
    Standard,
}

impl std::str::FromStr for RelayMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(RelayMode::Manual),
            "standard" | "automatic" => Ok(RelayMode::Standard),
            other => Err(eyre!("Unknown relay mode: {} (expected manual or standard)", other)),
        }
    }
}

/// One instruction addressed to a transceiver by its registration index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransceiverInstruction {
    pub index: u8,
    pub payload: Vec<u8>,
}

impl TransceiverInstruction {
    /// Instruction for a Wormhole transceiver
    pub fn wormhole(index: u8, relay: RelayMode) -> Self {
        let skip_relayer = matches!(relay, RelayMode::Manual);
        Self {
            index,
            payload: vec![skip_relayer as u8],
        }
    }
}

/// Pack instructions into the byte layout the manager expects
///
/// Instructions must be sorted by strictly increasing index.
pub fn encode_instructions(instructions: &[TransceiverInstruction]) -> Result<Bytes> {
    if instructions.len() > u8::MAX as usize {
        return Err(eyre!("Too many transceiver instructions: {}", instructions.len()));
    }

    let mut out = Vec::with_capacity(1 + instructions.len() * 3);
    out.push(instructions.len() as u8);

    let mut last_index: Option<u8> = None;
    for instruction in instructions {
        if let Some(prev) = last_index {
            if instruction.index <= prev {
                return Err(eyre!(
                    "Transceiver instruction indices must increase: {} after {}",
                    instruction.index,
                    prev
                ));
            }
        }
        if instruction.payload.len() > u8::MAX as usize {
            return Err(eyre!(
                "Instruction payload for transceiver {} is {} bytes",
                instruction.index,
                instruction.payload.len()
            ));
        }

        out.push(instruction.index);
        out.push(instruction.payload.len() as u8);
        out.extend_from_slice(&instruction.payload);
        last_index = Some(instruction.index);
    }

    Ok(Bytes::from(out))
}

/// Instructions for a manager with a single Wormhole transceiver at index 0
pub fn default_instructions(relay: RelayMode) -> Result<Bytes> {
    encode_instructions(&[TransceiverInstruction::wormhole(0, relay)])
}
