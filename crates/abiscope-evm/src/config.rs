//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// Limits applied while expanding arrays and copying tails.
///
/// Arrays are decoded element by element until a limit is hit; past that
/// point they are reported as `[N elements]` instead of failing. A
/// `string`/`bytes` tail that would overrun `max_decoded_bytes` fails its
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Largest single array that is expanded element by element
    #[serde(default = "default_max_array_elements")]
    pub max_array_elements: usize,
    /// Total array elements expanded for one call or log
    #[serde(default = "default_max_total_elements")]
    pub max_total_elements: usize,
    /// Decoded bytes produced for one call or log. Each array element costs
    /// one word; each `string`/`bytes` value costs its length. Offsets may
    /// alias, so this is not bounded by the input size.
    #[serde(default = "default_max_decoded_bytes")]
    pub max_decoded_bytes: usize,
}

fn default_max_array_elements() -> usize { 1_024 }
fn default_max_total_elements() -> usize { 65_536 }
fn default_max_decoded_bytes() -> usize { 4 * 1024 * 1024 }

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_array_elements: default_max_array_elements(),
            max_total_elements: default_max_total_elements(),
            max_decoded_bytes: default_max_decoded_bytes(),
        }
    }
}
