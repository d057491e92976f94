use seatalk_frame::MAX_FRAME_LEN;

/// Controls descriptor registration and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Longest `expected_length` a descriptor may declare. Never above 18.
    pub max_expected_length: usize,
    /// When true, frames whose attribute nibble disagrees with their actual
    /// length are reported as malformed instead of being dispatched.
    pub strict_length_nibble: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_expected_length: MAX_FRAME_LEN,
            strict_length_nibble: false,
        }
    }
}
