//! Synthesis configuration.

/// Policies fixed when the opcode table is assembled.
///
/// Passed to [`Synth::new`](crate::Synth::new); there is no global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    /// `HALT` zeroes the T-state budget so the frame loop skips ahead to
    /// the next interrupt instead of re-running `HALT` cycle by cycle.
    pub halt_speedup: bool,
    /// `LD A,R` reads the refresh register. When off it reads
    /// `rndInt(255)`, which is what most software polling `R` wants.
    pub refresh_emulation: bool,
    /// Numeric literals carry a hex rendering for dumps.
    pub annotate_literals: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            halt_speedup: true,
            refresh_emulation: true,
            annotate_literals: cfg!(debug_assertions),
        }
    }
}
