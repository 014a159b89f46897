//! Offline consolidation passes (§4.F): the nightly dream cycle and the
//! daily power-law decay.

pub mod decay;
pub mod dream;

pub use decay::{run_decay, DecayStats};
pub use dream::{run_dream, DreamResult};
