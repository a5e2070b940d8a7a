mod error;
mod accessibility;
mod nussinov;
mod interaction_energy;
mod idx_offset;
mod vienna;

pub use error::*;
pub use accessibility::*;
pub use nussinov::*;
pub use interaction_energy::*;
pub use idx_offset::*;
pub use vienna::*;

/// Free energies and Boltzmann weights are plain `f64`; the back-end this
/// crate eventually delegates to (Vienna-style nearest-neighbor tables)
/// reports kcal/mol doubles, and the base-pair toy model has no reason to
/// diverge from that.
pub type EType = f64;

/// Sentinel for "this loop/pair/region is energetically forbidden".
pub const E_INF: EType = 1.0e9;
