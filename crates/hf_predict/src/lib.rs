mod error;
mod report;
mod mfe2d;
mod mfe2d_seed;
mod mfe2d_heuristic;
mod mfe_ens2d;
mod mfe_ens_seed_extension;
mod mfe_ens_seed_only;
mod output_handler;
mod prediction_tracker;

pub use error::*;
pub use report::*;
pub use mfe2d::*;
pub use mfe2d_seed::*;
pub use mfe2d_heuristic::*;
pub use mfe_ens2d::*;
pub use mfe_ens_seed_extension::*;
pub use mfe_ens_seed_only::*;
pub use output_handler::*;
pub use prediction_tracker::*;
