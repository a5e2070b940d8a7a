mod error;
mod helix_constraint;
mod helix_handler;
mod helix_handler_idx_offset;

pub use error::*;
pub use helix_constraint::*;
pub use helix_handler::*;
pub use helix_handler_idx_offset::*;
