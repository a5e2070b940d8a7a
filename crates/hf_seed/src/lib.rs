mod error;
mod seed_constraint;
mod seed_handler;
mod seed_handler_mfe;
mod seed_handler_no_bulge;
mod seed_handler_explicit;
mod seed_handler_idx_offset;

pub use error::*;
pub use seed_constraint::*;
pub use seed_handler::*;
pub use seed_handler_mfe::*;
pub use seed_handler_no_bulge::*;
pub use seed_handler_explicit::*;
pub use seed_handler_idx_offset::*;
