mod iter;
mod lock_path;
mod validity;

pub use iter::*;
pub use lock_path::*;
