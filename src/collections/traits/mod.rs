mod set;

pub use set::*;
