mod controls;
mod keyboard;

pub use controls::*;
pub use keyboard::*;
