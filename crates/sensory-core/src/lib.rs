pub mod constants;
pub mod error;
pub mod history;
pub mod persistence;
pub mod preset;
pub mod state;
pub mod store;
pub mod subscription;
pub mod value;

pub use constants::*;
pub use error::*;
pub use history::*;
pub use persistence::*;
pub use preset::*;
pub use state::*;
pub use store::*;
pub use subscription::*;
pub use value::*;
