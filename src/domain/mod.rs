pub mod inverter;
pub mod losses;
pub mod pv_module;
pub mod site;
pub mod types;

pub use inverter::*;
pub use losses::*;
pub use pv_module::*;
pub use site::*;
pub use types::*;
