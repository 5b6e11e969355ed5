pub mod bonus;
pub mod common;
pub mod order;
pub mod promo_code;
pub mod settings;

pub use bonus::*;
pub use common::*;
pub use order::*;
pub use promo_code::*;
pub use settings::*;
