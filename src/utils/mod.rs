pub mod jwt;
pub mod promo_code;
pub mod user_id;

pub use jwt::*;
pub use promo_code::{PROMO_CODE_PREFIX, generate_promo_code};
pub use user_id::validate_user_id;
