pub mod bonus_accounts;
pub mod bonus_settings;
pub mod bonus_transactions;
pub mod order_items;
pub mod orders;
pub mod promo_codes;

pub use bonus_accounts as bonus_account_entity;
pub use bonus_settings as bonus_settings_entity;
pub use bonus_transactions as bonus_transaction_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use promo_codes as promo_code_entity;

pub use bonus_transactions::TransactionKind;
pub use orders::OrderStatus;
pub use promo_codes::DiscountType;
