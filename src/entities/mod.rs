pub mod cart_items;
pub mod loyalty_point_events;
pub mod order_items;
pub mod orders;
pub mod referrals;
pub mod spin_prizes;
pub mod spin_records;
pub mod users;
pub mod vouchers;
pub mod wallet_transactions;
pub mod wallets;

pub use cart_items as cart_item_entity;
pub use loyalty_point_events as loyalty_point_event_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use referrals as referral_entity;
pub use spin_prizes as spin_prize_entity;
pub use spin_records as spin_record_entity;
pub use users as user_entity;
pub use vouchers as voucher_entity;
pub use wallet_transactions as wallet_transaction_entity;
pub use wallets as wallet_entity;

pub use orders::OrderStatus;
pub use referrals::ReferralStatus;
pub use spin_prizes::PrizeType;
pub use spin_records::SpinRecordStatus;
pub use vouchers::DiscountType;
