pub mod cart;
pub mod common;
pub mod discount;
pub mod pagination;
pub mod referral;
pub mod rewards;
pub mod spin;
pub mod voucher;
pub mod wallet;

pub use cart::*;
pub use common::*;
pub use discount::*;
pub use pagination::*;
pub use referral::*;
pub use rewards::*;
pub use spin::*;
pub use voucher::*;
pub use wallet::*;
