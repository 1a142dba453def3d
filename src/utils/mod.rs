pub mod code_generator;
pub mod jwt;

pub use code_generator::{generate_spin_reference, generate_voucher_code};
pub use jwt::*;
