pub mod cart;
pub mod coupons;
