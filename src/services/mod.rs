pub mod cart_service;
pub mod catalog_service;
pub mod coupon_service;
pub mod session_store;
