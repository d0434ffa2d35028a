pub mod coupons;
pub mod products;
pub mod sessions;

pub use coupons::Entity as Coupons;
pub use products::Entity as Products;
pub use sessions::Entity as Sessions;
