pub mod admins;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod testimonials;
pub mod users;
