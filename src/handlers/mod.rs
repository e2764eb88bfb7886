pub mod foods;
pub mod health;
pub mod orders;
pub mod session;
pub mod users;
