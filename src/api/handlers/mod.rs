pub mod companies;
pub mod health;
pub mod user_info;
