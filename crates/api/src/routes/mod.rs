pub mod auth;
pub mod chat_rooms;
pub mod faq;
pub mod health;
pub mod models;
pub mod notifications;
pub mod posts;
pub mod users;
