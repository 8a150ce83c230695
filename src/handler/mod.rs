pub mod admin;
pub mod admin_chat;
pub mod alerts;
pub mod auth;
pub mod chat;
pub mod otp;
pub mod users;
