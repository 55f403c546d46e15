pub mod auth;
pub mod entities;
pub mod pages;
pub mod stories;
pub mod users;
