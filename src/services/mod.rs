pub mod auth;
pub mod feed;
pub mod friends;
pub mod media;
pub mod posts;
