pub mod cache;
pub mod favorites;
pub mod models;
pub mod notification;
pub mod playback;
pub mod search;
pub mod state;
pub mod ui;
