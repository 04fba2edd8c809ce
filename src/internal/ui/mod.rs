pub mod app;
pub mod keybindings;
pub mod keybindings_default;
pub mod view;
pub mod view_model;
