pub mod core;
pub mod overlay;
pub mod session;
pub mod setup;
pub mod theme;
