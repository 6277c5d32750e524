pub mod app;
pub mod gameplay;
