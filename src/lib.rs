pub mod app;
pub mod calendar;
pub mod cmds;
pub mod config;
pub mod control;
pub mod events;
pub mod provider;
pub mod render;
