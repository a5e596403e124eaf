pub mod app;
pub mod cli;
pub mod datetime;
pub mod details;
pub mod editor;
pub mod filter;
pub mod form;
pub mod input;
pub mod storage;
pub mod store;
pub mod task;
pub mod theme;
pub mod ui;
