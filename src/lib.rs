pub mod analysis;
pub mod config;
pub mod knowledge;
pub mod pose;
pub mod render;
pub mod session;
pub mod speech;
pub mod storage;
