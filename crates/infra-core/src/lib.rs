pub mod config;
pub mod logging;

pub mod archive;
pub mod chart;
pub mod checksum;
pub mod layout;
