pub mod config;
pub mod dispatch;
pub mod evaluate;
pub mod report;
pub mod scan;
pub mod shared;
pub mod watch;
