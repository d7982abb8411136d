//! Vehicle orchestration

pub mod dispatch;
pub mod ports;
pub mod service;
mod session;
