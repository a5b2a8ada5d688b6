// Allow dead code for features under development
#![allow(dead_code)]

pub mod application;
pub mod domain;
pub mod host;
pub mod infrastructure;
