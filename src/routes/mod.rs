//! HTTP route definitions

pub mod download;
pub mod form;
pub mod health;
