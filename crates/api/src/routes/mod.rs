//! HTTP Routes

pub mod form;
pub mod prometheus;
pub mod predict;
