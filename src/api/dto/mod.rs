//! Data Transfer Objects for REST request/response serialization.

pub mod display_dto;

pub use display_dto::*;
