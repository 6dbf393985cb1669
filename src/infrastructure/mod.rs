//! Infrastructure Layer - Cache persistence and remote service contracts

pub mod cache;
pub mod remote;
