//! The availability engine: interval algebra, schedule resolution,
//! conflict detection, and the cached calendar façade. The pure pieces
//! (`interval`, `resolver`, `conflict`) never touch the store; `service`
//! wires them to the repositories.

pub mod cache;
pub mod conflict;
pub mod interval;
pub mod resolver;
pub mod service;
