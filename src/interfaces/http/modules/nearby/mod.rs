//! `POST /api/carpark/nearby`

pub mod assembler;
pub mod dto;
pub mod handlers;

pub use assembler::ResponseAssembler;
pub use handlers::{nearby_search, NearbyState, DEGRADED_HEADER};
