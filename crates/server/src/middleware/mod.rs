//! HTTP middleware and extractors.

pub mod checkout;
pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
