//! Certificate decoding helpers for the pinning validator

pub mod parser;

pub use parser::{certificate_from_pem, certificates_from_pem, subject_common_name};
