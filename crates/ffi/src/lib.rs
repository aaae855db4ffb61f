//! C ABI for the open-water evaporation solver
//!
//! All functions return an [`AeroEvapErrorCode`]; the message of the last
//! failure on the calling thread is available from
//! [`aeroevap_get_last_error`]. The header `AeroEvapFFI.h` is generated by
//! `build.rs`.

mod error;
mod helpers;
mod solve;

pub use error::{aeroevap_get_last_error, aeroevap_get_last_error_code, AeroEvapErrorCode};
pub use solve::{
    aeroevap_solve, aeroevap_solve_batch, AeroEvapObservation, AeroEvapResult, AeroEvapStatus,
};
