use crate::error::{with_last_error_mut, AeroEvapError, AeroEvapErrorCode};
use std::ffi::CString;

/// Set the thread-local error message and code.
/// Accepts any type implementing the `AeroEvapError` trait.
pub(crate) fn set_last_error(error: &impl AeroEvapError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl AeroEvapError) -> AeroEvapErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = AeroEvapErrorCode::Ok;
    });
}

/// Record the outcome of an FFI body and return its code
pub(crate) fn handle_ffi_result<E>(f: impl FnOnce() -> Result<(), E>) -> AeroEvapErrorCode
where
    E: AeroEvapError,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            AeroEvapErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}
