use std::cell::RefCell;
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across the FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait AeroEvapError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> AeroEvapErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `AeroEvapError` for the FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultAeroEvapError {
    code: AeroEvapErrorCode,
    msg: String,
}

impl DefaultAeroEvapError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: AeroEvapErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an invalid parameter.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter
    /// * `message` - A description of the validation error
    pub fn invalid_parameter(param_name: &str, message: &str) -> Self {
        Self {
            code: AeroEvapErrorCode::InvalidParameter,
            msg: format!("Parameter {param_name}: {message}"),
        }
    }
}

impl AeroEvapError for DefaultAeroEvapError {
    fn code(&self) -> AeroEvapErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by the evaporation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
///
/// Missing measurements and non-converging observations are not errors;
/// they are reported through `AeroEvapResult::status`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeroEvapErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Invalid parameter passed to function.
    InvalidParameter = 2,
}

impl fmt::Display for AeroEvapErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AeroEvapErrorCode::Ok => write!(f, "Ok"),
            AeroEvapErrorCode::NullPointer => write!(f, "Null pointer"),
            AeroEvapErrorCode::InvalidParameter => write!(f, "Invalid parameter"),
        }
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The `CString` is stored so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, AeroEvapErrorCode)> = const { RefCell::new((None, AeroEvapErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, AeroEvapErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, AeroEvapErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own
/// independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// AeroEvapResult result;
/// if (aeroevap_solve(wind, p, t_air, t_skin, rh, 2.0, 1800.0, NULL) != Ok) {
///     const char* error = aeroevap_get_last_error();
///     if (error) {
///         printf("aeroevap_solve failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn aeroevap_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `AeroEvapErrorCode::Ok` (0) if the last call on this thread
/// succeeded, otherwise the code it returned.
#[no_mangle]
pub extern "C" fn aeroevap_get_last_error_code() -> AeroEvapErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
