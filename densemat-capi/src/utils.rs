//! Boundary helpers: panic capture, error conversion and handle publishing

use std::any::Any;
use std::ffi::CString;
use std::panic::{AssertUnwindSafe, catch_unwind};

use densemat_rust::{DoubleMatrix, ErrorKind, MatrixError, Result, SvdResult};
use libc::{c_char, c_int};

use crate::handles;
use crate::types::{dmat_ptr_result, dmat_scalar_result, dmat_svd_result, dmat_void_result};
use crate::{
    DMAT_ALLOCATION_ERROR, DMAT_ARITHMETIC_ERROR, DMAT_CONVERGENCE_ERROR, DMAT_DIMENSION_ERROR,
    DMAT_INTERNAL_ERROR, DMAT_INVALID_ARGUMENT, DMAT_INVALID_HANDLE, StatusCode,
};

/// A failed call: status code plus message
#[derive(Debug)]
pub(crate) struct Failure {
    pub status: StatusCode,
    pub message: String,
}

impl Failure {
    /// Hand the message to C; released by `matrix_error_free`
    pub(crate) fn into_c_string(self) -> *mut c_char {
        to_c_string(self.message)
    }
}

pub(crate) fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Dimension => DMAT_DIMENSION_ERROR,
        ErrorKind::Allocation => DMAT_ALLOCATION_ERROR,
        ErrorKind::Arithmetic => DMAT_ARITHMETIC_ERROR,
        ErrorKind::Convergence => DMAT_CONVERGENCE_ERROR,
        ErrorKind::InvalidHandle => DMAT_INVALID_HANDLE,
        ErrorKind::InvalidArgument => DMAT_INVALID_ARGUMENT,
    }
}

/// Owned C string; interior NUL bytes are replaced
pub(crate) fn to_c_string(message: String) -> *mut c_char {
    let c_string = CString::new(message)
        .unwrap_or_else(|e| {
            let bytes: Vec<u8> = e.into_vec().into_iter().filter(|&b| b != 0).collect();
            CString::new(bytes).unwrap_or_default()
        });
    c_string.into_raw()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, converting errors and panics into a [`Failure`]
pub(crate) fn run<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> std::result::Result<T, Failure> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::warn!(op, error = %err, "call failed");
            Err(Failure {
                status: status_of(err.kind()),
                message: err.to_string(),
            })
        }
        Err(payload) => {
            let message = panic_message(payload);
            tracing::warn!(op, panic = %message, "panic caught at the C boundary");
            Err(Failure {
                status: DMAT_INTERNAL_ERROR,
                message: format!("internal error: {}", message),
            })
        }
    }
}

/// Publish the matrix produced by `f` under a new handle
pub(crate) fn try_ptr(op: &'static str, f: impl FnOnce() -> Result<DoubleMatrix>) -> dmat_ptr_result {
    match run(op, || handles::insert(f()?)) {
        Ok(handle) => dmat_ptr_result::ok(handle),
        Err(failure) => dmat_ptr_result::failure(failure),
    }
}

pub(crate) fn try_void(op: &'static str, f: impl FnOnce() -> Result<()>) -> dmat_void_result {
    match run(op, f) {
        Ok(()) => dmat_void_result::ok(),
        Err(failure) => dmat_void_result::failure(failure),
    }
}

pub(crate) fn try_scalar(op: &'static str, f: impl FnOnce() -> Result<f64>) -> dmat_scalar_result {
    match run(op, f) {
        Ok(value) => dmat_scalar_result::ok(value),
        Err(failure) => dmat_scalar_result::failure(failure),
    }
}

/// Publish all three factors, or none of them
pub(crate) fn try_svd(op: &'static str, f: impl FnOnce() -> Result<SvdResult>) -> dmat_svd_result {
    let publish = || {
        let SvdResult { u, s, v } = f()?;
        let u = handles::insert(u)?;
        let s = handles::insert(s).inspect_err(|_| {
            let _ = handles::release(u);
        })?;
        let v = handles::insert(v).inspect_err(|_| {
            let _ = handles::release(u);
            let _ = handles::release(s);
        })?;
        Ok((u, s, v))
    };
    match run(op, publish) {
        Ok((u, s, v)) => dmat_svd_result::ok(u, s, v),
        Err(failure) => dmat_svd_result::failure(failure),
    }
}

/// Convert a C dimension or index into `usize`
pub(crate) fn to_usize(value: c_int, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| MatrixError::dimension(format!("{} must be non-negative, got {}", what, value)))
}

/// Convert an extent into `c_int`, saturating
pub(crate) fn to_c_int(value: usize) -> c_int {
    c_int::try_from(value).unwrap_or(c_int::MAX)
}
