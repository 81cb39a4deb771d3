//! C-compatible result types
//!
//! Every fallible entry point returns one of the tagged structs below. The
//! `status` field is the discriminant: on `DMAT_SUCCESS` the payload fields are
//! set and `err` is null; on failure the payload is zeroed and `err` owns a
//! NUL-terminated message that must be released with `matrix_error_free`.
//!
//! Note: the lowercase names are part of the C ABI.

#![allow(non_camel_case_types)]

use libc::{c_char, c_double, size_t};

use crate::utils::Failure;
use crate::{DMAT_SUCCESS, StatusCode};

/// Opaque matrix handle
///
/// Handles are tokens into the engine's handle table, never pointers. `0` is
/// the null handle and is never returned by a successful call.
pub type dmat_handle = u64;

/// The null handle
pub const DMAT_NULL_HANDLE: dmat_handle = 0;

/// Result of an operation producing a new matrix
#[repr(C)]
#[derive(Debug)]
pub struct dmat_ptr_result {
    pub handle: dmat_handle,
    pub status: StatusCode,
    pub err: *mut c_char,
}

/// Result of an operation without payload (in-place updates, release)
#[repr(C)]
#[derive(Debug)]
pub struct dmat_void_result {
    pub status: StatusCode,
    pub err: *mut c_char,
}

/// Result of a scalar reduction
#[repr(C)]
#[derive(Debug)]
pub struct dmat_scalar_result {
    pub value: c_double,
    pub status: StatusCode,
    pub err: *mut c_char,
}

/// Result of a singular value decomposition
///
/// On success all three handles are set; on failure none are.
#[repr(C)]
#[derive(Debug)]
pub struct dmat_svd_result {
    pub u: dmat_handle,
    pub s: dmat_handle,
    pub v: dmat_handle,
    pub status: StatusCode,
    pub err: *mut c_char,
}

/// Owned row-major copy of a matrix' elements
///
/// Release with `matrix_double_array_free`. `data` is null when `len` is 0.
#[repr(C)]
#[derive(Debug)]
pub struct dmat_double_array {
    pub len: size_t,
    pub data: *mut c_double,
}

impl dmat_ptr_result {
    pub(crate) fn ok(handle: dmat_handle) -> Self {
        Self {
            handle,
            status: DMAT_SUCCESS,
            err: std::ptr::null_mut(),
        }
    }

    pub(crate) fn failure(failure: Failure) -> Self {
        Self {
            handle: DMAT_NULL_HANDLE,
            status: failure.status,
            err: failure.into_c_string(),
        }
    }
}

impl dmat_void_result {
    pub(crate) fn ok() -> Self {
        Self {
            status: DMAT_SUCCESS,
            err: std::ptr::null_mut(),
        }
    }

    pub(crate) fn failure(failure: Failure) -> Self {
        Self {
            status: failure.status,
            err: failure.into_c_string(),
        }
    }
}

impl dmat_scalar_result {
    pub(crate) fn ok(value: f64) -> Self {
        Self {
            value,
            status: DMAT_SUCCESS,
            err: std::ptr::null_mut(),
        }
    }

    pub(crate) fn failure(failure: Failure) -> Self {
        Self {
            value: f64::NAN,
            status: failure.status,
            err: failure.into_c_string(),
        }
    }
}

impl dmat_svd_result {
    pub(crate) fn ok(u: dmat_handle, s: dmat_handle, v: dmat_handle) -> Self {
        Self {
            u,
            s,
            v,
            status: DMAT_SUCCESS,
            err: std::ptr::null_mut(),
        }
    }

    pub(crate) fn failure(failure: Failure) -> Self {
        Self {
            u: DMAT_NULL_HANDLE,
            s: DMAT_NULL_HANDLE,
            v: DMAT_NULL_HANDLE,
            status: failure.status,
            err: failure.into_c_string(),
        }
    }
}

impl dmat_double_array {
    pub(crate) fn empty() -> Self {
        Self {
            len: 0,
            data: std::ptr::null_mut(),
        }
    }

    pub(crate) fn from_slice(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        let boxed: Box<[f64]> = values.into();
        let len = boxed.len();
        Self {
            len,
            data: Box::into_raw(boxed) as *mut c_double,
        }
    }
}
