//! Macros generating families of C entry points

/// Generate handle lifecycle functions: dealloc, clone, is_valid
///
/// # Generated functions
/// - `<name>_dealloc()` - Releases the handle
/// - `<name>_clone()` - Deep copy under a new handle
/// - `<name>_is_valid()` - 1 if the handle resolves to a live matrix
///
/// # Example
/// ```ignore
/// impl_handle_lifecycle!(matrix);
/// ```
macro_rules! impl_handle_lifecycle {
    ($name:ident) => {
        paste::paste! {
            /// Release a matrix handle
            ///
            /// # Returns
            /// `DMAT_INVALID_HANDLE` for null, stale and already released handles.
            #[unsafe(no_mangle)]
            pub extern "C" fn [<$name _dealloc>](
                handle: $crate::types::dmat_handle,
            ) -> $crate::types::dmat_void_result {
                $crate::utils::try_void(concat!(stringify!($name), "_dealloc"), || {
                    $crate::handles::release(handle)
                })
            }

            /// Deep copy of a matrix under a new handle
            #[unsafe(no_mangle)]
            pub extern "C" fn [<$name _clone>](
                handle: $crate::types::dmat_handle,
            ) -> $crate::types::dmat_ptr_result {
                $crate::utils::try_ptr(concat!(stringify!($name), "_clone"), || {
                    $crate::handles::with_matrix(handle, |m| m.try_clone())
                })
            }

            /// Check whether a handle resolves to a live matrix
            ///
            /// # Returns
            /// 1 if the handle is valid, 0 otherwise
            #[unsafe(no_mangle)]
            pub extern "C" fn [<$name _is_valid>](handle: $crate::types::dmat_handle) -> libc::c_int {
                std::panic::catch_unwind(|| $crate::handles::is_valid(handle) as libc::c_int)
                    .unwrap_or(0)
            }
        }
    };
}

/// Generate the four entry points of an elementwise operation
///
/// For `impl_elementwise_ops!(add)`:
/// - `matrix_add_scalar(h, x)` / `matrix_add_matrix(h, o)` return a new handle
/// - `matrix_add_in_place_scalar(h, x)` / `matrix_add_in_place_matrix(h, o)`
///   update `h`
macro_rules! impl_elementwise_ops {
    ($op:ident) => {
        paste::paste! {
            #[unsafe(no_mangle)]
            pub extern "C" fn [<matrix_ $op _scalar>](
                handle: $crate::types::dmat_handle,
                value: libc::c_double,
            ) -> $crate::types::dmat_ptr_result {
                $crate::utils::try_ptr(concat!("matrix_", stringify!($op), "_scalar"), || {
                    $crate::handles::with_matrix(handle, |m| m.[<$op _scalar>](value))
                })
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn [<matrix_ $op _matrix>](
                handle: $crate::types::dmat_handle,
                other: $crate::types::dmat_handle,
            ) -> $crate::types::dmat_ptr_result {
                $crate::utils::try_ptr(concat!("matrix_", stringify!($op), "_matrix"), || {
                    $crate::handles::with_pair(handle, other, |a, b| a.[<$op _matrix>](b))
                })
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn [<matrix_ $op _in_place_scalar>](
                handle: $crate::types::dmat_handle,
                value: libc::c_double,
            ) -> $crate::types::dmat_void_result {
                $crate::utils::try_void(concat!("matrix_", stringify!($op), "_in_place_scalar"), || {
                    $crate::handles::with_matrix_mut(handle, |m| {
                        m.[<$op _scalar_mut>](value);
                        Ok(())
                    })
                })
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn [<matrix_ $op _in_place_matrix>](
                handle: $crate::types::dmat_handle,
                other: $crate::types::dmat_handle,
            ) -> $crate::types::dmat_void_result {
                $crate::utils::try_void(concat!("matrix_", stringify!($op), "_in_place_matrix"), || {
                    $crate::handles::with_pair_mut(handle, other, |a, b| a.[<$op _matrix_mut>](b))
                })
            }
        }
    };
}

/// Generate `matrix_<name>(h)` entry points for unary kernels returning a new
/// matrix
macro_rules! impl_matrix_unary {
    ($($name:ident => $body:expr),* $(,)?) => {
        paste::paste! {
            $(
                #[unsafe(no_mangle)]
                pub extern "C" fn [<matrix_ $name>](
                    handle: $crate::types::dmat_handle,
                ) -> $crate::types::dmat_ptr_result {
                    $crate::utils::try_ptr(concat!("matrix_", stringify!($name)), || {
                        $crate::handles::with_matrix(handle, $body)
                    })
                }
            )*
        }
    };
}

/// Generate `matrix_<name>(h)` entry points for scalar reductions, calling
/// the `DoubleMatrix` method of the same name
macro_rules! impl_scalar_reductions {
    ($($name:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[unsafe(no_mangle)]
                pub extern "C" fn [<matrix_ $name>](
                    handle: $crate::types::dmat_handle,
                ) -> $crate::types::dmat_scalar_result {
                    $crate::utils::try_scalar(concat!("matrix_", stringify!($name)), || {
                        $crate::handles::with_matrix(handle, |m| Ok(m.$name()))
                    })
                }
            )*
        }
    };
}
