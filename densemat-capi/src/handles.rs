//! Process-wide handle table
//!
//! A handle encodes `(generation << 32) | (slot + 1)`. Releasing a handle
//! empties its slot and bumps the slot's generation, so a released, stale or
//! foreign token never resolves to a live matrix. A slot whose generation
//! reaches `u32::MAX` is never handed out again.
//!
//! The table lock is only held to look up, insert or release slots. Kernels
//! run under the per-matrix lock, so distinct handles proceed concurrently.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use densemat_rust::{DoubleMatrix, MatrixError, Result};
use once_cell::sync::Lazy;

use crate::types::dmat_handle;

type SharedMatrix = Arc<RwLock<DoubleMatrix>>;

#[derive(Default)]
struct Slot {
    generation: u32,
    matrix: Option<SharedMatrix>,
}

#[derive(Default)]
struct HandleTable {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

static HANDLES: Lazy<RwLock<HandleTable>> = Lazy::new(|| RwLock::new(HandleTable::default()));

fn encode(slot: usize, generation: u32) -> dmat_handle {
    ((generation as u64) << 32) | (slot as u64 + 1)
}

fn decode(handle: dmat_handle) -> Option<(usize, u32)> {
    let index = handle & 0xffff_ffff;
    if index == 0 {
        return None;
    }
    Some(((index - 1) as usize, (handle >> 32) as u32))
}

fn invalid(handle: dmat_handle) -> MatrixError {
    MatrixError::InvalidHandle { handle }
}

impl HandleTable {
    fn lookup(&self, handle: dmat_handle) -> Result<&SharedMatrix> {
        let (slot, generation) = decode(handle).ok_or_else(|| invalid(handle))?;
        match self.slots.get(slot) {
            Some(Slot {
                generation: current,
                matrix: Some(matrix),
            }) if *current == generation => Ok(matrix),
            _ => Err(invalid(handle)),
        }
    }

    fn insert(&mut self, matrix: SharedMatrix) -> Result<dmat_handle> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                if self.slots.len() >= u32::MAX as usize {
                    return Err(MatrixError::allocation("handle table is full"));
                }
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        self.slots[slot].matrix = Some(matrix);
        Ok(encode(slot, self.slots[slot].generation))
    }

    /// Empty the slot behind `handle`; a slot whose generation is spent is
    /// retired instead of reused
    fn release(&mut self, handle: dmat_handle) -> Result<()> {
        self.lookup(handle)?;
        let Some((slot, _)) = decode(handle) else {
            return Err(invalid(handle));
        };
        let entry = &mut self.slots[slot];
        entry.matrix = None;
        match entry.generation.checked_add(1) {
            Some(next) => {
                entry.generation = next;
                self.free.push(slot);
            }
            None => tracing::debug!(slot, "handle slot retired"),
        }
        Ok(())
    }
}

fn table_read() -> RwLockReadGuard<'static, HandleTable> {
    HANDLES.read().unwrap_or_else(|e| e.into_inner())
}

fn table_write() -> RwLockWriteGuard<'static, HandleTable> {
    HANDLES.write().unwrap_or_else(|e| e.into_inner())
}

fn read(matrix: &SharedMatrix) -> RwLockReadGuard<'_, DoubleMatrix> {
    matrix.read().unwrap_or_else(|e| e.into_inner())
}

fn write(matrix: &SharedMatrix) -> RwLockWriteGuard<'_, DoubleMatrix> {
    matrix.write().unwrap_or_else(|e| e.into_inner())
}

/// Take ownership of `matrix` and return its new handle
pub(crate) fn insert(matrix: DoubleMatrix) -> Result<dmat_handle> {
    let (rows, cols) = matrix.shape();
    let handle = table_write().insert(Arc::new(RwLock::new(matrix)))?;
    tracing::debug!(handle, rows, cols, "matrix allocated");
    Ok(handle)
}

/// Release `handle`; fails for null, stale and already released handles
pub(crate) fn release(handle: dmat_handle) -> Result<()> {
    table_write().release(handle)?;
    tracing::debug!(handle, "matrix released");
    Ok(())
}

pub(crate) fn is_valid(handle: dmat_handle) -> bool {
    table_read().lookup(handle).is_ok()
}

fn get(handle: dmat_handle) -> Result<SharedMatrix> {
    table_read().lookup(handle).cloned()
}

/// Run `f` on the matrix behind `handle`
pub(crate) fn with_matrix<T>(
    handle: dmat_handle,
    f: impl FnOnce(&DoubleMatrix) -> Result<T>,
) -> Result<T> {
    let matrix = get(handle)?;
    let guard = read(&matrix);
    f(&guard)
}

/// Run `f` on the matrix behind `handle` with write access
pub(crate) fn with_matrix_mut<T>(
    handle: dmat_handle,
    f: impl FnOnce(&mut DoubleMatrix) -> Result<T>,
) -> Result<T> {
    let matrix = get(handle)?;
    let mut guard = write(&matrix);
    f(&mut guard)
}

/// Run `f` on two matrices; the same handle may be passed twice
pub(crate) fn with_pair<T>(
    lhs: dmat_handle,
    rhs: dmat_handle,
    f: impl FnOnce(&DoubleMatrix, &DoubleMatrix) -> Result<T>,
) -> Result<T> {
    let a = get(lhs)?;
    let b = get(rhs)?;
    if Arc::ptr_eq(&a, &b) {
        let guard = read(&a);
        return f(&guard, &guard);
    }
    // Locks are always taken in handle order.
    if lhs < rhs {
        let ga = read(&a);
        let gb = read(&b);
        f(&ga, &gb)
    } else {
        let gb = read(&b);
        let ga = read(&a);
        f(&ga, &gb)
    }
}

/// Run `f` on a receiver with write access and an operand
///
/// When both handles are the same, the operand is a snapshot of the receiver
/// taken before `f` runs.
pub(crate) fn with_pair_mut<T>(
    target: dmat_handle,
    operand: dmat_handle,
    f: impl FnOnce(&mut DoubleMatrix, &DoubleMatrix) -> Result<T>,
) -> Result<T> {
    let a = get(target)?;
    let b = get(operand)?;
    if Arc::ptr_eq(&a, &b) {
        let mut guard = write(&a);
        let snapshot = guard.try_clone()?;
        return f(&mut guard, &snapshot);
    }
    if target < operand {
        let mut ga = write(&a);
        let gb = read(&b);
        f(&mut ga, &gb)
    } else {
        let gb = read(&b);
        let mut ga = write(&a);
        f(&mut ga, &gb)
    }
}
