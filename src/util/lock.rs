//! `.rl()`/`.wl()`/`.ml()` shortcuts for the `RwLock::read().unwrap()` and
//! `Mutex::lock().unwrap()` pattern, copied in spirit from the teacher
//! crate's `utils/other.rs::HandyRwLock` and generalized to also cover
//! `Mutex`, since the storage layer leans on both.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait HandyLock<T: ?Sized> {
    fn rl(&self) -> RwLockReadGuard<'_, T>;
    fn wl(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T: ?Sized> HandyLock<T> for RwLock<T> {
    fn rl(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|e| e.into_inner())
    }

    fn wl(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|e| e.into_inner())
    }
}

pub trait HandyMutex<T: ?Sized> {
    fn ml(&self) -> MutexGuard<'_, T>;
}

impl<T: ?Sized> HandyMutex<T> for Mutex<T> {
    fn ml(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
