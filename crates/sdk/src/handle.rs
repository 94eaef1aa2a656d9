// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Opaque handles carrying Rust objects through the host ABI
//!
//! The host only stores raw addresses. Each object handed over is registered under a fresh
//! token; the token, cast to a pointer, is what the host sees. The object stays alive until
//! the host calls [`destroy_handle`], which is the only release path for handles given to
//! the host.

use std::{
	any::Any,
	ffi::c_void,
	panic::{AssertUnwindSafe, catch_unwind},
	process::abort,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{error, trace};

use crate::error::{Error, Result};

type Pinned = Arc<dyn Any + Send + Sync>;

struct HandleRegistry {
	next: AtomicUsize,
	objects: DashMap<usize, Pinned>,
}

static REGISTRY: Lazy<HandleRegistry> = Lazy::new(|| HandleRegistry {
	next: AtomicUsize::new(1),
	objects: DashMap::new(),
});

/// Pin `object` and return a stable, non-null address for it
pub fn to_handle<T: Any + Send + Sync>(object: T) -> *mut c_void {
	let token = REGISTRY.next.fetch_add(1, Ordering::Relaxed);
	REGISTRY.objects.insert(token, Arc::new(object));
	trace!(token, "handle pinned");
	token as *mut c_void
}

/// Resolve a handle without releasing it
pub fn from_handle<T: Any + Send + Sync>(handle: *mut c_void) -> Result<Arc<T>> {
	let token = handle as usize;
	let pinned = REGISTRY.objects.get(&token).map(|entry| Arc::clone(entry.value())).ok_or(Error::InvalidHandle(token))?;
	pinned.downcast::<T>().map_err(|_| Error::InvalidHandle(token))
}

/// Unpin the object behind `handle`; the address is invalid afterwards
///
/// Returns `false` if the handle was unknown. The object is dropped once the last
/// outstanding [`from_handle`] reference goes away.
pub fn release_handle(handle: *mut c_void) -> bool {
	let token = handle as usize;
	let released = REGISTRY.objects.remove(&token).is_some();
	trace!(token, released, "handle released");
	released
}

/// Check whether `handle` still pins an object
pub fn is_live(handle: *mut c_void) -> bool {
	REGISTRY.objects.contains_key(&(handle as usize))
}

/// Number of objects currently pinned
pub fn live_handles() -> usize {
	REGISTRY.objects.len()
}

/// Destructor the host calls when it drops extra info or bind data
pub extern "C" fn destroy_handle(handle: *mut c_void) {
	if handle.is_null() {
		return;
	}

	let result = catch_unwind(AssertUnwindSafe(|| release_handle(handle)));

	match result {
		Ok(true) => {}
		Ok(false) => error!(token = handle as usize, "destroy called for unknown handle"),
		Err(e) => {
			error!(?e, "Panic in destroy_handle - aborting");
			abort();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::*;

	#[test]
	fn test_round_trip() {
		let handle = to_handle(String::from("extra info"));
		assert!(!handle.is_null());
		assert_eq!(*from_handle::<String>(handle).unwrap(), "extra info");
		assert_eq!(*from_handle::<String>(handle).unwrap(), "extra info");
		assert!(release_handle(handle));
	}

	#[test]
	fn test_distinct_addresses() {
		let a = to_handle(1u32);
		let b = to_handle(1u32);
		assert_ne!(a, b);
		release_handle(a);
		release_handle(b);
	}

	#[test]
	fn test_wrong_type() {
		let handle = to_handle(42u64);
		assert!(matches!(from_handle::<String>(handle), Err(Error::InvalidHandle(_))));
		release_handle(handle);
	}

	#[test]
	fn test_released_handle_is_invalid() {
		let handle = to_handle(7i32);
		assert!(release_handle(handle));
		assert!(!release_handle(handle));
		assert!(matches!(from_handle::<i32>(handle), Err(Error::InvalidHandle(_))));
	}

	#[test]
	fn test_destroy_drops_object() {
		struct Flag(Arc<AtomicBool>);

		impl Drop for Flag {
			fn drop(&mut self) {
				self.0.store(true, Ordering::SeqCst);
			}
		}

		let dropped = Arc::new(AtomicBool::new(false));
		let handle = to_handle(Flag(dropped.clone()));

		let resolved = from_handle::<Flag>(handle).unwrap();
		destroy_handle(handle);
		assert!(!dropped.load(Ordering::SeqCst));

		drop(resolved);
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn test_destroy_null_is_noop() {
		destroy_handle(std::ptr::null_mut());
	}
}
