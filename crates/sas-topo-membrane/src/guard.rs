//! Scoped acquisition for opaque external handles (HBA library handles, SMP
//! target handles). Every exit path — success, early return, or a `?`
//! propagated error — releases the handle exactly once via `Drop`.

/// Wraps a resource of type `T` together with the closure that releases it.
///
/// Enumeration never holds one of these across more than a single
/// discovery call: `sas-topo-discover`'s HBA and SMP walkers each open a
/// `ScopedResource`, use it, and let it drop at the end of the scope,
/// matching the synchronous single-threaded contract in the resource model.
pub struct ScopedResource<'a, T> {
    resource: Option<T>,
    release: Box<dyn FnMut(T) + 'a>,
}

impl<'a, T> ScopedResource<'a, T> {
    /// `release` may borrow from the caller's stack frame (e.g. an `&dyn
    /// HbaLibrary` or `&dyn SmpTransport` collaborator) for the lifetime
    /// `'a` of the guard — it does not need to be `'static`, since the
    /// guard itself never outlives the discovery call that owns it.
    pub fn new(resource: T, release: impl FnMut(T) + 'a) -> Self {
        Self {
            resource: Some(resource),
            release: Box::new(release),
        }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        self.resource
            .as_ref()
            .expect("resource accessed after release")
    }

    #[must_use]
    pub fn get_mut(&mut self) -> &mut T {
        self.resource
            .as_mut()
            .expect("resource accessed after release")
    }

    /// Releases the resource early, before the guard goes out of scope.
    /// Safe to call at most once; a later `Drop` becomes a no-op.
    pub fn release_now(&mut self) {
        if let Some(resource) = self.resource.take() {
            (self.release)(resource);
        }
    }
}

impl<'a, T> Drop for ScopedResource<'a, T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            (self.release)(resource);
        }
    }
}
