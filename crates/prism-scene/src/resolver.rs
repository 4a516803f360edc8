//! Lazy, memoized resolution of document indices to live scene objects
//!
//! A request returns a shared future immediately. Pending requests are
//! fulfilled in one batch when the host is next pumped, so every caller
//! observes the same object. Resetting the resolver drops the senders of
//! unfulfilled requests, which then resolve to
//! [`ResolveError::AvatarReplaced`].

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use hecs::Entity;
use prism_core::PrismError;
use std::collections::HashMap;
use std::fmt;

/// Kind of document element a dependency refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Node,
    Mesh,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Mesh => write!(f, "mesh"),
        }
    }
}

/// A live scene object together with the avatar load that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiveObject {
    pub entity: Entity,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no avatar loaded")]
    NoAvatar,

    #[error("{kind} index {index} out of range")]
    OutOfRange { kind: DependencyKind, index: usize },

    #[error("avatar was replaced before the request resolved")]
    AvatarReplaced,
}

impl From<ResolveError> for PrismError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoAvatar => PrismError::NoAvatarLoaded,
            ResolveError::OutOfRange { kind, index } => PrismError::out_of_range(kind.to_string(), index),
            other => PrismError::ResolveError(other.to_string()),
        }
    }
}

pub type DependencyFuture = Shared<LocalBoxFuture<'static, Result<LiveObject, ResolveError>>>;

type Request = (DependencyKind, usize, oneshot::Sender<Result<LiveObject, ResolveError>>);

#[derive(Default)]
pub struct DependencyResolver {
    cache: HashMap<(DependencyKind, usize), DependencyFuture>,
    pending: Vec<Request>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Future for `(kind, index)`, created on first request
    pub fn request(&mut self, kind: DependencyKind, index: usize) -> DependencyFuture {
        if let Some(existing) = self.cache.get(&(kind, index)) {
            return existing.clone();
        }
        let (tx, rx) = oneshot::channel();
        self.pending.push((kind, index, tx));
        let fut = rx
            .map(|received| received.unwrap_or(Err(ResolveError::AvatarReplaced)))
            .boxed_local()
            .shared();
        self.cache.insert((kind, index), fut.clone());
        fut
    }

    /// A future that is already resolved to `err`, not memoized
    pub fn failed(err: ResolveError) -> DependencyFuture {
        future::ready(Err(err)).boxed_local().shared()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fulfil every pending request with `lookup`. Returns how many were sent.
    pub fn flush<F>(&mut self, mut lookup: F) -> usize
    where
        F: FnMut(DependencyKind, usize) -> Result<LiveObject, ResolveError>,
    {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for (kind, index, tx) in pending {
            // The receiver may already be gone; nobody is waiting then
            let _ = tx.send(lookup(kind, index));
        }
        count
    }

    /// Forget every request. Unfulfilled ones resolve to `AvatarReplaced`.
    pub fn reset(&mut self) {
        let dropped = self.pending.len();
        self.pending.clear();
        self.cache.clear();
        if dropped > 0 {
            log::debug!("cancelled {} pending dependency request(s)", dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn object(world: &mut hecs::World, generation: u64) -> LiveObject {
        LiveObject {
            entity: world.spawn(()),
            generation,
        }
    }

    #[test]
    fn test_requests_are_memoized() {
        let mut resolver = DependencyResolver::new();
        let a = resolver.request(DependencyKind::Node, 2);
        let b = resolver.request(DependencyKind::Node, 2);
        let c = resolver.request(DependencyKind::Mesh, 2);
        assert!(resolver.has_pending());

        let mut world = hecs::World::new();
        let node = object(&mut world, 1);
        let mesh = object(&mut world, 1);
        let sent = resolver.flush(|kind, _| match kind {
            DependencyKind::Node => Ok(node),
            DependencyKind::Mesh => Ok(mesh),
        });

        assert_eq!(sent, 2);
        assert!(!resolver.has_pending());
        assert_eq!(block_on(a), Ok(node));
        assert_eq!(block_on(b), Ok(node));
        assert_eq!(block_on(c), Ok(mesh));
    }

    #[test]
    fn test_reset_cancels_pending() {
        let mut resolver = DependencyResolver::new();
        let fut = resolver.request(DependencyKind::Mesh, 0);
        resolver.reset();
        assert!(!resolver.has_pending());
        assert_eq!(block_on(fut), Err(ResolveError::AvatarReplaced));

        // A new request after reset is a fresh future
        let again = resolver.request(DependencyKind::Mesh, 0);
        resolver.flush(|kind, index| Err(ResolveError::OutOfRange { kind, index }));
        assert_eq!(
            block_on(again),
            Err(ResolveError::OutOfRange {
                kind: DependencyKind::Mesh,
                index: 0
            })
        );
    }

    #[test]
    fn test_error_converts() {
        let err: PrismError = ResolveError::NoAvatar.into();
        assert!(matches!(err, PrismError::NoAvatarLoaded));
        let err: PrismError = ResolveError::OutOfRange {
            kind: DependencyKind::Node,
            index: 4,
        }
        .into();
        assert!(matches!(err, PrismError::IndexOutOfRange { index: 4, .. }));
    }
}
