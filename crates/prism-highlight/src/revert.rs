//! Highlight lifecycle and the handle that undoes it

use crate::mutation::MutationSet;
use prism_core::{PrismError, Result};
use prism_scene::WeakSceneHost;
use std::cell::RefCell;
use std::rc::Rc;

/// Where a highlight is in its lifecycle.
///
/// `Resolving -> Applied -> Reverted`, or `Resolving -> Reverted` when
/// cancelled before resolution. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    Resolving,
    Applied,
    Failed,
    Reverted,
}

#[derive(Debug)]
struct Lifecycle {
    state: HighlightState,
    mutations: Option<MutationSet>,
    error: Option<Rc<PrismError>>,
}

/// Undo handle returned by a highlight.
///
/// Clones share one lifecycle. [`RevertHandle::revert`] is idempotent, and
/// a revert issued while the highlight is still resolving prevents it from
/// ever being applied.
#[derive(Clone)]
pub struct RevertHandle {
    path: Rc<str>,
    host: WeakSceneHost,
    lifecycle: Rc<RefCell<Lifecycle>>,
}

impl std::fmt::Debug for RevertHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevertHandle")
            .field("path", &self.path)
            .field("state", &self.state())
            .finish()
    }
}

impl RevertHandle {
    pub(crate) fn resolving(path: &str, host: WeakSceneHost) -> Self {
        Self {
            path: Rc::from(path),
            host,
            lifecycle: Rc::new(RefCell::new(Lifecycle {
                state: HighlightState::Resolving,
                mutations: None,
                error: None,
            })),
        }
    }

    pub(crate) fn applied(path: &str, host: WeakSceneHost, mutations: MutationSet) -> Self {
        let handle = Self::resolving(path, host);
        {
            let mut lifecycle = handle.lifecycle.borrow_mut();
            lifecycle.state = HighlightState::Applied;
            lifecycle.mutations = Some(mutations);
        }
        handle
    }

    /// Apply the highlight with `apply` unless it was reverted meanwhile.
    ///
    /// The lifecycle is checked right before `apply` runs, so a cancelled
    /// highlight never touches the scene.
    pub(crate) fn complete<F>(&self, apply: F)
    where
        F: FnOnce() -> Result<MutationSet>,
    {
        if self.state() != HighlightState::Resolving {
            log::debug!("highlight of {} cancelled before it resolved", self.path);
            return;
        }
        let outcome = apply();
        let mut lifecycle = self.lifecycle.borrow_mut();
        match outcome {
            Ok(mutations) => {
                log::debug!("highlighted {} ({} mutation(s))", self.path, mutations.len());
                lifecycle.state = HighlightState::Applied;
                lifecycle.mutations = Some(mutations);
            }
            Err(e) => {
                log::warn!("failed to highlight {}: {}", self.path, e);
                lifecycle.state = HighlightState::Failed;
                lifecycle.error = Some(Rc::new(e));
            }
        }
    }

    /// Path this handle highlights
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> HighlightState {
        self.lifecycle.borrow().state
    }

    pub fn is_applied(&self) -> bool {
        self.state() == HighlightState::Applied
    }

    /// Why the highlight failed, if it did
    pub fn error(&self) -> Option<Rc<PrismError>> {
        self.lifecycle.borrow().error.clone()
    }

    /// Undo the highlight. Calling it again does nothing.
    pub fn revert(&self) {
        let mutations = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            let previous = std::mem::replace(&mut lifecycle.state, HighlightState::Reverted);
            match previous {
                HighlightState::Resolving => {
                    log::debug!("cancelled highlight of {}", self.path);
                    None
                }
                HighlightState::Applied => lifecycle.mutations.take(),
                HighlightState::Failed => {
                    lifecycle.state = HighlightState::Failed;
                    None
                }
                HighlightState::Reverted => None,
            }
        };

        let Some(mutations) = mutations else {
            return;
        };
        match self.host.upgrade() {
            Some(host) => {
                log::debug!("reverting highlight of {}", self.path);
                mutations.undo(&mut host.state_mut());
            }
            None => log::debug!("scene host is gone; nothing to revert for {}", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::PrismConfig;
    use prism_scene::SceneHost;

    #[test]
    fn test_cancel_before_complete_skips_apply() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let handle = RevertHandle::resolving("/nodes/0", host.downgrade());

        handle.revert();
        let mut ran = false;
        handle.complete(|| {
            ran = true;
            Ok(MutationSet::new(1))
        });

        assert!(!ran);
        assert_eq!(handle.state(), HighlightState::Reverted);
    }

    #[test]
    fn test_failure_is_recorded() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let handle = RevertHandle::resolving("/nodes/0", host.downgrade());

        handle.complete(|| Err(PrismError::NoAvatarLoaded));

        assert_eq!(handle.state(), HighlightState::Failed);
        assert!(matches!(
            handle.error().as_deref(),
            Some(PrismError::NoAvatarLoaded)
        ));
        handle.revert();
        assert_eq!(handle.state(), HighlightState::Failed);
    }

    #[test]
    fn test_clones_share_lifecycle() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let handle = RevertHandle::applied("/nodes/0", host.downgrade(), MutationSet::new(1));
        let other = handle.clone();

        other.revert();
        assert_eq!(handle.state(), HighlightState::Reverted);
        handle.revert();
        assert_eq!(other.state(), HighlightState::Reverted);
    }
}
