//! Provider boundary that owns exactly one multiplexer per container.

use super::multiplexer::{MultiplexerHandle, VisibilityMultiplexer};
use crate::host::Surface;
use crate::model::{ElementId, ObservationPolicy, ScopeError};
use tracing::{debug, error, warn};

/// Lifecycle of a scope.
#[derive(Debug)]
enum ScopeState {
    /// Root not available yet; descendants must not render.
    Pending,
    /// Multiplexer constructed; descendants may render and register.
    Ready(VisibilityMultiplexer),
    /// Unmounted (or poisoned by a contract violation). Never ready again.
    Terminated,
}

/// Owns one [`VisibilityMultiplexer`] and gates descendant rendering on it.
///
/// Descendants receive the multiplexer through explicit injection of a
/// [`MultiplexerHandle`]; nesting is just holding several scopes, and a
/// descendant binds to whichever handle it is given (its nearest scope).
#[derive(Debug)]
pub struct MultiplexerScope {
    policy: ObservationPolicy,
    state: ScopeState,
}

impl MultiplexerScope {
    /// Create a pending scope with the given policy.
    pub fn new(policy: ObservationPolicy) -> Self {
        Self {
            policy,
            state: ScopeState::Pending,
        }
    }

    /// Root container became available: construct the multiplexer.
    ///
    /// If `surface` cannot back `root`, the multiplexer is inert.
    ///
    /// # Errors
    ///
    /// [`ScopeError::AlreadyMounted`] if this scope already constructed a
    /// multiplexer. The scope is terminated as a result.
    pub fn mount(
        &mut self,
        surface: &dyn Surface,
        root: ElementId,
    ) -> Result<MultiplexerHandle, ScopeError> {
        self.ensure_pending()?;
        let multiplexer = VisibilityMultiplexer::new(surface, root, self.policy.clone());
        if multiplexer.is_inert() {
            warn!(%root, "scope root has no backing surface; visibility tracking disabled");
        }
        Ok(self.install(multiplexer))
    }

    /// Mount in an environment with no rendering surface at all.
    ///
    /// Descendants render and register, but nothing ever becomes visible.
    ///
    /// # Errors
    ///
    /// Same as [`mount`](Self::mount).
    pub fn mount_without_surface(&mut self) -> Result<MultiplexerHandle, ScopeError> {
        self.ensure_pending()?;
        warn!("scope mounted without a rendering surface; visibility tracking disabled");
        Ok(self.install(VisibilityMultiplexer::inert(self.policy.clone())))
    }

    /// Terminate the multiplexer. Straggler handles become no-ops.
    pub fn unmount(&mut self) {
        if matches!(self.state, ScopeState::Ready(_)) {
            debug!("scope unmounted");
        }
        self.state = ScopeState::Terminated;
    }

    /// Handle for descendants, once ready.
    pub fn context(&self) -> Option<MultiplexerHandle> {
        self.multiplexer().map(VisibilityMultiplexer::handle)
    }

    /// Readiness gate: run `children` only once the multiplexer exists.
    pub fn render_children<R>(&self, children: impl FnOnce(&MultiplexerHandle) -> R) -> Option<R> {
        self.context().map(|handle| children(&handle))
    }

    /// The owned multiplexer, once ready.
    pub fn multiplexer(&self) -> Option<&VisibilityMultiplexer> {
        match &self.state {
            ScopeState::Ready(multiplexer) => Some(multiplexer),
            _ => None,
        }
    }

    /// Whether descendants may render.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ScopeState::Ready(_))
    }

    /// Whether the scope has unmounted or been poisoned.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ScopeState::Terminated)
    }

    /// Policy the multiplexer is (or will be) built with.
    pub fn policy(&self) -> &ObservationPolicy {
        &self.policy
    }

    fn ensure_pending(&mut self) -> Result<(), ScopeError> {
        if matches!(self.state, ScopeState::Pending) {
            return Ok(());
        }
        error!("scope asked to construct a second multiplexer; terminating scope");
        self.state = ScopeState::Terminated;
        Err(ScopeError::AlreadyMounted)
    }

    fn install(&mut self, multiplexer: VisibilityMultiplexer) -> MultiplexerHandle {
        let handle = multiplexer.handle();
        self.state = ScopeState::Ready(multiplexer);
        handle
    }
}

impl Default for MultiplexerScope {
    fn default() -> Self {
        Self::new(ObservationPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::VisibilityHook;
    use crate::test_harness::FakeSurface;

    fn el(index: u32) -> ElementId {
        ElementId::new(index, 0)
    }

    #[test]
    fn pending_scope_does_not_render_children() {
        let scope = MultiplexerScope::default();
        let rendered = scope.render_children(|_| ());
        assert!(rendered.is_none());
        assert!(scope.context().is_none());
    }

    #[test]
    fn mounted_scope_renders_children_with_handle() {
        let surface = FakeSurface::backed();
        let mut scope = MultiplexerScope::default();
        let handle = scope.mount(&surface, el(0)).unwrap();

        let same = scope.render_children(|h| h.same_multiplexer(&handle));
        assert_eq!(same, Some(true));
        assert!(scope.is_ready());
    }

    #[test]
    fn second_mount_is_fatal_to_scope() {
        let surface = FakeSurface::backed();
        let mut scope = MultiplexerScope::default();
        let handle = scope.mount(&surface, el(0)).unwrap();

        assert_eq!(scope.mount(&surface, el(0)).unwrap_err(), ScopeError::AlreadyMounted);
        assert!(scope.is_terminated());
        assert!(!handle.is_live());
        assert!(scope.render_children(|_| ()).is_none());
    }

    #[test]
    fn mount_after_unmount_is_refused() {
        let mut scope = MultiplexerScope::default();
        scope.mount_without_surface().unwrap();
        scope.unmount();
        assert!(scope.mount_without_surface().is_err());
    }

    #[test]
    fn unmount_turns_stragglers_into_noops() {
        let surface = FakeSurface::backed();
        let mut scope = MultiplexerScope::default();
        let handle = scope.mount(&surface, el(0)).unwrap();
        let hook = VisibilityHook::new(Some(&handle));
        hook.attach(Some(el(1)));

        scope.unmount();
        hook.attach(Some(el(2)));
        hook.attach(None);

        assert!(!hook.is_visible());
        assert_eq!(surface.calls(), vec!["observe #1v0", "disconnect"]);
    }

    #[test]
    fn unbacked_root_mounts_inert() {
        let surface = FakeSurface::default();
        let mut scope = MultiplexerScope::default();
        scope.mount(&surface, el(0)).unwrap();

        assert!(scope.is_ready());
        assert!(scope.multiplexer().is_some_and(VisibilityMultiplexer::is_inert));
    }

    #[test]
    fn nested_scopes_are_independent() {
        let outer_surface = FakeSurface::backed();
        let inner_surface = FakeSurface::backed();
        let mut outer = MultiplexerScope::default();
        let mut inner = MultiplexerScope::new(ObservationPolicy::new("0", [0.0, 1.0]).unwrap());
        let outer_handle = outer.mount(&outer_surface, el(0)).unwrap();
        let inner_handle = inner.mount(&inner_surface, el(1)).unwrap();

        let outer_hook = VisibilityHook::new(Some(&outer_handle));
        let inner_hook = VisibilityHook::new(Some(&inner_handle));
        outer_hook.attach(Some(el(2)));
        inner_hook.attach(Some(el(2)));

        inner_surface.cross(el(2), true, 1.0);

        assert!(inner_hook.is_visible());
        assert!(!outer_hook.is_visible());
        assert!(!outer_handle.same_multiplexer(&inner_handle));
    }
}
