use std::sync::{Arc, PoisonError, RwLock};

/// Bearer token sent with catalog and comment reads.
///
/// Holds the signed-in user's JWT, or nothing for anonymous browsing (the
/// client then falls back to the configured API token). Clones share the
/// same slot, so a feed source and the service that owns it stay in step.
#[derive(Clone, Default)]
pub struct ViewerToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl ViewerToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let viewer = ViewerToken::new();
        let source_side = viewer.clone();
        assert_eq!(source_side.get(), None);

        viewer.set(Some("jwt".into()));
        assert_eq!(source_side.get().as_deref(), Some("jwt"));

        viewer.set(None);
        assert_eq!(source_side.get(), None);
    }
}
