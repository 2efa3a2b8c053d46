//! Fire-and-forget conversion requests.
//!
//! The sync controller never awaits a conversion. It hands a request and a
//! completion callback to a [`ConversionClient`] and carries on; the callback
//! runs later on the same thread. There is no retry and no cancellation of a
//! request once issued.

use std::rc::Rc;

use tracing::debug;

use super::types::{Point, TransformError, TransformRequest, TransformService};

/// Completion callback for a conversion request.
pub type ConversionCallback = Box<dyn FnOnce(Result<Point, TransformError>)>;

/// Issues conversion requests on behalf of the sync controller.
pub trait ConversionClient {
    /// Starts a conversion. `on_complete` is called exactly once with the
    /// outcome, possibly before this method returns.
    fn request(&self, request: TransformRequest, on_complete: ConversionCallback);
}

/// Runs a [`TransformService`] on the current thread's local task set.
///
/// Each request becomes one `tokio::task::spawn_local` task, so this client
/// must be used from within a [`tokio::task::LocalSet`].
pub struct SpawnedConversionClient<S> {
    service: Rc<S>,
}

impl<S> SpawnedConversionClient<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Rc::new(service),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: TransformService + 'static> ConversionClient for SpawnedConversionClient<S> {
    fn request(&self, request: TransformRequest, on_complete: ConversionCallback) {
        let service = Rc::clone(&self.service);
        debug!(
            direction = %request.direction,
            x = request.x,
            y = request.y,
            srs = %request.srs,
            "Dispatching conversion request"
        );

        tokio::task::spawn_local(async move {
            let result = service.transform(&request).await;
            on_complete(result);
        });
    }
}
