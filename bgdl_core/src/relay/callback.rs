/// Receiver side of the download-complete broadcast.
///
/// The relay calls `download_completed` with no payload: the signal means
/// "some previously requested download has finished", without identifying
/// which one. Invocation happens synchronously on whatever thread delivers
/// the broadcast; implementations that need to do real work should hand off
/// to their own executor.
pub trait CompletionCallback: Send + Sync + 'static {
    fn download_completed(&self);
}

/// Plain closures can be registered directly.
impl<F> CompletionCallback for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn download_completed(&self) {
        self()
    }
}
