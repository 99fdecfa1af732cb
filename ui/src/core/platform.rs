//! Platform glue shared by the web and desktop builds.

use once_cell::sync::OnceCell;
use time::UtcOffset;

static LOCAL_OFFSET: OnceCell<UtcOffset> = OnceCell::new();

/// Let the event loop run pending work (rendering, input) before continuing.
pub async fn yield_now() {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(0).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::task::yield_now().await;
    }
}

/// Viewer's UTC offset, used for every displayed or exported timestamp.
///
/// Resolved once. On Unix the offset can only be read while the process is
/// single-threaded, so native launchers call this before starting the
/// runtime; if that did not happen the offset falls back to UTC.
pub fn local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| {
        UtcOffset::current_local_offset().unwrap_or_else(|err| {
            tracing::warn!(%err, "local UTC offset unavailable; showing times in UTC");
            UtcOffset::UTC
        })
    })
}
