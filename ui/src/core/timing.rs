//! Sleep and timeout utilities that work on both the browser and native runtimes.

use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};

pub async fn sleep_ms(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    {
        let ms = u32::try_from(ms).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Marker error returned when [`with_timeout`] gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Race `future` against a timer. The losing side is dropped.
pub async fn with_timeout<F>(limit: Duration, future: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    let millis = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
    let timer = Box::pin(sleep_ms(millis));
    let work = Box::pin(future);

    match select(work, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed(limit)),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn stalled_futures_give_up_after_the_limit() {
        let limit = Duration::from_millis(20);
        let result = block_on(with_timeout(limit, futures::future::pending::<()>()));
        assert_eq!(result, Err(Elapsed(limit)));
    }

    #[test]
    fn ready_futures_win_the_race() {
        let result = block_on(with_timeout(Duration::from_secs(5), async { 7 }));
        assert_eq!(result, Ok(7));
    }
}
