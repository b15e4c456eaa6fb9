//! Asynchronous timer abstraction providing the timing primitives required
//! by settle delays, connect deadlines and the restart countdown.
use futures_util::future::{select, Either};
use futures_util::pin_mut;

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait NodeTimer {
    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(
        &'a mut self,
        millis: u32,
    ) -> impl core::future::Future<Output = ()> + 'a;
}

/// Run `future` until it completes or `millis` elapse, whichever comes first.
///
/// Returns `None` when the deadline wins. The future is polled first, so an
/// output that is already available is never lost to an expired deadline.
pub async fn with_deadline<T, F>(timer: &mut T, millis: u32, future: F) -> Option<F::Output>
where
    T: NodeTimer,
    F: core::future::Future,
{
    let deadline = timer.delay_ms(millis);
    pin_mut!(deadline);
    pin_mut!(future);

    match select(future, deadline).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(_) => None,
    }
}
