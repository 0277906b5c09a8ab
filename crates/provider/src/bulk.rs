use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use futures::future::join_all;
use tracing::warn;

/// Run `send` for every item concurrently and report which ones succeeded.
///
/// All sends are started together and awaited jointly; a failure on one item
/// never affects the others. The result holds exactly one entry per input
/// item, `true` iff its send returned `Ok`. Failures are logged, never
/// returned.
pub async fn send_all<'a, T, F, Fut, E>(items: &'a [T], send: F) -> HashMap<T, bool>
where
    T: Clone + Eq + Hash,
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    send_all_indexed(items, move |_, item| send(item)).await
}

/// Like [`send_all`], but `send` also receives the item's position in
/// `items`.
pub async fn send_all_indexed<'a, T, F, Fut, E>(items: &'a [T], send: F) -> HashMap<T, bool>
where
    T: Clone + Eq + Hash,
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let sends = items.iter().enumerate().map(|(index, item)| {
        let pending = send(index, item);
        async move {
            let delivered = match pending.await {
                Ok(()) => true,
                Err(e) => {
                    warn!(index, error = %e, "bulk send entry failed");
                    false
                }
            };
            (item.clone(), delivered)
        }
    });

    join_all(sends).await.into_iter().collect()
}
