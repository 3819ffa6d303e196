//! Time-or-count batching of an arbitrary stream.
//!
//! A batch is flushed when it holds `batch_number` items, when `batch_time` has passed since
//! its first item arrived, or when the input ends, whichever happens first. Batches are never
//! empty and never larger than `batch_number`.
use std::pin::Pin;

use futures::{Stream, StreamExt, stream};
use tokio::time::Instant;

use crate::config::BatchOptions;

/// Groups the items of `input` into batches according to `options`.
///
/// The returned stream is lazy: items are only pulled from `input` while the batch stream
/// itself is being polled. It ends once `input` ends and the last open batch is flushed.
pub fn batch_with_time_or_count<S>(
    input: S,
    options: &BatchOptions,
) -> impl Stream<Item = Vec<S::Item>> + use<S>
where
    S: Stream,
{
    let batcher = Batcher {
        input: Box::pin(input),
        batch_number: options.batch_number.max(1),
        batch_time: options.batch_time,
        exhausted: false,
    };

    stream::unfold(batcher, |mut batcher| async move {
        let batch = batcher.next_batch().await?;
        Some((batch, batcher))
    })
}

struct Batcher<S: Stream> {
    input: Pin<Box<S>>,
    batch_number: usize,
    batch_time: std::time::Duration,
    exhausted: bool,
}

enum Event<T> {
    Timeout,
    Item(T),
    Closed,
}

impl<S: Stream> Batcher<S> {
    async fn next_batch(&mut self) -> Option<Vec<S::Item>> {
        if self.exhausted {
            return None;
        }

        // No timer runs until the batch has its first item.
        let Some(first) = self.input.next().await else {
            self.exhausted = true;
            return None;
        };

        let mut batch = Vec::with_capacity(self.batch_number);
        batch.push(first);

        let deadline = Instant::now().checked_add(self.batch_time);
        let timer = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timer);

        while batch.len() < self.batch_number {
            let event = tokio::select! {
                biased;
                _ = &mut timer => Event::Timeout,
                item = self.input.next() => match item {
                    Some(item) => Event::Item(item),
                    None => Event::Closed,
                },
            };

            match event {
                Event::Item(item) => batch.push(item),
                Event::Timeout => {
                    tracing::debug!(size = batch.len(), "Flushing batch after batch time.");
                    return Some(batch);
                }
                Event::Closed => {
                    self.exhausted = true;
                    tracing::debug!(size = batch.len(), "Flushing final batch.");
                    return Some(batch);
                }
            }
        }

        tracing::debug!(size = batch.len(), "Flushing full batch.");

        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::stream;
    use tokio::sync::mpsc;
    use tracing_test::traced_test;

    use super::*;

    fn receiver_stream<T>(rx: mpsc::Receiver<T>) -> impl Stream<Item = T> {
        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
    }

    fn options(batch_number: usize, batch_time: Duration) -> BatchOptions {
        BatchOptions::default()
            .with_batch_number(batch_number)
            .with_batch_time(batch_time)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_empty_input_produces_no_batches() {
        let batches = batch_with_time_or_count(stream::empty::<u32>(), &BatchOptions::default())
            .collect::<Vec<_>>()
            .await;

        assert!(batches.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batches_by_count() {
        let batches = batch_with_time_or_count(
            stream::iter(1..=7),
            &options(3, Duration::from_secs(60)),
        )
        .collect::<Vec<_>>()
        .await;

        assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_count_divides_evenly() {
        let batches = batch_with_time_or_count(
            stream::iter(1..=4),
            &options(2, Duration::from_secs(60)),
        )
        .collect::<Vec<_>>()
        .await;

        assert_eq!(batches, vec![vec![1, 2], vec![3, 4]]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_number_of_one_yields_single_item_batches() {
        let batches = batch_with_time_or_count(
            stream::iter(vec!["a", "b", "c"]),
            &options(1, Duration::from_secs(60)),
        )
        .collect::<Vec<_>>()
        .await;

        assert_eq!(batches, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_default_options_keep_small_input_in_one_batch() {
        let batches = batch_with_time_or_count(stream::iter(0..150), &BatchOptions::default())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], (0..150).collect::<Vec<_>>());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_flushes_undersized_batch_after_batch_time() {
        let (tx, rx) = mpsc::channel(8);

        let mut batches = Box::pin(batch_with_time_or_count(
            receiver_stream(rx),
            &options(10, Duration::from_millis(50)),
        ));

        tx.send("a").await.expect("receiver alive");
        tx.send("b").await.expect("receiver alive");

        // The input stays open, so only the timer can flush this batch.
        let batch = tokio::time::timeout(Duration::from_secs(5), batches.next())
            .await
            .expect("batch flushed by timer");
        assert_eq!(batch, Some(vec!["a", "b"]));

        tx.send("c").await.expect("receiver alive");
        drop(tx);

        assert_eq!(batches.next().await, Some(vec!["c"]));
        assert_eq!(batches.next().await, None);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_full_batch_does_not_wait_for_timer() {
        let (tx, rx) = mpsc::channel(8);

        let mut batches = Box::pin(batch_with_time_or_count(
            receiver_stream(rx),
            &options(2, Duration::from_secs(3600)),
        ));

        tx.send(1).await.expect("receiver alive");
        tx.send(2).await.expect("receiver alive");
        tx.send(3).await.expect("receiver alive");

        let batch = tokio::time::timeout(Duration::from_secs(5), batches.next())
            .await
            .expect("full batch flushed immediately");
        assert_eq!(batch, Some(vec![1, 2]));

        drop(tx);

        assert_eq!(batches.next().await, Some(vec![3]));
        assert_eq!(batches.next().await, None);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_preserves_input_order_across_batches() {
        let batches = batch_with_time_or_count(
            stream::iter(0..1000),
            &options(7, Duration::from_secs(60)),
        )
        .collect::<Vec<_>>()
        .await;

        assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= 7));
        assert_eq!(
            batches.into_iter().flatten().collect::<Vec<_>>(),
            (0..1000).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_stream_outlives_its_options() {
        let batches = {
            let options = options(2, Duration::from_secs(60));
            batch_with_time_or_count(stream::iter(1..=3), &options)
        };

        assert_eq!(
            batches.collect::<Vec<_>>().await,
            vec![vec![1, 2], vec![3]]
        );
    }
}
