use std::future::Future;

use futures::future::join_all;

/// Runs `worker` over `items` in sequential batches of `size`. The items of
/// one batch run concurrently; the next batch starts only once every item of
/// the current one has settled. Each result is handed to `settled`, in item
/// order, as soon as its batch is done.
pub async fn run_in_batches<'a, T, R, W, F, S>(items: &'a [T], size: usize, worker: W, mut settled: S)
    where W: Fn(&'a T) -> F,
          F: Future<Output = R>,
          S: FnMut(&'a T, R),
{
    for batch in items.chunks(size.max(1)) {
        let results = join_all(batch.iter().map(&worker)).await;
        for (item, result) in batch.iter().zip(results) {
            settled(item, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn batches_bound_concurrency() {
        let items: Vec<usize> = (0..20).collect();
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let mut seen = vec![];

        run_in_batches(&items, 8, |&i| {
            let (in_flight, peak) = (&in_flight, &peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                match i % 5 {
                    0 => Err(i),
                    _ => Ok(i * 2),
                }
            }
        }, |&i, result| seen.push((i, result))).await;

        assert_eq!(peak.load(Ordering::SeqCst), 8);
        assert_eq!(seen.len(), 20);
        assert!(seen.iter().enumerate().all(|(k, &(i, _))| k == i));
        assert_eq!(seen[5].1, Err(5));
        assert_eq!(seen[7].1, Ok(14));
    }

    #[tokio::test]
    async fn empty_input_runs_nothing() {
        let mut calls = 0;
        run_in_batches(&[] as &[u8], 8, |_| async {}, |_, _| calls += 1).await;
        assert_eq!(calls, 0);
    }
}
