//! Bounded worker pool for a batch.
//!
//! Workers pull `(index, request)` pairs from a shared queue and report
//! results over a channel. The first fatal error sets the batch abort token:
//! idle workers stop pulling, running transfers stop at their next chunk.
//! Destination locks keep duplicate URLs from racing on the same file.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

use super::{Fetched, Fetcher};
use crate::control::AbortToken;
use crate::error::{FatalKind, FetchError};
use crate::request::DownloadRequest;

pub(super) fn fetch_parallel(
    fetcher: &Fetcher,
    requests: &[DownloadRequest],
    jobs: usize,
) -> Result<Vec<Fetched>, FetchError> {
    let abort = AbortToken::new();
    let work: Mutex<VecDeque<(usize, &DownloadRequest)>> =
        Mutex::new(requests.iter().enumerate().collect());
    let (tx, rx) = mpsc::channel::<(usize, Result<Fetched, FetchError>)>();
    let num_workers = jobs.min(requests.len());

    let mut slots: Vec<Option<Fetched>> = (0..requests.len()).map(|_| None).collect();
    let mut first_err: Option<FetchError> = None;

    thread::scope(|s| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            let abort = &abort;
            s.spawn(move || loop {
                if abort.is_aborted() {
                    break;
                }
                let next = work
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some((index, request)) = next else {
                    break;
                };
                let res = fetcher.fetch_with_token(request, abort);
                if res.is_err() {
                    abort.abort();
                }
                if tx.send((index, res)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (index, res) in rx {
            match res {
                Ok(fetched) => slots[index] = Some(fetched),
                Err(e) => {
                    // Aborted errors are fallout of the real failure; keep the cause.
                    let replace = match &first_err {
                        None => true,
                        Some(prev) => {
                            prev.kind() == FatalKind::Aborted && e.kind() != FatalKind::Aborted
                        }
                    };
                    if replace {
                        first_err = Some(e);
                    }
                }
            }
        }
    });

    if let Some(e) = first_err {
        return Err(e);
    }
    Ok(slots.into_iter().flatten().collect())
}
