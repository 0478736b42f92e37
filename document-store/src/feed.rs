//! Paged cursor adapter.
//!
//! Turns a store-native [`FeedCursor`] ("has more results / read next page") into either a lazy
//! [`PagedStream`] or one of the eager reductions [`drain_all`], [`first`] and [`any`]. Every
//! repository bulk operation is written against these instead of the paging protocol.

use std::future::Future;
use std::marker::PhantomData;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::FeedCursor;
use crate::error::{RepositoryError, Result, StoreError};

/// Result of one page fetch. `None` means the fetch was abandoned because of cancellation.
type PageFetch = BoxFuture<'static, (Box<dyn FeedCursor>, Option<std::result::Result<Vec<Value>, StoreError>>)>;

enum State {
    Created(Box<dyn FeedCursor>),
    Fetching(PageFetch),
    HasPage(Box<dyn FeedCursor>, std::vec::IntoIter<Value>),
    Exhausted,
    Cancelled,
    Faulted,
}

impl State {
    fn is_terminal(&self) -> bool {
        matches!(self, State::Exhausted | State::Cancelled | State::Faulted)
    }
}

/// Lazy, forward-only sequence of entities read page by page from a cursor.
///
/// A page is requested only when the buffered one is used up and the consumer polls again.
/// The token is checked on every poll and raced against an in-flight fetch; once cancelled the
/// stream ends without an error. A store fault is yielded once and ends the stream. The cursor
/// is dropped as soon as the stream reaches a terminal state, or when the stream is dropped.
pub struct PagedStream<T> {
    state: State,
    cancel: CancellationToken,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PagedStream<T> {
    pub fn new(cursor: Box<dyn FeedCursor>, cancel: CancellationToken) -> Self {
        Self {
            state: State::Created(cursor),
            cancel,
            _entity: PhantomData,
        }
    }

    /// Whether the stream has finished (exhausted, cancelled or faulted) and released its cursor.
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }

    fn advance(&self, cursor: Box<dyn FeedCursor>) -> State {
        if cursor.has_more_results() {
            State::Fetching(fetch_page(cursor, self.cancel.clone()))
        } else {
            debug!("Feed exhausted, releasing cursor");
            State::Exhausted
        }
    }
}

fn fetch_page(mut cursor: Box<dyn FeedCursor>, cancel: CancellationToken) -> PageFetch {
    Box::pin(async move {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            page = cursor.read_next() => Some(page),
        };
        (cursor, page)
    })
}

impl<T: DeserializeOwned> Stream for PagedStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if this.cancel.is_cancelled() && !this.state.is_terminal() {
                debug!("Feed cancelled, releasing cursor");
                this.state = State::Cancelled;
                return Poll::Ready(None);
            }

            match mem::replace(&mut this.state, State::Exhausted) {
                State::Created(cursor) => this.state = this.advance(cursor),
                State::HasPage(cursor, mut page) => match page.next() {
                    Some(document) => match serde_json::from_value(document) {
                        Ok(entity) => {
                            this.state = State::HasPage(cursor, page);
                            return Poll::Ready(Some(Ok(entity)));
                        }
                        Err(err) => {
                            this.state = State::Faulted;
                            return Poll::Ready(Some(Err(err.into())));
                        }
                    },
                    None => this.state = this.advance(cursor),
                },
                State::Fetching(mut fetch) => match fetch.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = State::Fetching(fetch);
                        return Poll::Pending;
                    }
                    Poll::Ready((cursor, Some(Ok(page)))) => {
                        debug!(count = page.len(), "Fetched feed page");
                        this.state = State::HasPage(cursor, page.into_iter());
                    }
                    Poll::Ready((_cursor, Some(Err(err)))) => {
                        debug!(error = %err, "Feed page fetch failed, releasing cursor");
                        this.state = State::Faulted;
                        return Poll::Ready(Some(Err(err.into())));
                    }
                    Poll::Ready((_cursor, None)) => {
                        debug!("Feed cancelled during fetch, releasing cursor");
                        this.state = State::Cancelled;
                        return Poll::Ready(None);
                    }
                },
                terminal => {
                    this.state = terminal;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

async fn next_page(cursor: &mut dyn FeedCursor, cancel: &CancellationToken) -> Result<Vec<Value>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        page = cursor.read_next() => Ok(page?),
    }
}

/// Reads every page and returns all entities. Cancellation fails with [`RepositoryError::Cancelled`].
pub async fn drain_all<T: DeserializeOwned>(
    mut cursor: Box<dyn FeedCursor>,
    cancel: &CancellationToken,
) -> Result<Vec<T>> {
    let mut entities = Vec::new();
    while cursor.has_more_results() {
        for document in next_page(cursor.as_mut(), cancel).await? {
            entities.push(serde_json::from_value(document)?);
        }
    }
    debug!(count = entities.len(), "Drained feed");
    Ok(entities)
}

/// Returns the first entity across all pages, or `None` when the feed is empty.
///
/// Stops reading at the first non-empty page.
pub async fn first<T: DeserializeOwned>(
    mut cursor: Box<dyn FeedCursor>,
    cancel: &CancellationToken,
) -> Result<Option<T>> {
    while cursor.has_more_results() {
        if let Some(document) = next_page(cursor.as_mut(), cancel).await?.into_iter().next() {
            return Ok(Some(serde_json::from_value(document)?));
        }
    }
    Ok(None)
}

/// Whether the feed holds at least one document. Stops reading at the first non-empty page.
pub async fn any(mut cursor: Box<dyn FeedCursor>, cancel: &CancellationToken) -> Result<bool> {
    while cursor.has_more_results() {
        if !next_page(cursor.as_mut(), cancel).await?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Runs a single store operation, giving up with [`RepositoryError::Cancelled`] if the token fires first.
pub(crate) async fn cancellable<F: Future>(cancel: &CancellationToken, operation: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        output = operation => Ok(output),
    }
}
