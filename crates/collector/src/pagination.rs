//! Offset/limit pagination over `GET /cameras`.
//!
//! The API signals the end of the inventory either with an empty page or with
//! a page shorter than the requested limit. Both are handled by
//! [`PageCursor::advance`], which is the only place deciding whether another
//! request is issued.

use futures::stream::{self, Stream};
use tracing::debug;

use crate::client::{CameraApi, PageRequest, Session};
use crate::error::Result;
use crate::models::CameraRecord;

/// Position of the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    offset: usize,
    limit: usize,
}

/// What a fetched page tells about the rest of the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Empty page: nothing to keep, stop.
    Exhausted,
    /// Short page: keep it, stop.
    Last,
    /// Full page: keep it, request the next window.
    More(PageCursor),
}

impl PageCursor {
    pub fn new(limit: usize) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn advance(self, page_len: usize) -> PageOutcome {
        if page_len == 0 {
            PageOutcome::Exhausted
        } else if page_len < self.limit {
            PageOutcome::Last
        } else {
            PageOutcome::More(Self {
                offset: self.offset + self.limit,
                ..self
            })
        }
    }
}

/// A non-empty page of cameras and the offset it was requested at.
#[derive(Debug, Clone)]
pub struct Page {
    pub offset: usize,
    pub records: Vec<CameraRecord>,
}

/// Lazily requests pages one after another until the inventory is exhausted.
///
/// Requests are strictly sequential. The first failed request is yielded as
/// an error and ends the stream.
pub fn pages<'a, A>(
    api: &'a A,
    session: &'a Session,
    limit: usize,
) -> impl Stream<Item = Result<Page>> + 'a
where
    A: CameraApi + ?Sized + 'a,
{
    stream::try_unfold(Some(PageCursor::new(limit)), move |state| {
        next_page(api, session, state)
    })
}

async fn next_page<A>(
    api: &A,
    session: &Session,
    state: Option<PageCursor>,
) -> Result<Option<(Page, Option<PageCursor>)>>
where
    A: CameraApi + ?Sized,
{
    let Some(cursor) = state else {
        return Ok(None);
    };

    let records = api.fetch_page(session, cursor.request()).await?;
    let outcome = cursor.advance(records.len());
    debug!(offset = cursor.offset(), page_size = records.len(), outcome = ?outcome, "camera page received");

    let page = Page {
        offset: cursor.offset(),
        records,
    };

    Ok(match outcome {
        PageOutcome::Exhausted => None,
        PageOutcome::Last => Some((page, None)),
        PageOutcome::More(next) => Some((page, Some(next))),
    })
}
