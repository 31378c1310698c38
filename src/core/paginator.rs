use crate::core::Video;
use crate::error::Result;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Order the videos were stored in, which is their playlist order.
    #[default]
    Insertion,
    InsertionDesc,
}

/// An ordered collection that can be read one window at a time.
pub trait PageSource {
    /// At most `limit` videos starting `offset` rows in. Past the end this
    /// is empty, not an error.
    fn find(&self, order_by: OrderBy, limit: usize, offset: usize) -> Result<Vec<Video>>;
}

/// Cursor over a [`PageSource`].
///
/// Moving past the last row slides the window down by one row instead of
/// wrapping; moving above the first row slides it up, stopping at the top.
/// There is no bound at the bottom, so callers that know the collection size
/// should stop advancing themselves.
pub struct Paginator<'a, S: PageSource + ?Sized> {
    source: &'a S,
    page_size: usize,
    offset: usize,
    selected: usize,
}

impl<'a, S: PageSource + ?Sized> Paginator<'a, S> {
    pub fn new(source: &'a S, page_size: NonZeroUsize) -> Self {
        Self {
            source,
            page_size: page_size.get(),
            offset: 0,
            selected: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Cursor position within the current page.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_page(&self) -> Result<Vec<Video>> {
        self.source.find(OrderBy::Insertion, self.page_size, self.offset)
    }

    /// The video under the cursor, if the page reaches that far.
    pub fn selected(&self) -> Result<Option<Video>> {
        Ok(self.current_page()?.into_iter().nth(self.selected))
    }

    pub fn advance(&mut self) {
        if self.selected + 1 < self.page_size {
            self.selected += 1;
        } else {
            self.offset += 1;
        }
    }

    pub fn retreat(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.offset = self.offset.saturating_sub(1);
        }
    }
}
