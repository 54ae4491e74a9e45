//! Page-partitioned stroke store.
//!
//! Every mutation swaps in a freshly built stroke collection instead of editing
//! in place, so a consumer can detect changes with [`Arc::ptr_eq`] on the page
//! strokes (or by comparing [`Board::revision`]).

use crate::stroke::{Stroke, StrokeId};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Stable page identifier shared by all peers.
pub type PageId = Uuid;

/// Id of the page every board starts with.
///
/// Fresh boards agree on it, so strokes drawn on the opening page land on
/// every peer's opening page.
pub const FIRST_PAGE_ID: PageId = Uuid::nil();

/// Immutable, shareable sequence of committed strokes.
pub type Strokes = Arc<[Stroke]>;

/// Stroke store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid page index {index} (board has {len} pages)")]
    InvalidPageIndex { index: usize, len: usize },
}

/// Result type for stroke store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One sheet of the board.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    id: PageId,
    strokes: Strokes,
}

impl Page {
    /// Create an empty page with a known id.
    fn with_id(id: PageId) -> Self {
        Self {
            id,
            strokes: Arc::from(Vec::new()),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Committed strokes, back to front.
    pub fn strokes(&self) -> &Strokes {
        &self.strokes
    }

    /// Check if the page has no strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Get the number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Whether a stroke with this id is on the page.
    pub fn contains(&self, id: StrokeId) -> bool {
        self.strokes.iter().any(|stroke| stroke.id() == id)
    }
}

/// An ordered, non-empty sequence of pages plus the active-page pointer.
///
/// Only constructed through [`Board::new`]; there is no way to build one
/// with zero pages or an out-of-range active index.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pages: Vec<Page>,
    active: usize,
    /// Bumped on every effective mutation of stroke content or page layout.
    #[serde(skip)]
    revision: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a board with a single empty page, [`FIRST_PAGE_ID`].
    pub fn new() -> Self {
        Self {
            pages: vec![Page::with_id(FIRST_PAGE_ID)],
            active: 0,
            revision: 0,
        }
    }

    fn check_index(&self, index: usize) -> StoreResult<()> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(StoreError::InvalidPageIndex {
                index,
                len: self.pages.len(),
            })
        }
    }

    /// Get the number of pages (always at least one).
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// A board always has at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get a page by index.
    pub fn page(&self, index: usize) -> StoreResult<&Page> {
        self.check_index(index)?;
        Ok(&self.pages[index])
    }

    /// Index of the page with the given id.
    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_page(&self) -> &Page {
        &self.pages[self.active]
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a stroke to a page. Returns the page's new stroke sequence.
    pub fn add_stroke(&mut self, page_index: usize, stroke: Stroke) -> StoreResult<Strokes> {
        self.check_index(page_index)?;
        let page = &mut self.pages[page_index];
        let strokes: Strokes = page
            .strokes
            .iter()
            .cloned()
            .chain(std::iter::once(stroke))
            .collect();
        page.strokes = strokes.clone();
        self.revision += 1;
        Ok(strokes)
    }

    /// Replace a page's strokes wholesale.
    pub fn replace_page(&mut self, page_index: usize, strokes: Strokes) -> StoreResult<()> {
        self.check_index(page_index)?;
        let page = &mut self.pages[page_index];
        if Arc::ptr_eq(&page.strokes, &strokes) {
            return Ok(());
        }
        page.strokes = strokes;
        self.revision += 1;
        Ok(())
    }

    /// Remove every stroke on the page.
    pub fn clear_page(&mut self, page_index: usize) -> StoreResult<()> {
        self.replace_page(page_index, Arc::from(Vec::new()))
    }

    /// Remove the strokes with the given ids from a page (set difference).
    ///
    /// Ids not present on the page are ignored. Returns how many strokes were
    /// removed; the page collection is only replaced when that is non-zero.
    pub fn remove_strokes(&mut self, page_index: usize, ids: &[StrokeId]) -> StoreResult<usize> {
        self.check_index(page_index)?;
        let doomed: HashSet<StrokeId> = ids.iter().copied().collect();
        let current = &self.pages[page_index].strokes;
        let kept: Vec<Stroke> = current
            .iter()
            .filter(|stroke| !doomed.contains(&stroke.id()))
            .cloned()
            .collect();
        let removed = current.len() - kept.len();
        if removed > 0 {
            self.replace_page(page_index, kept.into())?;
        }
        Ok(removed)
    }

    /// Append an empty page. The active page is unchanged.
    /// Returns the new page's index.
    pub fn add_page(&mut self) -> usize {
        self.insert_page(Uuid::new_v4())
    }

    /// Append an empty page with a known id, or return the index of the
    /// existing page with that id.
    pub fn insert_page(&mut self, id: PageId) -> usize {
        if let Some(index) = self.page_index(id) {
            return index;
        }
        self.pages.push(Page::with_id(id));
        self.revision += 1;
        self.pages.len() - 1
    }

    /// Make a page the active one. Stroke content is untouched.
    pub fn set_active_page(&mut self, index: usize) -> StoreResult<()> {
        self.check_index(index)?;
        if self.active != index {
            self.active = index;
            self.revision += 1;
        }
        Ok(())
    }

    /// Navigate to the next page. Returns false if already on the last page.
    pub fn next_page(&mut self) -> bool {
        self.set_active_page(self.active + 1).is_ok()
    }

    /// Navigate to the previous page. Returns false if already on the first page.
    pub fn previous_page(&mut self) -> bool {
        match self.active.checked_sub(1) {
            Some(index) => self.set_active_page(index).is_ok(),
            None => false,
        }
    }
}
