use std::collections::HashMap;

use showtrack_model::{ShowId, ShowSummary};

/// Paging state of one representation.
///
/// `next_page <= total_pages + 1` always holds once the total is known; the
/// cursor is exhausted exactly when `next_page > total_pages`.
#[derive(Debug, Clone)]
pub struct PageCursor {
    next_page: u32,
    total_pages: Option<u32>,
    items: Vec<ShowSummary>,
    positions: HashMap<ShowId, usize>,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            next_page: 1,
            total_pages: None,
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// `None` until the first successful response.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn items(&self) -> &[ShowSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_pages
            .is_some_and(|total| self.next_page > total)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a successful response for `page`.
    ///
    /// The page count only ever grows, so a later response reporting fewer
    /// pages than an earlier one is ignored. Items already cached by id are
    /// replaced in place.
    pub fn apply_page(
        &mut self,
        page: u32,
        reported_total: u32,
        items: impl IntoIterator<Item = ShowSummary>,
    ) {
        let total = self
            .total_pages
            .map_or(reported_total, |known| known.max(reported_total));
        self.total_pages = Some(total);

        let advanced = page.saturating_add(1).min(total.saturating_add(1));
        self.next_page = self.next_page.max(advanced);

        for item in items {
            match self.positions.get(&item.id) {
                Some(&position) => self.items[position] = item,
                None => {
                    self.positions.insert(item.id, self.items.len());
                    self.items.push(item);
                }
            }
        }
    }
}
