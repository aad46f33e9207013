//! 分页状态：当前页 / 总页数
//!
//! 不做任何 IO，只产生 `PageChanged`，由宿主去拉取数据。

/// Raised when the current page moves; the host should fetch `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChanged {
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavState {
    pub first: bool,
    pub prev: bool,
    pub next: bool,
    pub last: bool,
}

#[derive(Debug, Clone)]
pub struct PagingCoordinator {
    /// 0 until the first page is requested.
    current_page: u32,
    total_pages: u32,
}

impl Default for PagingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PagingCoordinator {
    pub fn new() -> Self {
        Self {
            current_page: 0,
            total_pages: 1,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Targets equal to the current page or outside `[1, total_pages]` are
    /// ignored.
    pub fn go_to(&mut self, page: u32) -> Option<PageChanged> {
        if page == self.current_page || page < 1 || page > self.total_pages {
            tracing::debug!(
                page,
                current = self.current_page,
                total = self.total_pages,
                "page target ignored"
            );
            return None;
        }
        self.current_page = page;
        Some(PageChanged { page })
    }

    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total.max(1);
    }

    /// Move back to a page that is already displayed, without raising
    /// `PageChanged`. Used when a fetch for the new page failed.
    pub fn restore(&mut self, page: u32) {
        self.current_page = page.min(self.total_pages);
    }

    pub fn first(&mut self) -> Option<PageChanged> {
        self.go_to(1)
    }

    pub fn prev(&mut self) -> Option<PageChanged> {
        if self.current_page <= 1 {
            return None;
        }
        self.go_to(self.current_page - 1)
    }

    pub fn next(&mut self) -> Option<PageChanged> {
        if self.current_page >= self.total_pages {
            return None;
        }
        self.go_to(self.current_page + 1)
    }

    pub fn last(&mut self) -> Option<PageChanged> {
        self.go_to(self.total_pages)
    }

    /// Re-request the current page.
    pub fn refresh(&self) -> Option<PageChanged> {
        (self.current_page >= 1).then_some(PageChanged {
            page: self.current_page,
        })
    }

    pub fn navigation(&self) -> NavState {
        let back = self.current_page > 1;
        let forward = self.current_page < self.total_pages;
        NavState {
            first: back,
            prev: back,
            next: forward,
            last: forward,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/paging.rs"]
mod tests;
