//! Page counter driven by the submit/next/back click stamps.
use std::num::NonZeroU32;

/// 1-based page number.
pub type Page = NonZeroU32;

pub const FIRST_PAGE: Page = NonZeroU32::MIN;

/// Last-click timestamp of one button, in milliseconds.
///
/// `Never` and `At(0)` are distinct states, but both compare as 0 so the
/// button priority rules behave exactly as with raw timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickStamp {
    #[default]
    Never,
    At(u64),
}

impl ClickStamp {
    pub fn millis(self) -> u64 {
        match self {
            ClickStamp::Never => 0,
            ClickStamp::At(ms) => ms,
        }
    }

    pub fn pressed(self) -> bool {
        matches!(self, ClickStamp::At(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clicks {
    pub submit: ClickStamp,
    pub next: ClickStamp,
    pub back: ClickStamp,
}

/// Which rule fired for a set of click stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Fresh,
    Forward,
    Backward,
    Unset,
}

impl Clicks {
    /// First matching rule wins:
    /// 1. submit newer than both others
    /// 2. next newer than back
    /// 3. back ever pressed (ties between next and back land here)
    /// 4. nothing pressed
    pub fn action(&self) -> PageAction {
        let (submit, next, back) = (self.submit.millis(), self.next.millis(), self.back.millis());
        if submit > next && submit > back {
            PageAction::Fresh
        } else if next > back {
            PageAction::Forward
        } else if back > 0 {
            PageAction::Backward
        } else {
            PageAction::Unset
        }
    }
}

/// Page after applying the click rules to the current pagination position.
/// An unset current page counts as 0.
pub fn next_page(clicks: &Clicks, current: Option<Page>, total: Option<Page>) -> Option<Page> {
    let current = current.map_or(0, Page::get);
    match clicks.action() {
        PageAction::Fresh => Some(FIRST_PAGE),
        PageAction::Forward => {
            let limit = total.map_or(1, Page::get);
            Page::new(current.saturating_add(1).min(limit))
        }
        PageAction::Backward => Page::new(current.saturating_sub(1).max(1)),
        PageAction::Unset => None,
    }
}

/// Current and total pages, with `current <= total` whenever both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationState {
    pub current_page: Option<Page>,
    pub total_pages: Option<Page>,
}

impl PaginationState {
    pub fn new(current_page: Option<Page>, total_pages: Option<Page>) -> Self {
        let current_page = match (current_page, total_pages) {
            (Some(current), Some(total)) => Some(current.min(total)),
            (current, _) => current,
        };
        Self {
            current_page,
            total_pages,
        }
    }
}
