//! Scripted page for exercising scroll and render logic without Chrome.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::browser::{RenderSession, SessionLauncher};
use super::outcome::FetchFault;
use super::scroll::{PageMetrics, ScrollSurface};

pub(crate) const VIEWPORT: u64 = 1080;
pub(crate) const ITEM_HEIGHT: u64 = 100;

#[derive(Debug)]
struct PageState {
    items: usize,
    per_scroll: usize,
    /// Items revealed by each `scroll_to_bottom`.
    bottom_load: usize,
    limit: usize,
    offset: u64,
    fixed_extent: Option<u64>,
    /// Readings returned by `count` before falling back to `items`.
    scripted_counts: VecDeque<usize>,
    scroll_calls: u32,
    bottom_calls: u32,
    titles: Option<Vec<String>>,
    navigation_fault: bool,
}

impl PageState {
    fn extent(&self) -> u64 {
        self.fixed_extent
            .unwrap_or(VIEWPORT + self.items as u64 * ITEM_HEIGHT)
    }
}

/// Feed that reveals `per_scroll` more items on every `scroll_to`, up to
/// `limit`. The page grows with its content unless the extent is fixed.
#[derive(Debug)]
pub(crate) struct FakePage {
    state: Mutex<PageState>,
    closed: Arc<AtomicBool>,
}

impl FakePage {
    pub(crate) fn new(items: usize, per_scroll: usize, limit: usize) -> Self {
        Self {
            state: Mutex::new(PageState {
                items,
                per_scroll,
                bottom_load: 0,
                limit,
                offset: 0,
                fixed_extent: None,
                scripted_counts: VecDeque::new(),
                scroll_calls: 0,
                bottom_calls: 0,
                titles: None,
                navigation_fault: false,
            }),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn with_fixed_extent(self, extent: u64) -> Self {
        self.state.lock().unwrap().fixed_extent = Some(extent);
        self
    }

    /// Reveal `n` more items (up to the limit) on every scroll to the bottom.
    pub(crate) fn loads_at_bottom(self, n: usize) -> Self {
        self.state.lock().unwrap().bottom_load = n;
        self
    }

    pub(crate) fn with_counts(self, counts: &[usize]) -> Self {
        self.state.lock().unwrap().scripted_counts = counts.iter().copied().collect();
        self
    }

    /// Titles rendered in order; item `i` uses `titles[i % len]`.
    pub(crate) fn with_titles(self, titles: &[&str]) -> Self {
        self.state.lock().unwrap().titles =
            Some(titles.iter().map(|t| t.to_string()).collect());
        self
    }

    pub(crate) fn failing_navigation(self) -> Self {
        self.state.lock().unwrap().navigation_fault = true;
        self
    }

    pub(crate) fn scroll_calls(&self) -> u32 {
        self.state.lock().unwrap().scroll_calls
    }

    pub(crate) fn bottom_calls(&self) -> u32 {
        self.state.lock().unwrap().bottom_calls
    }

    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

#[async_trait]
impl ScrollSurface for FakePage {
    async fn count(&self, _selector: &str) -> Result<usize, FetchFault> {
        let mut state = self.state.lock().unwrap();
        Ok(state.scripted_counts.pop_front().unwrap_or(state.items))
    }

    async fn metrics(&self) -> Result<PageMetrics, FetchFault> {
        let state = self.state.lock().unwrap();
        Ok(PageMetrics {
            offset: state.offset,
            extent: state.extent(),
            viewport: VIEWPORT,
        })
    }

    async fn scroll_to(&self, offset: u64) -> Result<(), FetchFault> {
        let mut state = self.state.lock().unwrap();
        state.scroll_calls += 1;
        state.offset = offset;
        let next = state.items.saturating_add(state.per_scroll).min(state.limit);
        state.items = next;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), FetchFault> {
        let mut state = self.state.lock().unwrap();
        state.bottom_calls += 1;
        let next = state.items.saturating_add(state.bottom_load).min(state.limit);
        state.items = next;
        let bottom = state.extent().saturating_sub(VIEWPORT);
        state.offset = bottom;
        Ok(())
    }

    async fn dispatch_scroll_events(&self) -> Result<(), FetchFault> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<String, FetchFault> {
        let state = self.state.lock().unwrap();
        let items: String = (0..state.items)
            .map(|i| {
                let title = match state.titles {
                    Some(ref titles) => titles[i % titles.len()].clone(),
                    None => format!("Film {}", i + 1),
                };
                format!(
                    r#"<div class="title-list-grid__item" data-title="{}"><a href="/kr/movie/{}"></a></div>"#,
                    title,
                    i + 1
                )
            })
            .collect();
        Ok(format!(
            r#"<html><body><div class="title-list-grid">{}</div></body></html>"#,
            items
        ))
    }
}

#[async_trait]
impl RenderSession for FakePage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), FetchFault> {
        if self.state.lock().unwrap().navigation_fault {
            return Err(FetchFault::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn title(&self) -> Result<Option<String>, FetchFault> {
        Ok(Some("Scripted page".to_string()))
    }

    async fn close(self: Box<Self>) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Hands out one prepared page, then refuses.
pub(crate) struct FakeLauncher {
    page: Mutex<Option<FakePage>>,
    user_agents: Mutex<Vec<String>>,
}

impl FakeLauncher {
    pub(crate) fn new(page: FakePage) -> Self {
        Self {
            page: Mutex::new(Some(page)),
            user_agents: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            page: Mutex::new(None),
            user_agents: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>, FetchFault> {
        self.user_agents.lock().unwrap().push(user_agent.to_string());
        match self.page.lock().unwrap().take() {
            Some(page) => Ok(Box::new(page)),
            None => Err(FetchFault::Session("browser failed to start".to_string())),
        }
    }
}
