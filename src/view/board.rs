//! Board state: side-by-side deferred lists, one multiplexer scope each.

use super::card::{self, Card};
use super::constants::{COL_PX, ROW_PX, SCROLL_STEP_ROWS};
use crate::config::ResolvedConfig;
use crate::host::HeadlessSurface;
use crate::list::{DeferredList, MAX_SETTLE_FRAMES};
use crate::model::{AppError, BoxSize, KeyAction, Length, ObservationPolicy};
use ratatui::layout::{Constraint, Layout, Rect};
use tracing::debug;

/// Validated board settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Number of columns.
    pub columns: usize,
    /// Cards per column.
    pub item_count: usize,
    /// Policy every column's multiplexer is built with.
    pub policy: ObservationPolicy,
    /// Placeholder floor.
    pub min_height: Length,
}

impl BoardConfig {
    /// Validate a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Policy`] for an invalid margin, threshold list or
    /// minimum height.
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self, AppError> {
        Ok(Self {
            columns: config.columns.max(1),
            item_count: config.item_count,
            policy: config.policy()?,
            min_height: config.min_height()?,
        })
    }
}

/// Split the board area into one area per column.
pub fn column_areas(area: Rect, columns: usize) -> Vec<Rect> {
    let count = u32::try_from(columns.max(1)).unwrap_or(1);
    Layout::horizontal((0..count).map(|_| Constraint::Ratio(1, count)))
        .split(area)
        .to_vec()
}

/// Pixel viewport for a terminal area (borders excluded).
pub fn viewport_for(area: Rect) -> BoxSize {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    BoxSize::new(
        f64::from(inner_width) * COL_PX,
        f64::from(inner_height) * ROW_PX,
    )
}

/// Scroll to the bottom and stay there while revealed cards grow.
fn stick_to_bottom(list: &mut DeferredList<Card>) {
    for _ in 0..MAX_SETTLE_FRAMES {
        let height = list.scroll_height();
        list.scroll_to(f64::MAX);
        list.settle();
        if list.scroll_height() == height {
            return;
        }
    }
}

/// The demo board.
pub struct Board {
    columns: Vec<DeferredList<Card>>,
    focus: usize,
}

impl Board {
    /// Build and mount every column, then settle the first frames.
    ///
    /// # Errors
    ///
    /// Propagates scope mount failures.
    pub fn new(config: &BoardConfig, area: Rect) -> Result<Self, AppError> {
        let surface = HeadlessSurface::new();
        let mut columns = Vec::with_capacity(config.columns);
        for (seed, column_area) in column_areas(area, config.columns).into_iter().enumerate() {
            let mut list = DeferredList::new(
                surface.clone(),
                viewport_for(column_area),
                config.policy.clone(),
                config.min_height,
            );
            for card in card::generate(seed as u64, config.item_count) {
                list.push(card);
            }
            list.mount()?;
            list.settle();
            columns.push(list);
        }
        Ok(Self { columns, focus: 0 })
    }

    /// Apply a key action. Returns `true` when the board should quit.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        let count = self.columns.len();
        let Some(list) = self.columns.get_mut(self.focus) else {
            return matches!(action, KeyAction::Quit);
        };
        let page = list.viewport().height;
        match action {
            KeyAction::ScrollDown => list.scroll_by(SCROLL_STEP_ROWS * ROW_PX),
            KeyAction::ScrollUp => list.scroll_by(-SCROLL_STEP_ROWS * ROW_PX),
            KeyAction::PageDown => list.scroll_by(page),
            KeyAction::PageUp => list.scroll_by(-page),
            KeyAction::ScrollToTop => list.scroll_to(0.0),
            KeyAction::ScrollToBottom => stick_to_bottom(list),
            KeyAction::NextColumn => self.focus = (self.focus + 1) % count,
            KeyAction::PrevColumn => self.focus = (self.focus + count - 1) % count,
            KeyAction::Quit => return true,
        }
        self.settle();
        false
    }

    /// Resize every column to the new board area.
    pub fn resize(&mut self, area: Rect) {
        let areas = column_areas(area, self.columns.len());
        for (list, column_area) in self.columns.iter_mut().zip(areas) {
            list.resize(viewport_for(column_area));
        }
        self.settle();
    }

    /// Run frames on every column until quiescent.
    pub fn settle(&mut self) {
        for (index, list) in self.columns.iter_mut().enumerate() {
            let frames = list.settle();
            debug!(column = index, frames, live = list.content_count(), "column settled");
        }
    }

    /// Columns, left to right.
    pub fn columns(&self) -> &[DeferredList<Card>] {
        &self.columns
    }

    /// Focused column index.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// One-line summary: live content cells and scroll height per column.
    pub fn status(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, list)| {
                let marker = if index == self.focus { "*" } else { " " };
                format!(
                    "{marker}col {}: {}/{} live, {}px",
                    index + 1,
                    list.content_count(),
                    list.len(),
                    list.scroll_height().round()
                )
            })
            .collect();
        format!("{}  | j/k scroll  Tab column  q quit", columns.join("  "))
    }
}
