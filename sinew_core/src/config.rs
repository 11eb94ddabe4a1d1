// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View configuration.
//!
//! Settings that hosts usually share across every skeleton view live in
//! [`ViewConfig`] and are handed to
//! [`SkeletonView::new`](crate::view::SkeletonView::new). Per-view overrides
//! (local delay limit, per-view auto-update, visibility) are setters on the
//! view itself.

use crate::color::TintMode;

/// Shared settings for skeleton views.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfig {
    /// Default upper bound, in seconds, on the delta time passed to the pose
    /// driver. `0.0` means unlimited.
    pub delay_limit: f64,
    /// Whether [`tick`](crate::view::SkeletonView::tick) advances views at
    /// all.
    pub auto_update: bool,
    /// Tint capability of the presenter.
    pub tint_mode: TintMode,
}

impl ViewConfig {
    /// Unlimited delay, auto-update on, single tint.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delay_limit: 0.0,
            auto_update: true,
            tint_mode: TintMode::Single,
        }
    }

    /// Sets the default delay limit in seconds.
    #[must_use]
    pub const fn with_delay_limit(mut self, seconds: f64) -> Self {
        self.delay_limit = seconds;
        self
    }

    /// Sets the global auto-update toggle.
    #[must_use]
    pub const fn with_auto_update(mut self, enabled: bool) -> Self {
        self.auto_update = enabled;
        self
    }

    /// Sets the tint mode.
    #[must_use]
    pub const fn with_tint_mode(mut self, mode: TintMode) -> Self {
        self.tint_mode = mode;
        self
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the effective delay limit: the local override if present,
/// otherwise the global default, with `0.0` (or any non-positive value)
/// meaning unlimited.
#[must_use]
pub fn effective_delay_limit(local: Option<f64>, global: f64) -> f64 {
    let limit = local.unwrap_or(global);
    if limit > 0.0 { limit } else { f64::MAX }
}
