//! ChartRenderer trait and the chart rendering delegate.
//!
//! The selector never draws charts itself. On every real selection it hands
//! the loading indicator and chart container to a [`ChartRenderer`], which
//! is responsible for eventually hiding the former and filling the latter.

pub mod presence;
pub mod text;

use thiserror::Error;

use crate::models::{ChartDataError, UserId};
use crate::view::RegionHandle;

pub use presence::PresenceChartRenderer;

/// Errors from chart rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid chart API base `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("chart request failed: {0}")]
    Transport(String),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("chart API answered HTTP {0}")]
    Status(u16),

    #[error("malformed chart data: {0}")]
    Malformed(String),

    #[error("malformed chart data: {0}")]
    Data(#[from] ChartDataError),

    #[error("no async runtime available to render charts")]
    NoRuntime,
}

/// Chart library settings, fixed when the renderer is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSettings {
    pub locale: String,
    pub packages: Vec<String>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            locale: crate::constants::DEFAULT_CHART_LOCALE.to_string(),
            packages: crate::constants::DEFAULT_CHART_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Delegate invoked once per real selection change.
///
/// Implementations own the loading-to-chart transition: hide `loading`,
/// fill and show `chart`. Handles from a superseded selection ignore
/// updates, so implementations may finish late without clobbering newer
/// state.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, loading: RegionHandle, chart: RegionHandle, user: &UserId);
}

impl<F> ChartRenderer for F
where
    F: Fn(RegionHandle, RegionHandle, &UserId) + Send + Sync,
{
    fn render(&self, loading: RegionHandle, chart: RegionHandle, user: &UserId) {
        self(loading, chart, user)
    }
}
