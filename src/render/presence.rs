//! Presence chart renderer backed by the analyzer's chart endpoints.
//!
//! Each selection spawns one request for the configured chart kind. The
//! result is drawn as text into the chart container; failures are drawn
//! there too, so the loading indicator never hangs.

use std::sync::{Arc, Mutex};

use reqwest::{StatusCode, Url};
use serde_json::Value;
use tokio::task::JoinHandle;

use super::{ChartRenderer, ChartSettings, RenderError, text};
use crate::models::{ChartData, ChartKind, UserId};
use crate::view::RegionHandle;

/// Renders presence charts fetched from `<api_base>/<kind>/<user_id>`.
#[derive(Clone)]
pub struct PresenceChartRenderer {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    api_base: Url,
    kind: ChartKind,
    settings: ChartSettings,
    pending: Mutex<Vec<JoinHandle<()>>>,
    failures: Mutex<Vec<RenderError>>,
}

impl PresenceChartRenderer {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        kind: ChartKind,
        settings: ChartSettings,
    ) -> Result<Self, RenderError> {
        let mut api_base = Url::parse(api_base).map_err(|e| RenderError::InvalidUrl {
            url: api_base.to_string(),
            reason: e.to_string(),
        })?;
        // `Url::join` replaces the last segment unless the base ends in a slash.
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        tracing::debug!(
            %api_base,
            %kind,
            locale = %settings.locale,
            packages = ?settings.packages,
            "chart renderer ready"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                api_base,
                kind,
                settings,
                pending: Mutex::new(Vec::new()),
                failures: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn kind(&self) -> ChartKind {
        self.inner.kind
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.inner.settings
    }

    /// URL of the chart for `user`: `<api_base>/<kind>/<user>`.
    ///
    /// The id is pushed as a single percent-encoded segment, so ids carrying
    /// `/`, `?` or `#` cannot reach another resource.
    pub fn chart_url(&self, user: &UserId) -> Result<Url, RenderError> {
        let invalid = |reason: &str| RenderError::InvalidUrl {
            url: self.inner.api_base.to_string(),
            reason: reason.to_string(),
        };
        // `path_segments_mut` drops dot segments instead of encoding them.
        if matches!(user.as_str(), "" | "." | "..") {
            return Err(invalid(&format!("`{user}` is not a valid user id")));
        }

        let mut url = self.inner.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| invalid("base cannot carry a path"))?
            .pop_if_empty()
            .push(&self.inner.kind.to_string())
            .push(user.as_str());
        Ok(url)
    }

    /// Fetch and decode the chart for `user`.
    pub async fn fetch_chart(&self, user: &UserId) -> Result<ChartData, RenderError> {
        let url = self.chart_url(user)?;
        tracing::debug!(%url, %user, "fetching chart");

        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(RenderError::NotFound(user.clone())),
            status if !status.is_success() => return Err(RenderError::Status(status.as_u16())),
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RenderError::Malformed(e.to_string()))?;
        Ok(ChartData::from_json(self.inner.kind, &body)?)
    }

    /// Fetch, draw, and finish the loading-to-chart transition.
    ///
    /// The chart container always ends up showing either the chart or the
    /// failure, and the loading indicator is always hidden.
    pub async fn render_now(
        &self,
        loading: &RegionHandle,
        chart: &RegionHandle,
        user: &UserId,
    ) -> Result<(), RenderError> {
        let result = self.fetch_chart(user).await;
        let body = match &result {
            Ok(data) => text::draw(self.inner.kind, data, &self.inner.settings),
            Err(e) => format!("{}\n  {e}\n", self.inner.kind.title()),
        };
        if !chart.set_text(&body) {
            tracing::debug!(%user, "selection changed before chart arrived");
        }
        chart.show();
        loading.hide();
        result.map(|_| ())
    }

    /// Wait for every chart spawned by [`ChartRenderer::render`] to finish.
    ///
    /// Returns the first failure recorded since the last call, if any.
    pub async fn wait_idle(&self) -> Result<(), RenderError> {
        loop {
            let handles: Vec<_> = {
                let mut pending = self
                    .inner
                    .pending
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                pending.drain(..).collect()
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "chart task panicked");
                }
            }
        }

        let mut failures = self
            .inner
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match failures.drain(..).next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record_failure(&self, error: RenderError) {
        self.inner
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(error);
    }
}

impl ChartRenderer for PresenceChartRenderer {
    fn render(&self, loading: RegionHandle, chart: RegionHandle, user: &UserId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("chart requested outside a tokio runtime");
            chart.set_text(&RenderError::NoRuntime.to_string());
            chart.show();
            loading.hide();
            self.record_failure(RenderError::NoRuntime);
            return;
        };

        let renderer = self.clone();
        let user = user.clone();
        let handle = runtime.spawn(async move {
            if let Err(e) = renderer.render_now(&loading, &chart, &user).await {
                tracing::warn!(%user, error = %e, "chart rendering failed");
                renderer.record_failure(e);
            }
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
