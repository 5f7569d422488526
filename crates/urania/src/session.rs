//! Loading a report from a link token: decode, expiry check, then the natal
//! calculation and chart image fetched together.

use crate::chart_style::ChartStyle;
use crate::envelope::ReportEnvelope;
use crate::error::ApiError;
use crate::natal::{NatalChart, NatalRequest};
use crate::report::ReportView;
use crate::upstream::AstrologyApi;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub envelope: ReportEnvelope,
    pub chart: NatalChart,
    pub chart_svg: Option<String>,
    pub view: ReportView,
}

impl LoadedReport {
    pub fn request(&self) -> &NatalRequest {
        &self.envelope.payload
    }
}

#[derive(Debug, Clone)]
pub enum ReportState {
    /// The token is not a valid envelope.
    Malformed,
    /// Older than the link lifetime; nothing was fetched.
    Expired,
    /// The natal calculation failed. `retryable` drives the retry action.
    Failed { message: String, retryable: bool },
    Ready(Box<LoadedReport>),
}

/// Loads one report. `cancel` may be called from anywhere; a cancelled load
/// commits nothing.
#[derive(Debug, Clone, Default)]
pub struct ReportLoader {
    cancelled: Arc<AtomicBool>,
    style: ChartStyle,
}

impl ReportLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: ChartStyle) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            style,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `None` when the loader was cancelled before the result was ready.
    pub async fn load(
        &self,
        api: &dyn AstrologyApi,
        token: &str,
        now: DateTime<Utc>,
    ) -> Option<ReportState> {
        let Some(envelope) = ReportEnvelope::decode(token) else {
            return self.commit(ReportState::Malformed);
        };
        if envelope.is_expired(now) {
            log::info!("report link expired ({} h old)", envelope.age(now).num_hours());
            return self.commit(ReportState::Expired);
        }

        let request = &envelope.payload;
        let (natal, chart_svg) =
            tokio::join!(api.natal(request), api.chart_svg(request, &self.style));
        if self.is_cancelled() {
            log::debug!("report load cancelled; dropping results");
            return None;
        }

        let mut chart = match natal {
            Ok(chart) => chart,
            Err(e) => {
                let err = ApiError::from(e);
                log::warn!("natal calculation failed: {}", err);
                return self.commit(ReportState::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                });
            }
        };
        chart.reconcile_summary();
        let chart_svg = match chart_svg {
            Ok(svg) => Some(svg),
            Err(e) => {
                log::warn!("chart image unavailable, rendering without it: {}", e);
                None
            }
        };

        let view = ReportView::for_request(request, &chart, chart_svg.clone());
        self.commit(ReportState::Ready(Box::new(LoadedReport {
            envelope,
            chart,
            chart_svg,
            view,
        })))
    }

    fn commit(&self, state: ReportState) -> Option<ReportState> {
        if self.is_cancelled() {
            None
        } else {
            Some(state)
        }
    }
}
