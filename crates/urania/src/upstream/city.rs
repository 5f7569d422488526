use crate::upstream::{AstrologyApi, UpstreamError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_CITY_LIMIT: usize = 8;
pub const MIN_QUERY_CHARS: usize = 2;

/// Geocoded city record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(alias = "countryCode", alias = "country")]
    pub country_code: String,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
    #[serde(alias = "tz")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl City {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("city with empty name".to_string());
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("{} has coordinates out of range", self.name));
        }
        if self.timezone.trim().is_empty() {
            return Err(format!("{} has no timezone", self.name));
        }
        Ok(())
    }

    /// "Paris, FR"
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country_code.to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A later submission (or `cancel`) took over; nothing was committed.
    Superseded,
    /// Query too short to search; the committed list was cleared.
    TooShort,
    Results(Vec<City>),
    Failed(UpstreamError),
}

/// The latest search results a caller may display.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSearch {
    pub query: String,
    pub cities: Vec<City>,
}

/// Debounced city search where only the latest submission may commit.
///
/// Every `submit` takes a new generation number. A submission commits only
/// if its generation is still current after the quiet period and again after
/// the response arrives.
#[derive(Clone)]
pub struct CitySearch {
    api: Arc<dyn AstrologyApi>,
    debounce: Duration,
    limit: usize,
    country: Option<String>,
    generation: Arc<AtomicU64>,
    committed: Arc<Mutex<Option<CommittedSearch>>>,
}

impl CitySearch {
    pub fn new(api: Arc<dyn AstrologyApi>, debounce: Duration) -> Self {
        Self {
            api,
            debounce,
            limit: DEFAULT_CITY_LIMIT,
            country: None,
            generation: Arc::new(AtomicU64::new(0)),
            committed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn commit(&self, value: Option<CommittedSearch>) {
        match self.committed.lock() {
            Ok(mut slot) => *slot = value,
            Err(_) => log::error!("city search state poisoned; dropping result"),
        }
    }

    pub fn committed(&self) -> Option<CommittedSearch> {
        self.committed.lock().ok().and_then(|slot| slot.clone())
    }

    /// Supersede every in-flight submission.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn submit(&self, query: &str) -> SearchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if !self.is_current(generation) {
            return SearchOutcome::Superseded;
        }

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.commit(None);
            return SearchOutcome::TooShort;
        }

        let result = self
            .api
            .search_cities(query, self.limit, self.country.as_deref())
            .await;
        if !self.is_current(generation) {
            log::debug!("discarding stale city results for {:?}", query);
            return SearchOutcome::Superseded;
        }
        match result {
            Ok(cities) => {
                self.commit(Some(CommittedSearch {
                    query: query.to_string(),
                    cities: cities.clone(),
                }));
                SearchOutcome::Results(cities)
            }
            Err(e) => {
                log::warn!("city search failed: {}", e);
                SearchOutcome::Failed(e)
            }
        }
    }
}
