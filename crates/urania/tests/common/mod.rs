#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use urania::chart_style::ChartStyle;
use urania::natal::{HouseSystem, NatalChart, NatalRequest, ZodiacType};
use urania::upstream::{AstrologyApi, City, UpstreamError};

pub const CHART_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400"><g id="planet-sun" transform="translate(100 100)"><circle r="6" fill="#000"/></g><g id="planet-moon" transform="translate(300 100)"><circle r="6" fill="#000"/></g><g id="planet-mars"><circle cx="200" cy="300" r="6"/></g><path id="sign-taurus" d="M 0 350 L 50 350 L 50 400 L 0 400 Z"/><g class="aspects"><line id="aspect-sun-square-moon" x1="100" y1="100" x2="300" y2="100" stroke="#f00" stroke-width="1"/><line id="aspect-sun-trine-mars" x1="100" y1="100" x2="200" y2="300" stroke="#0f0"/></g></svg>"##;

pub fn paris_request() -> NatalRequest {
    NatalRequest {
        name: "Ada Example".to_string(),
        birth_date: "1990-05-15".to_string(),
        birth_time: "14:30".to_string(),
        city: "Paris".to_string(),
        country_code: Some("FR".to_string()),
        latitude: 48.8534,
        longitude: 2.3488,
        timezone: "Europe/Paris".to_string(),
        house_system: HouseSystem::Placidus,
        zodiac_type: ZodiacType::Tropical,
    }
}

/// Service payload for the Paris subject. The summary deliberately
/// disagrees with the aspect list.
pub fn paris_chart_json() -> Value {
    json!({
        "subject": { "name": "Ada Example", "city": "Paris" },
        "planets": [
            { "id": "sun", "name": "Sun", "sign": "Taurus", "pos": 24.33, "abs_pos": 54.33, "house": 10, "speed": 0.97 },
            { "id": "moon", "name": "Moon", "sign": "Aquarius", "pos": 21.0, "abs_pos": 321.0, "house": 7, "speed": 13.2 },
            { "id": "mercury", "name": "Mercury", "sign": "Taurus", "pos": 10.5, "abs_pos": 40.5, "house": 9, "retrograde": true, "speed": 0.3 },
            { "id": "venus", "name": "Venus", "sign": "Aries", "pos": 21.1, "abs_pos": 21.1, "house": 9, "speed": 1.1 },
            { "id": "mars", "name": "Mars", "sign": "Pisces", "pos": 26.2, "abs_pos": 356.2, "house": 8, "speed": 0.7 },
            { "id": "true_node", "name": "True Node", "sign": "Aquarius", "pos": 13.0, "abs_pos": 313.0, "house": 7, "retrograde": true, "speed": -0.05, "variant": "true" }
        ],
        "houses": [
            { "house": 1, "sign": "Leo", "abs_pos": 141.2 },
            { "house": 10, "sign": "Taurus", "abs_pos": 40.8 }
        ],
        "angles": { "asc": 141.2, "mc": 40.8 },
        "aspects": [
            { "p1": "Sun", "p2": "Moon", "type": "square", "orb": 3.33 },
            { "p1": "Moon", "p2": "Sun", "type": "Square", "orb": 3.4 },
            { "p1": "Mean_Node", "p2": "True_Node", "type": "conjunction", "orb": 0.1 }
        ],
        "aspects_summary": { "total": 5 },
        "interpretation": {
            "planets_in_signs": [
                { "key": "planet.sun.sign", "title": "Sun in Taurus", "text": "Steady and patient." },
                { "title": "Moon in Aquarius", "text": "Detached feelings." }
            ],
            "houses": {
                "planet.sun.house": { "title": "Sun in the 10th house", "text": "A public life." }
            },
            "aspects": [
                { "key": "aspect.moon.square.sun", "title": "Sun square Moon", "text": "Inner tension." }
            ],
            "themes": [
                { "title": "Earth emphasis", "text": "Practical instincts." }
            ]
        },
        "dominants": { "fire": 30, "earth": 40, "air": 20, "water": 10 }
    })
}

pub fn paris_chart() -> NatalChart {
    serde_json::from_value(paris_chart_json()).expect("fixture chart")
}

pub fn city(name: &str, country: &str) -> City {
    City {
        name: name.to_string(),
        country_code: country.to_string(),
        lat: 48.8534,
        lng: 2.3488,
        timezone: "Europe/Paris".to_string(),
        population: Some(2_138_551),
    }
}

/// Canned calculation service.
pub struct MockApi {
    pub natal: Result<NatalChart, UpstreamError>,
    pub svg: Result<String, UpstreamError>,
    pub cities: Vec<City>,
    pub city_error: Option<UpstreamError>,
    pub city_delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            natal: Ok(paris_chart()),
            svg: Ok(CHART_SVG.to_string()),
            cities: vec![city("Paris", "FR"), city("Parma", "IT")],
            city_error: None,
            city_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AstrologyApi for MockApi {
    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
        _country: Option<&str>,
    ) -> Result<Vec<City>, UpstreamError> {
        self.record(format!("cities:{}", query));
        if !self.city_delay.is_zero() {
            tokio::time::sleep(self.city_delay).await;
        }
        if let Some(e) = &self.city_error {
            return Err(e.clone());
        }
        let matching: Vec<City> = self
            .cities
            .iter()
            .filter(|c| c.name.to_lowercase().starts_with(&query.to_lowercase()))
            .take(limit)
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn natal(&self, request: &NatalRequest) -> Result<NatalChart, UpstreamError> {
        self.record(format!("natal:{}", request.name));
        self.natal.clone()
    }

    async fn chart_svg(
        &self,
        request: &NatalRequest,
        _style: &ChartStyle,
    ) -> Result<String, UpstreamError> {
        self.record(format!("chart:{}", request.name));
        self.svg.clone()
    }
}
