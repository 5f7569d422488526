use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Placidus,
}

impl HouseSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            HouseSystem::Placidus => "placidus",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacType {
    #[default]
    Tropical,
}

impl ZodiacType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZodiacType::Tropical => "tropical",
        }
    }
}

/// Birth data for one natal report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalRequest {
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// `HH:MM` (seconds accepted)
    pub birth_time: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name, e.g. `Europe/Paris`
    pub timezone: String,
    #[serde(default)]
    pub house_system: HouseSystem,
    #[serde(default)]
    pub zodiac_type: ZodiacType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

lazy_static::lazy_static! {
    static ref TIMEZONE_RE: regex::Regex =
        regex::Regex::new(r"^(UTC|GMT|[A-Za-z_]+(/[A-Za-z0-9_+\-]+)+)$").expect("timezone pattern");
}

impl NatalRequest {
    /// Decode and validate an untrusted JSON body.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, Vec<ValidationIssue>> {
        let request: NatalRequest = serde_json::from_value(value.clone())
            .map_err(|e| vec![ValidationIssue::new("body", e.to_string())])?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > 100 {
            issues.push(ValidationIssue::new("name", "must be 1-100 characters"));
        }

        match self.parsed_date() {
            Some(date) => {
                let year = chrono::Datelike::year(&date);
                if !(1800..=2100).contains(&year) {
                    issues.push(ValidationIssue::new(
                        "birth_date",
                        "year must be within 1800-2100",
                    ));
                }
            }
            None => issues.push(ValidationIssue::new("birth_date", "expected YYYY-MM-DD")),
        }

        if self.parsed_time().is_none() {
            issues.push(ValidationIssue::new("birth_time", "expected HH:MM"));
        }

        if self.city.trim().is_empty() {
            issues.push(ValidationIssue::new("city", "must not be empty"));
        }

        if let Some(code) = &self.country_code {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                issues.push(ValidationIssue::new("country_code", "expected ISO 3166-1 alpha-2"));
            }
        }

        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            issues.push(ValidationIssue::new("latitude", "must be within [-90, 90]"));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            issues.push(ValidationIssue::new("longitude", "must be within [-180, 180]"));
        }

        if !TIMEZONE_RE.is_match(self.timezone.trim()) {
            issues.push(ValidationIssue::new("timezone", "expected an IANA zone name"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        let t = self.birth_time.trim();
        NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .ok()
    }
}
