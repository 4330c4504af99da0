use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Approximate bounding box of Israel: (min, max) latitude and longitude.
const ISRAEL_LATITUDE: (f64, f64) = (29.5, 33.5);
const ISRAEL_LONGITUDE: (f64, f64) = (34.0, 36.0);

/// Whether a coordinate lies inside Israel's bounding box.
pub fn is_in_israel(latitude: f64, longitude: f64) -> bool {
    (ISRAEL_LATITUDE.0..=ISRAEL_LATITUDE.1).contains(&latitude)
        && (ISRAEL_LONGITUDE.0..=ISRAEL_LONGITUDE.1).contains(&longitude)
}

/// Where a day is observed. Israel and the Diaspora keep festivals for a
/// different number of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
    pub is_israel: bool,
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

impl Location {
    /// Creates a location, detecting Israel from the coordinates.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            timezone,
            is_israel: is_in_israel(latitude, longitude),
        }
    }

    /// Overrides the detected Israel flag.
    pub fn with_israel(mut self, is_israel: bool) -> Self {
        self.is_israel = is_israel;
        self
    }

    /// Current civil date at this location.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}
