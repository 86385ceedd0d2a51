use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Best-effort geo position captured at clock-in / clock-out.
/// On the wire it is the string `"latitude,longitude"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::InvalidLocation(format!(
                "latitude {} out of range",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidLocation(format!(
                "longitude {} out of range",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Convert DB string → point (same format as the wire)
    pub fn from_db_str(s: &str) -> AppResult<Self> {
        s.parse()
    }

    pub fn to_db_str(&self) -> String {
        self.to_string()
    }
}

impl FromStr for GeoPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| AppError::InvalidLocation(format!("expected 'lat,lon', got '{}'", s)))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidLocation(format!("bad latitude '{}'", lat.trim())))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidLocation(format!("bad longitude '{}'", lon.trim())))?;

        GeoPoint::new(latitude, longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl TryFrom<String> for GeoPoint {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GeoPoint> for String {
    fn from(p: GeoPoint) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_spaces() {
        let p: GeoPoint = " 45.4642 , 9.19 ".parse().unwrap();
        assert_eq!(p.latitude, 45.4642);
        assert_eq!(p.longitude, 9.19);
        assert_eq!(p.to_string(), "45.4642,9.19");
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!("91,0".parse::<GeoPoint>().is_err());
        assert!("0,181".parse::<GeoPoint>().is_err());
        assert!("north,east".parse::<GeoPoint>().is_err());
        assert!("45.0".parse::<GeoPoint>().is_err());
    }
}
