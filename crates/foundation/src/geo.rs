use serde::{Deserialize, Serialize};

/// Geographic position in WGS84 degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PositionError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for PositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionError::NotFinite => write!(f, "coordinate is not a finite number"),
            PositionError::LatitudeOutOfRange(v) => {
                write!(f, "latitude out of range [-90, 90]: {v}")
            }
            PositionError::LongitudeOutOfRange(v) => {
                write!(f, "longitude out of range [-180, 180]: {v}")
            }
        }
    }
}

impl std::error::Error for PositionError {}

impl Position {
    /// Builds a position without range checks. Fixes coming from the host
    /// location source are trusted as-is.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a position from untrusted input.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, PositionError> {
        Self::new(latitude, longitude).validated()
    }

    pub fn validated(self) -> Result<Self, PositionError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(PositionError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PositionError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PositionError::LongitudeOutOfRange(self.longitude));
        }
        Ok(self)
    }

    pub const ORIGIN: Position = Position::new(0.0, 0.0);

    /// `[lat, lng]` pair in the order map libraries expect.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, PositionError};

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(Position::try_new(90.0, 180.0).is_ok());
        assert!(Position::try_new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Position::try_new(91.0, 0.0),
            Err(PositionError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Position::try_new(0.0, -180.5),
            Err(PositionError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn rejects_nan() {
        assert_eq!(
            Position::try_new(f64::NAN, 0.0),
            Err(PositionError::NotFinite)
        );
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_string(&Position::new(10.0, 20.0)).unwrap();
        assert_eq!(json, r#"{"latitude":10.0,"longitude":20.0}"#);
    }
}
