use serde::{Deserialize, Serialize};

const CM_PER_METER: f32 = 100.0;
const INCHES_PER_METER: f32 = 39.3701;

/// Display unit for measured distances. Affects presentation only;
/// stored geometry stays in normalized scene space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Centimeters,
    Inches,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "inch",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Centimeters => Self::Inches,
            Self::Inches => Self::Centimeters,
        }
    }

    /// Convert a real-world distance in meters (source model units) to
    /// this unit.
    pub fn from_meters(&self, meters: f32) -> f32 {
        match self {
            Self::Centimeters => meters * CM_PER_METER,
            Self::Inches => meters * INCHES_PER_METER,
        }
    }
}

/// Convert a normalized-space distance to display units by undoing the
/// model's normalization scale. Source model units are taken as meters.
pub fn to_display(normalized: f32, scale_factor: f32, unit: Unit) -> f32 {
    unit.from_meters(normalized / scale_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undoes_scale_factor_before_converting() {
        // Normalized cube corner-to-corner of a 1m cube scaled by 10:
        // 10 * sqrt(3) normalized units are sqrt(3) meters.
        let diagonal = 10.0 * 3.0_f32.sqrt();
        let cm = to_display(diagonal, 10.0, Unit::Centimeters);
        assert!((cm - 173.205).abs() < 1e-2, "got {cm}");

        let inches = to_display(diagonal, 10.0, Unit::Inches);
        assert!((inches - 3.0_f32.sqrt() * 39.3701).abs() < 1e-2);
    }

    #[test]
    fn round_trips_through_scale_factor() {
        let normalized = 4.37;
        let scale_factor = 2.5;
        let cm = to_display(normalized, scale_factor, Unit::Centimeters);
        let recovered = cm / 100.0 * scale_factor;
        assert!((recovered - normalized).abs() < 1e-4);
    }

    #[test]
    fn unit_cycle_and_labels() {
        assert_eq!(Unit::Centimeters.next(), Unit::Inches);
        assert_eq!(Unit::Inches.next(), Unit::Centimeters);
        assert_eq!(Unit::Centimeters.label(), "cm");
        assert_eq!(Unit::Inches.label(), "inch");
    }
}
