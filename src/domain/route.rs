//! Route information returned by the routing service

/// Distance, duration and encoded path between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Encoded polyline of the route geometry, passed through verbatim.
    pub polyline: String,
}

impl RouteInfo {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion() {
        let route = RouteInfo {
            distance_meters: 1_250.0,
            duration_seconds: 330.0,
            polyline: "abc".into(),
        };
        assert_eq!(route.distance_km(), 1.25);
        assert_eq!(route.duration_minutes(), 5.5);
    }
}
