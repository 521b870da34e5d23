use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Opaque handle for a deferred remote computation.
///
/// The wrapped JSON is the wire form the service evaluates; builders return new
/// expressions and never mutate the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(Value);

impl Expression {
    pub fn new(expr: Value) -> Self {
        Self(expr)
    }

    /// Single-band constant image, mostly useful for smoke tests.
    pub fn constant_image(band: &str, value: f64) -> Self {
        Self(json!({
            "functionName": "Image.constant",
            "band": band,
            "value": value,
        }))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Reduce this image over a geometry at the given scale.
    pub fn reduce_region(&self, reducer: Reducer, geometry: &Geometry, scale: f64) -> Expression {
        Expression(json!({
            "functionName": "Image.reduceRegion",
            "image": self.0,
            "reducer": reducer.name(),
            "geometry": geometry.to_json(),
            "scale": scale,
        }))
    }

    /// Sample this collection over a geometry, yielding a row-oriented result
    /// (header row first, one sample per data row).
    pub fn get_region(&self, geometry: &Geometry, scale: f64) -> Expression {
        Expression(json!({
            "functionName": "Collection.getRegion",
            "collection": self.0,
            "geometry": geometry.to_json(),
            "scale": scale,
        }))
    }
}

/// Aggregation operator applied by a region reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    First,
}

impl Reducer {
    pub fn name(&self) -> &'static str {
        match self {
            Reducer::First => "first",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point {
        x: f64,
        y: f64,
    },
    Rectangle {
        /// [x_min, y_min, x_max, y_max] in the given CRS
        coords: [f64; 4],
        crs: String,
        geodesic: bool,
    },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { x, y }
    }

    pub fn rectangle(coords: [f64; 4], crs: impl Into<String>, geodesic: bool) -> Self {
        Geometry::Rectangle {
            coords,
            crs: crs.into(),
            geodesic,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Geometry::Point { x, y } => json!({
                "type": "Point",
                "coordinates": [x, y],
            }),
            Geometry::Rectangle {
                coords,
                crs,
                geodesic,
            } => json!({
                "type": "Rectangle",
                "coordinates": coords,
                "crs": crs,
                "geodesic": geodesic,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_serializes_transparently() {
        let expression = Expression::new(json!({"functionName": "Image.constant", "value": 1.0}));
        let serialized = serde_json::to_value(&expression).unwrap();
        assert_eq!(
            serialized,
            json!({"functionName": "Image.constant", "value": 1.0})
        );
    }

    #[test]
    fn reduce_region_wraps_the_image() {
        let image = Expression::constant_image("NDVI", 0.5);
        let geometry = Geometry::point(-106.1, 39.2);
        let reduced = image.reduce_region(Reducer::First, &geometry, 30.0);

        assert_eq!(reduced.as_json()["functionName"], "Image.reduceRegion");
        assert_eq!(reduced.as_json()["image"], *image.as_json());
        assert_eq!(reduced.as_json()["reducer"], "first");
        assert_eq!(reduced.as_json()["geometry"]["type"], "Point");
        assert_eq!(reduced.as_json()["scale"], 30.0);
    }

    #[test]
    fn rectangle_keeps_crs_and_geodesic_flag() {
        let geometry = Geometry::rectangle([0.0, 0.0, 10.0, 10.0], "EPSG:32613", false);
        let json = geometry.to_json();
        assert_eq!(json["coordinates"], json!([0.0, 0.0, 10.0, 10.0]));
        assert_eq!(json["crs"], "EPSG:32613");
        assert_eq!(json["geodesic"], false);
    }
}
