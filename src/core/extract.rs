use crate::core::evaluator::{self, Evaluation, DEFAULT_MAX_ATTEMPTS};
use crate::domain::model::{Expression, Geometry, Reducer};
use crate::domain::ports::ComputeService;
use crate::utils::error::Result;

/// CRS the constant-image test rectangle defaults to.
pub const DEFAULT_CONSTANT_CRS: &str = "EPSG:32613";

/// Extract the output value from a calculation done with constant images.
///
/// Reduces the image with a first-value reducer over a fixed 10x10 rectangle
/// at the origin of `crs` and returns the evaluated band map unmodified.
pub async fn constant_image_value<S>(
    service: &S,
    image: &Expression,
    crs: &str,
    scale: f64,
) -> Result<Evaluation>
where
    S: ComputeService + ?Sized,
{
    let region = Geometry::rectangle([0.0, 0.0, 10.0, 10.0], crs, false);
    let reduced = image.reduce_region(Reducer::First, &region, scale);
    evaluator::get_info(service, &reduced, DEFAULT_MAX_ATTEMPTS).await
}

/// Extract the output value from a calculation at a point.
pub async fn point_image_value<S>(
    service: &S,
    image: &Expression,
    xy: (f64, f64),
    scale: f64,
) -> Result<Evaluation>
where
    S: ComputeService + ?Sized,
{
    let geometry = Geometry::point(xy.0, xy.1);
    let reduced = image.reduce_region(Reducer::First, &geometry, scale);
    evaluator::get_info(service, &reduced, DEFAULT_MAX_ATTEMPTS).await
}
