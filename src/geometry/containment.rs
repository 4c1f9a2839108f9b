use geo::{BoundingRect, Coord, Intersects, Point, Polygon, Relate};
use metrics::counter;

use super::derived::BoundingBox;
use crate::errors::ServiceError;

/// A child geometry checked against its parent boundary.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Polygon(&'a Polygon<f64>),
    Point(&'a Point<f64>),
}

impl Shape<'_> {
    fn field(&self) -> &'static str {
        match self {
            Shape::Polygon(_) => "boundary",
            Shape::Point(_) => "coordinates",
        }
    }

    fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Shape::Polygon(polygon) => polygon.bounding_rect().map(|rect| BoundingBox {
                min_longitude: rect.min().x,
                min_latitude: rect.min().y,
                max_longitude: rect.max().x,
                max_latitude: rect.max().y,
            }),
            Shape::Point(point) => Some(BoundingBox::of_point(point)),
        }
    }

    fn coords(&self) -> Vec<Coord<f64>> {
        match self {
            Shape::Polygon(polygon) => polygon.exterior().coords().copied().collect(),
            Shape::Point(point) => vec![point.0],
        }
    }
}

/// Inclusive containment: a child lying on the parent's edge is covered.
pub fn covers(parent: &Polygon<f64>, child: Shape<'_>) -> bool {
    if let (Some(outer), Some(inner)) = (parent_bbox(parent), child.bbox()) {
        if !outer.contains_box(&inner) {
            return false;
        }
    }
    match child {
        Shape::Polygon(polygon) => parent.relate(polygon).is_covers(),
        Shape::Point(point) => parent.relate(point).is_covers(),
    }
}

/// Fails unless `parent` exists and covers `child`.
///
/// `ParentNotFound` when the parent geometry could not be resolved,
/// `GeometryOutOfBounds` when it does not cover the child. The error names the
/// first child vertex lying outside the parent, when one does.
pub fn require_within(
    child: Shape<'_>,
    parent: Option<&Polygon<f64>>,
    child_label: &str,
    parent_label: &str,
) -> Result<(), ServiceError> {
    let parent = parent.ok_or_else(|| ServiceError::ParentNotFound {
        child: child_label.to_string(),
        parent: parent_label.to_string(),
    })?;

    if covers(parent, child) {
        return Ok(());
    }

    counter!("storage.containment.rejections", 1, "field" => child.field());
    tracing::debug!(child = child_label, parent = parent_label, "containment rejected");

    let outside = child
        .coords()
        .into_iter()
        .find(|c| !parent.intersects(c))
        .map(|c| [c.x, c.y]);

    Err(ServiceError::GeometryOutOfBounds {
        child: child_label.to_string(),
        parent: parent_label.to_string(),
        field: child.field(),
        outside,
    })
}

fn parent_bbox(parent: &Polygon<f64>) -> Option<BoundingBox> {
    Shape::Polygon(parent).bbox()
}
