use serde::{Deserialize, Serialize};
use std::fmt;

/// A struct representing one detected object instance in one image.
///
/// Coordinates follow the YOLO convention: the box center and extent are
/// stored as fractions of the image width and height, so a record carries no
/// dependence on the resolution it was detected at. This project uses the
/// standard convention of the left side of the image being x=0 and the top
/// of the image being y=0.
///
/// Confidence is a genuine option rather than a default baked into parsing:
/// ground-truth label files carry no score while detector outputs do, and
/// callers sometimes need to tell "no score recorded" apart from "score
/// happens to equal the default".
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoxRecord {
    pub class_index: u32,
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: Option<f32>,
}

impl BoxRecord {
    /// The score this record competes with during filtering and suppression.
    /// A record without a recorded confidence competes as if it scored zero.
    pub fn score(&self) -> f32 {
        self.confidence.unwrap_or(0.0)
    }

    /// Converts the normalized center box into corner coordinates scaled to
    /// the given image dimensions.
    pub fn to_corner_box(&self, image_width: f32, image_height: f32) -> CornerBox {
        CornerBox {
            x_min: (self.x_center - self.width / 2.0) * image_width,
            y_min: (self.y_center - self.height / 2.0) * image_height,
            x_max: (self.x_center + self.width / 2.0) * image_width,
            y_max: (self.y_center + self.height / 2.0) * image_height,
        }
    }
}

impl fmt::Display for BoxRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoxRecord {{ class: {}, center: ({}, {}), size: ({}, {}), confidence: {:?} }}",
            self.class_index, self.x_center, self.y_center, self.width, self.height, self.confidence
        )
    }
}

/// An axis-aligned box in corner form, the shape suppression and rendering
/// work in. Produced from a [`BoxRecord`] by [`BoxRecord::to_corner_box`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl CornerBox {
    pub fn area(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    /// Intersection over union with another box. Defined as 0 when the union
    /// has no area, which covers the degenerate case of two zero-area boxes.
    pub fn intersection_over_union(&self, other: &CornerBox) -> f32 {
        let overlap_x = (self.x_max.min(other.x_max) - self.x_min.max(other.x_min)).max(0.0);
        let overlap_y = (self.y_max.min(other.y_max) - self.y_min.max(other.y_min)).max(0.0);
        let intersection = overlap_x * overlap_y;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}
