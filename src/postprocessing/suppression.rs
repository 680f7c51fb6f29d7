use crate::annotations::box_record::BoxRecord;
use crate::annotations::detection_set::ImageDetectionSet;
use std::cmp::Ordering;

/// Thresholds controlling score filtering and non-maximum suppression.
///
/// Suppression is class-agnostic by default: boxes of different classes
/// compete against each other in the same pass, which is what the detectors
/// feeding this pipeline were tuned against. Setting `class_aware` restricts
/// suppression to same-class pairs for callers that want per-class NMS.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuppressionConfig {
    pub score_threshold: f32,
    pub iou_threshold: f32,
    pub class_aware: bool,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        SuppressionConfig {
            score_threshold: 0.05,
            iou_threshold: 0.5,
            class_aware: false,
        }
    }
}

/// Drops low-confidence boxes, then resolves geometric overlap among the
/// rest with greedy non-maximum suppression.
///
/// The greedy loop repeatedly keeps the highest-confidence remaining box and
/// discards every remaining box whose IoU with it reaches the threshold.
/// The sort is stable, so of two identically scored boxes the one earlier in
/// the input set is selected first and therefore survives. The result is in
/// survivor order (confidence descending), not input order.
///
/// IoU is a ratio of areas and is unchanged by axis-aligned scaling, so the
/// normalized unit square stands in for the real pixel dimensions here.
pub fn suppress(set: &ImageDetectionSet, config: &SuppressionConfig) -> ImageDetectionSet {
    let mut candidates: Vec<BoxRecord> = set
        .iter()
        .copied()
        .filter(|record| record.score() >= config.score_threshold)
        .collect();
    candidates.sort_by(|a, b| {
        b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal)
    });

    let mut suppressed = vec![false; candidates.len()];
    let mut survivors = Vec::new();
    for (current_index, current) in candidates.iter().enumerate() {
        if suppressed[current_index] {
            continue;
        }
        survivors.push(*current);
        let current_box = current.to_corner_box(1.0, 1.0);
        for (other_index, other) in candidates.iter().enumerate().skip(current_index + 1) {
            if suppressed[other_index] {
                continue;
            }
            if config.class_aware && current.class_index != other.class_index {
                continue;
            }
            let iou = current_box.intersection_over_union(&other.to_corner_box(1.0, 1.0));
            if iou >= config.iou_threshold {
                suppressed[other_index] = true;
            }
        }
    }
    ImageDetectionSet::from_records(survivors)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a record from corner coordinates in the unit square.
    fn record_from_corners(
        class_index: u32,
        x_min: f32,
        y_min: f32,
        x_max: f32,
        y_max: f32,
        confidence: f32,
    ) -> BoxRecord {
        BoxRecord {
            class_index,
            x_center: (x_min + x_max) / 2.0,
            y_center: (y_min + y_max) / 2.0,
            width: x_max - x_min,
            height: y_max - y_min,
            confidence: Some(confidence),
        }
    }

    fn default_config() -> SuppressionConfig {
        SuppressionConfig::default()
    }

    #[test]
    fn nms_keeps_best_of_overlapping_pair_and_distant_box() {
        // Scaled-down version of the pixel-space example A=[0,0,10,10],
        // B=[1,1,11,11], C=[50,50,60,60] on a 100x100 image.
        let a = record_from_corners(0, 0.0, 0.0, 0.10, 0.10, 0.9);
        let b = record_from_corners(0, 0.01, 0.01, 0.11, 0.11, 0.8);
        let c = record_from_corners(0, 0.50, 0.50, 0.60, 0.60, 0.7);
        let set = ImageDetectionSet::from_records(vec![a, b, c]);
        let result = suppress(&set, &default_config());
        assert_eq!(result.records(), &[a, c]);
    }

    #[test]
    fn output_is_in_survivor_order_not_input_order() {
        let low = record_from_corners(0, 0.0, 0.0, 0.1, 0.1, 0.3);
        let high = record_from_corners(0, 0.5, 0.5, 0.6, 0.6, 0.9);
        let set = ImageDetectionSet::from_records(vec![low, high]);
        let result = suppress(&set, &default_config());
        assert_eq!(result.records(), &[high, low]);
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        // Identical geometry and score: the earlier record must win.
        let first = record_from_corners(0, 0.0, 0.0, 0.1, 0.1, 0.5);
        let second = record_from_corners(1, 0.0, 0.0, 0.1, 0.1, 0.5);
        let set = ImageDetectionSet::from_records(vec![first, second]);
        let result = suppress(&set, &default_config());
        assert_eq!(result.records(), &[first]);
    }

    #[test]
    fn score_filter_runs_before_nms() {
        let weak = record_from_corners(0, 0.0, 0.0, 0.1, 0.1, 0.01);
        let set = ImageDetectionSet::from_records(vec![weak]);
        assert!(suppress(&set, &default_config()).is_empty());
    }

    #[test]
    fn raising_score_threshold_never_adds_boxes() {
        let set = ImageDetectionSet::from_records(vec![
            record_from_corners(0, 0.0, 0.0, 0.1, 0.1, 0.9),
            record_from_corners(0, 0.2, 0.2, 0.3, 0.3, 0.5),
            record_from_corners(0, 0.4, 0.4, 0.5, 0.5, 0.2),
            record_from_corners(0, 0.6, 0.6, 0.7, 0.7, 0.05),
        ]);
        let mut previous = usize::MAX;
        for threshold in [0.0, 0.1, 0.3, 0.6, 0.95] {
            let config = SuppressionConfig { score_threshold: threshold, ..default_config() };
            let count = suppress(&set, &config).len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn suppression_is_idempotent_and_leaves_no_residual_overlap() {
        let set = ImageDetectionSet::from_records(vec![
            record_from_corners(0, 0.00, 0.00, 0.10, 0.10, 0.9),
            record_from_corners(1, 0.01, 0.01, 0.11, 0.11, 0.8),
            record_from_corners(0, 0.05, 0.05, 0.15, 0.15, 0.7),
            record_from_corners(2, 0.50, 0.50, 0.60, 0.60, 0.6),
        ]);
        let config = default_config();
        let once = suppress(&set, &config);
        let twice = suppress(&once, &config);
        assert_eq!(once, twice);
        for (i, a) in once.iter().enumerate() {
            for b in once.iter().skip(i + 1) {
                let iou = a
                    .to_corner_box(1.0, 1.0)
                    .intersection_over_union(&b.to_corner_box(1.0, 1.0));
                assert!(iou < config.iou_threshold);
            }
        }
    }

    #[test]
    fn class_aware_mode_keeps_overlapping_boxes_of_different_classes() {
        let a = record_from_corners(0, 0.0, 0.0, 0.10, 0.10, 0.9);
        let b = record_from_corners(1, 0.01, 0.01, 0.11, 0.11, 0.8);
        let set = ImageDetectionSet::from_records(vec![a, b]);

        let agnostic = suppress(&set, &default_config());
        assert_eq!(agnostic.records(), &[a]);

        let config = SuppressionConfig { class_aware: true, ..default_config() };
        let aware = suppress(&set, &config);
        assert_eq!(aware.records(), &[a, b]);
    }
}
