use crate::annotations::detection_set::ImageDetectionSet;

/// Combines two detection sets for the same image into one.
///
/// Merging is a provenance operation: it decides who said what and how much
/// to trust the second source, nothing more. Every record of `primary` is
/// kept unchanged, followed by every record of `secondary`; when an override
/// confidence is given, it replaces the confidence of each secondary record
/// before appending. Geometric reconciliation of the combined set belongs to
/// suppression, which runs afterwards.
pub fn merge(
    primary: &ImageDetectionSet,
    secondary: &ImageDetectionSet,
    override_confidence: Option<f32>,
) -> ImageDetectionSet {
    let mut records: Vec<_> = primary.iter().copied().collect();
    for mut record in secondary.iter().copied() {
        if let Some(value) = override_confidence {
            record.confidence = Some(value);
        }
        records.push(record);
    }
    ImageDetectionSet::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::box_record::BoxRecord;

    fn record(class_index: u32, confidence: f32) -> BoxRecord {
        BoxRecord {
            class_index,
            x_center: 0.5,
            y_center: 0.5,
            width: 0.2,
            height: 0.2,
            confidence: Some(confidence),
        }
    }

    #[test]
    fn merge_overrides_only_secondary_confidence() {
        let primary = ImageDetectionSet::from_records(vec![record(0, 0.9)]);
        let secondary = ImageDetectionSet::from_records(vec![record(1, 0.4)]);
        let merged = merge(&primary, &secondary, Some(0.1));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.records()[0].confidence, Some(0.9));
        assert_eq!(merged.records()[1].class_index, 1);
        assert_eq!(merged.records()[1].confidence, Some(0.1));
    }

    #[test]
    fn merge_without_override_passes_secondary_through() {
        let primary = ImageDetectionSet::from_records(vec![record(0, 0.9)]);
        let secondary = ImageDetectionSet::from_records(vec![record(1, 0.4)]);
        let merged = merge(&primary, &secondary, None);
        assert_eq!(merged.records()[1].confidence, Some(0.4));
    }

    #[test]
    fn merge_keeps_primary_before_secondary() {
        let primary = ImageDetectionSet::from_records(vec![record(0, 0.9), record(1, 0.8)]);
        let secondary = ImageDetectionSet::from_records(vec![record(2, 0.7)]);
        let merged = merge(&primary, &secondary, None);
        let classes: Vec<u32> = merged.iter().map(|r| r.class_index).collect();
        assert_eq!(classes, vec![0, 1, 2]);
    }

    #[test]
    fn merge_against_empty_secondary_is_identity_even_with_override() {
        let primary = ImageDetectionSet::from_records(vec![record(0, 0.9)]);
        let merged = merge(&primary, &ImageDetectionSet::new(), Some(0.1));
        assert_eq!(merged, primary);
    }
}
