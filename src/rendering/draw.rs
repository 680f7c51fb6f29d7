use crate::annotations::class_catalog::ClassCatalog;
use crate::annotations::detection_set::ImageDetectionSet;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

/// Pixel height of the label text.
const LABEL_SCALE: f32 = 16.0;
/// Gap between the label baseline area and the box's top edge.
const LABEL_GAP: i32 = 5;

/// Burns a detection set onto a copy of its source image.
///
/// Each record is drawn as a 2-pixel rectangle outline in its catalog color
/// with `"<name> <confidence>"` just above the top edge. The label of a box
/// touching the top of the image may run off the edge; that matches the
/// source tooling and is deliberately not clamped. The input image is never
/// mutated.
pub fn render(
    image: &RgbImage,
    detections: &ImageDetectionSet,
    catalog: &ClassCatalog,
    font: &FontVec,
) -> RgbImage {
    let mut canvas = image.clone();
    let (image_width, image_height) = canvas.dimensions();
    for record in detections.iter() {
        let corners = record.to_corner_box(image_width as f32, image_height as f32);
        let color = Rgb(catalog.color_of(record.class_index));
        let x_min = corners.x_min.round() as i32;
        let y_min = corners.y_min.round() as i32;
        let box_width = (corners.x_max - corners.x_min).round().max(1.0) as u32;
        let box_height = (corners.y_max - corners.y_min).round().max(1.0) as u32;

        // 2-pixel stroke: the outline plus a one-pixel inset.
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(x_min, y_min).of_size(box_width, box_height),
            color,
        );
        if box_width > 2 && box_height > 2 {
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(x_min + 1, y_min + 1).of_size(box_width - 2, box_height - 2),
                color,
            );
        }

        let label = label_text(catalog.name_of(record.class_index), record.score());
        let label_y = y_min - LABEL_SCALE as i32 - LABEL_GAP;
        draw_text_mut(
            &mut canvas,
            color,
            x_min,
            label_y,
            PxScale::from(LABEL_SCALE),
            font,
            &label,
        );
    }
    canvas
}

/// Label text for a record: the class name followed by the confidence
/// rounded to two decimals. Unknown classes have an empty name and get the
/// confidence alone.
fn label_text(name: &str, confidence: f32) -> String {
    if name.is_empty() {
        format!("{confidence:.2}")
    } else {
        format!("{name} {confidence:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::box_record::BoxRecord;
    use crate::rendering::font::load_label_font;

    fn centered_record(class_index: u32, confidence: f32) -> BoxRecord {
        BoxRecord {
            class_index,
            x_center: 0.5,
            y_center: 0.5,
            width: 0.5,
            height: 0.5,
            confidence: Some(confidence),
        }
    }

    #[test]
    fn label_text_includes_name_and_two_decimal_confidence() {
        assert_eq!(label_text("Ripe bunch", 0.8765), "Ripe bunch 0.88");
        assert_eq!(label_text("", 0.5), "0.50");
    }

    #[test]
    fn render_draws_box_outline_in_catalog_color() {
        let Ok(font) = load_label_font(None) else {
            // No system font available; the drawing path is covered by the
            // batch integration tests on machines that have one.
            return;
        };
        let image = RgbImage::new(64, 64);
        let set = ImageDetectionSet::from_records(vec![centered_record(3, 0.9)]);
        let catalog = ClassCatalog::bunch_condition();
        let rendered = render(&image, &set, &catalog, &font);
        // The box spans x/y 16..=48; its outline carries the class 3 color.
        assert_eq!(rendered.get_pixel(16, 32), &Rgb([255, 0, 0]));
        assert_eq!(rendered.get_pixel(17, 32), &Rgb([255, 0, 0]));
        // The source image is untouched.
        assert_eq!(image.get_pixel(16, 32), &Rgb([0, 0, 0]));
    }

    #[test]
    fn render_falls_back_to_white_for_unknown_class() {
        let Ok(font) = load_label_font(None) else {
            return;
        };
        let image = RgbImage::new(64, 64);
        let set = ImageDetectionSet::from_records(vec![centered_record(99, 0.9)]);
        let rendered = render(&image, &set, &ClassCatalog::bunch_condition(), &font);
        assert_eq!(rendered.get_pixel(16, 32), &Rgb([255, 255, 255]));
    }

    #[test]
    fn render_accepts_boxes_touching_the_top_edge() {
        let Ok(font) = load_label_font(None) else {
            return;
        };
        // The label lands above y=0 and is clipped away, not an error.
        let record = BoxRecord {
            class_index: 0,
            x_center: 0.5,
            y_center: 0.1,
            width: 0.2,
            height: 0.2,
            confidence: Some(0.9),
        };
        let image = RgbImage::new(64, 64);
        let set = ImageDetectionSet::from_records(vec![record]);
        let _ = render(&image, &set, &ClassCatalog::harvest_stage(), &font);
    }
}
