use image::{DynamicImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use std::path::Path;
use vision::FrameObservation;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Copy of `frame` with a red box around every detected face.
pub fn annotate(frame: &DynamicImage, observation: &FrameObservation) -> RgbImage {
    let mut canvas = frame.to_rgb8();
    for detection in &observation.detections {
        let r = detection.region;
        let outer = Rect::at(r.x as i32, r.y as i32).of_size(r.width.max(1), r.height.max(1));
        draw_hollow_rect_mut(&mut canvas, outer, BOX_COLOR);
        if r.width > 2 && r.height > 2 {
            let inner = Rect::at(r.x as i32 + 1, r.y as i32 + 1).of_size(r.width - 2, r.height - 2);
            draw_hollow_rect_mut(&mut canvas, inner, BOX_COLOR);
        }
    }
    canvas
}

/// Write the annotated frame; the format follows the file extension.
pub fn save(frame: &DynamicImage, observation: &FrameObservation, path: &Path) -> Result<(), image::ImageError> {
    annotate(frame, observation).save(path)
}
