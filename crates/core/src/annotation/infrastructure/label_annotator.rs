use ab_glyph::{FontRef, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::match_result::MatchResult;
use crate::shared::constants::LABEL_HEIGHT;
use crate::shared::frame::Frame;

static FONT_BYTES: &[u8] = include_bytes!("../../../assets/DejaVuSans.ttf");

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: i32 = 2;
const TEXT_INSET: i32 = 6;
const TEXT_SCALE: f32 = 18.0;

/// Draws a red outline around each face with a filled red strip along the
/// bottom edge carrying the name in white.
pub struct LabelAnnotator {
    font: FontRef<'static>,
    scale: PxScale,
}

impl LabelAnnotator {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let font = FontRef::try_from_slice(FONT_BYTES)?;
        Ok(Self {
            font,
            scale: PxScale::from(TEXT_SCALE),
        })
    }
}

impl FrameAnnotator for LabelAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        results: &[MatchResult],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if results.is_empty() {
            return Ok(());
        }
        let mut canvas = frame.as_rgb_image_mut()?;

        for result in results {
            let b = result.bbox;
            if b.is_empty() {
                continue;
            }

            for inset in 0..BOX_THICKNESS {
                let w = b.width() - 2 * inset;
                let h = b.height() - 2 * inset;
                if w <= 0 || h <= 0 {
                    break;
                }
                let outline = Rect::at(b.left + inset, b.top + inset).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, outline, BOX_COLOR);
            }

            let strip = Rect::at(b.left, b.bottom - LABEL_HEIGHT)
                .of_size(b.width() as u32, LABEL_HEIGHT as u32);
            draw_filled_rect_mut(&mut canvas, strip, BOX_COLOR);

            // draw_text_mut positions the glyph box's top edge; lift it so the
            // baseline sits TEXT_INSET above the bottom edge
            let (_, text_h) = text_size(self.scale, &self.font, &result.name);
            let y = b.bottom - TEXT_INSET - text_h as i32;
            draw_text_mut(
                &mut canvas,
                TEXT_COLOR,
                b.left + TEXT_INSET,
                y,
                self.scale,
                &self.font,
                &result.name,
            );
        }
        Ok(())
    }
}
