use crate::shared::frame::Frame;

/// An opened demuxer plus the decoder and RGB24 converter for its best video
/// stream. Shared by the file, image and camera readers.
pub(crate) struct DecodeSession {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    fps: f64,
    frame_rate: Option<(i32, i32)>,
    total_frames: usize,
    codec: String,
}

impl DecodeSession {
    pub(crate) fn new(
        ictx: ffmpeg_next::format::context::Input,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let rate = stream.rate();
        let frame_rate = (rate.numerator() > 0 && rate.denominator() > 0)
            .then(|| (rate.numerator(), rate.denominator()));
        let fps = frame_rate.map_or(0.0, |(num, den)| num as f64 / den as f64);
        let total_frames = stream.frames().max(0) as usize;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err("Video stream reports zero dimensions".into());
        }
        let codec = decoder
            .codec()
            .map(|c| c.name().to_string())
            .unwrap_or_default();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            fps,
            frame_rate,
            total_frames,
            codec,
        })
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn fps(&self) -> f64 {
        self.fps
    }

    pub(crate) fn frame_rate(&self) -> Option<(i32, i32)> {
        self.frame_rate
    }

    pub(crate) fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub(crate) fn codec(&self) -> &str {
        &self.codec
    }

    /// Lazily decodes the remaining frames, numbering them from 0.
    pub(crate) fn frames(&mut self) -> DecodedFrames<'_> {
        DecodedFrames {
            session: self,
            frame_index: 0,
            flushing: false,
            done: false,
        }
    }

    fn receive(&mut self, index: usize) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }
        let pixels = packed_rgb(&rgb, self.width, self.height);
        Some(Ok(Frame::new(pixels, self.width, self.height, 3, index)))
    }
}

pub(crate) struct DecodedFrames<'a> {
    session: &'a mut DecodeSession,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodedFrames<'_> {
    fn emit(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let result = self.session.receive(self.frame_index)?;
        if result.is_ok() {
            self.frame_index += 1;
        } else {
            self.done = true;
        }
        Some(result)
    }
}

impl Iterator for DecodedFrames<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(result) = self.emit() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let next_packet = self.session.ictx.packets().next();
            let Some((stream, packet)) = next_packet else {
                let _ = self.session.decoder.send_eof();
                self.flushing = true;
                let result = self.emit();
                if result.is_none() {
                    self.done = true;
                }
                return result;
            };

            if stream.index() != self.session.stream_index {
                continue;
            }
            // Corrupt packets are skipped; the decoder resyncs on the next one
            if self.session.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(result) = self.emit() {
                return Some(result);
            }
        }
    }
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row stride padding.
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}

/// Test helper: encodes `num_frames` solid grey frames as MPEG-4 at `path`.
#[cfg(test)]
pub(crate) fn write_test_video(path: &std::path::Path, num_frames: usize, width: u32, height: u32) {
    use crate::shared::video_metadata::VideoMetadata;
    use crate::video::domain::video_writer::VideoWriter;
    use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

    let meta = VideoMetadata {
        width,
        height,
        fps: 25.0,
        frame_rate: Some((25, 1)),
        total_frames: 0,
        codec: String::new(),
        source_path: None,
    };
    let mut writer = FfmpegWriter::new();
    writer.open(path, &meta).unwrap();
    for i in 0..num_frames {
        let value = ((i * 40) % 256) as u8;
        let frame = Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, i);
        writer.write(&frame).unwrap();
    }
    writer.close().unwrap();
}
