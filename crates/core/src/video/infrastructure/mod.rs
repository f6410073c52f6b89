pub mod ffmpeg_camera_reader;
pub(crate) mod ffmpeg_decoder;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_file_reader;
pub mod image_file_writer;
