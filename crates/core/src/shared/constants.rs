pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Maximum signature distance at which a probe counts as a reference match.
/// Lower is stricter.
pub const MATCH_TOLERANCE: f64 = 0.50;

/// Name given to faces that match no reference.
pub const UNKNOWN_NAME: &str = "Unknown";

pub const LIVE_FRAME_WIDTH: u32 = 640;
pub const LIVE_FRAME_HEIGHT: u32 = 480;
pub const LIVE_DEVICE_INDEX: u32 = 0;

/// Live streams run matching on one frame out of this many.
pub const LIVE_DECIMATION: usize = 2;

/// Live frames are shrunk by this factor before detection.
pub const LIVE_DOWNSCALE: u32 = 2;

pub const LIVE_JPEG_QUALITY: u8 = 80;

/// Height of the filled name strip drawn along a box's bottom edge.
pub const LABEL_HEIGHT: i32 = 25;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
