pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EXPRESSION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EXPRESSION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/5faef4c33eba0395177850e1e31c4a6a9e634c82/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Directory name used under the platform cache/config roots.
pub const APP_DIR_NAME: &str = "MoodCam";

pub const NO_FACE_STATUS: &str = "No face detected";

pub const CHART_DATASET_LABEL: &str = "Emotion Trends";

/// Bar colours, one per tracked emotion in chart order.
pub const CHART_BAR_COLORS: [&str; 5] = [
    "rgba(255, 99, 132, 0.6)",
    "rgba(54, 162, 235, 0.6)",
    "rgba(255, 206, 86, 0.6)",
    "rgba(75, 192, 192, 0.6)",
    "rgba(153, 102, 255, 0.6)",
];

/// Face box stroke colour (`#00FF00`) and width in pixels.
pub const BOX_STROKE_RGBA: [u8; 4] = [0, 255, 0, 255];
pub const BOX_STROKE_WIDTH: u32 = 2;

pub const DEFAULT_REFRESH_FPS: f64 = 30.0;

pub const MODEL_LOAD_ALERT: &str =
    "Failed to load emotion detection models. Please check your internet connection.";
pub const CAMERA_ALERT: &str = "Unable to access webcam. Please check permissions and try again.";
pub const STARTUP_ALERT: &str = "Failed to start emotion detection. Please check the log for details.";
