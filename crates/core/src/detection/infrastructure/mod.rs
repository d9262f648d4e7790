pub mod expression_detector;
mod math;
pub mod model_resolver;
pub mod onnx_ferplus_classifier;
pub mod onnx_yolo_locator;
