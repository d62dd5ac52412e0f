// External model clients: sentiment for text, labels for images.
//
// The traits live in `traits`. `onnx` runs the models locally, `hosted`
// calls the Hugging Face Inference API. Both are constructed once at
// startup and handed to the classifier as `Arc<dyn ...>`.

pub mod download;
pub mod hosted;
pub mod onnx;
pub mod rate_limiter;
pub mod traits;
