use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

/// Opens an ONNX model with the platform's preferred execution provider.
///
/// Inference runs one frame at a time, so inter-op parallelism stays at 1
/// and intra-op threads use every core.
pub fn open_session(model_path: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    if !model_path.exists() {
        return Err(format!("model file not found: {}", model_path.display()).into());
    }
    let intra_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_inter_threads(1)?
        .with_intra_threads(intra_threads)?
        .with_execution_providers(preferred_execution_providers())?
        .commit_from_file(model_path)?;
    log::info!("Loaded ONNX model {}", model_path.display());
    Ok(session)
}

/// CoreML on macOS, DirectML on Windows, CPU elsewhere.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_reported_before_loading() {
        let err = open_session(Path::new("/nonexistent/model.onnx")).unwrap_err();
        assert!(err.to_string().contains("model file not found"));
    }
}
