use crate::management::model::{DetectionModel, ModelError};
use crate::management::utils::bounding_box::RawDetection;
use crate::management::utils::inference_argument::InferenceArgument;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;

/// Bounded pool in front of the blocking model collaborator. Calls queue on
/// the semaphore when every worker slot is busy; they are never rejected. The
/// actix event loop itself stays free because the call runs on the blocking
/// thread pool.
pub struct InferenceGateway {
    model: Arc<dyn DetectionModel>,
    workers: Arc<Semaphore>,
}

impl InferenceGateway {
    pub fn new(model: Arc<dyn DetectionModel>, workers: usize) -> Self {
        Self {
            model,
            workers: Arc::new(Semaphore::new(workers)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    pub async fn predict(
        &self,
        image_path: PathBuf,
        argument: InferenceArgument,
    ) -> Result<Vec<RawDetection>, ModelError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|_| ModelError::PoolClosed)?;
        let model = self.model.clone();
        spawn_blocking(move || model.predict(&image_path, &argument))
            .await
            .map_err(|err| ModelError::Panicked(err.to_string()))?
    }

    pub async fn track(
        &self,
        source_path: PathBuf,
        output_folder: PathBuf,
        argument: InferenceArgument,
    ) -> Result<(), ModelError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|_| ModelError::PoolClosed)?;
        let model = self.model.clone();
        spawn_blocking(move || model.track(&source_path, &output_folder, &argument))
            .await
            .map_err(|err| ModelError::Panicked(err.to_string()))?
    }
}
