//! Model serialization and persistence
//!
//! Saves and loads trained multiclass models as JSON. The kernel is recorded
//! as a [`KernelSpec`] so a reloaded model dispatches to the same kernel
//! parameters it was trained with.

use crate::core::{Decomposition, Result, SvmError};
use crate::kernel::{Kernel, KernelSpec};
use crate::multiclass::{BinaryMachine, MulticlassModel};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Serializable representation of a trained multiclass model
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Binary machines in descriptor order
    pub machines: Vec<BinaryMachine>,
    /// Decomposition strategy used during training
    pub decomposition: Decomposition,
    /// Number of classes
    pub n_classes: usize,
    /// Kernel description
    pub kernel: KernelSpec,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of binary machines
    pub n_machines: usize,
    /// Total retained support vectors across machines
    pub n_support_vectors: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl SerializableModel {
    /// Create a serializable model.
    ///
    /// The kernel spec is passed explicitly because the model's kernel type
    /// is opaque; callers must supply the description matching the kernel
    /// the model was trained with.
    pub fn from_model<K: Kernel>(model: &MulticlassModel<K>, kernel: KernelSpec) -> Self {
        let machines: Vec<BinaryMachine> = model.machines().to_vec();
        let n_support_vectors = machines.iter().map(|m| m.n_support_vectors()).sum();

        Self {
            decomposition: model.decomposition(),
            n_classes: model.n_classes(),
            kernel,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_machines: machines.len(),
                n_support_vectors,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            machines,
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SvmError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SvmError::SerializationError(e.to_string()))
    }

    /// Reconstruct a usable model
    pub fn into_model(self) -> Result<MulticlassModel<KernelSpec>> {
        MulticlassModel::from_parts(
            Arc::new(self.kernel),
            self.machines,
            self.decomposition,
            self.n_classes,
        )
    }
}
