//! Transform stage: trait contract, chain composition, and registry.
//!
//! A [`TransformStage`] is either a leaf transform or an ordered chain of
//! child stages. The optional storage hand-off is an explicit field held
//! only by the head stage — chain children are always built without one,
//! so a chain cannot trigger storage mid-way.

pub mod common;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::store::{self, Store};
use crate::timing::format_elapsed;
use tabflow_types::{ComponentConfig, ComponentRole, Dataset, EtlError, Result};

/// A deterministic, pure mapping from input dataset to output dataset.
#[async_trait]
pub trait Transform: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, data: Dataset) -> Result<Dataset>;
}

#[derive(Debug)]
enum StageKind {
    Leaf(Box<dyn Transform>),
    Chain(Vec<TransformStage>),
}

/// A transform plus its position in the pipeline.
#[derive(Debug)]
pub struct TransformStage {
    name: String,
    kind: StageKind,
    storage: Option<Arc<dyn Store>>,
}

impl TransformStage {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this stage to `data`. When this stage holds the terminal
    /// storage reference, the output is forwarded to storage and the
    /// dataset is returned unchanged to the caller.
    pub fn run<'a>(&'a self, data: Dataset) -> BoxFuture<'a, Result<Dataset>> {
        Box::pin(async move {
            let start = Instant::now();

            let output = match &self.kind {
                StageKind::Leaf(transform) => transform.apply(data).await?,
                StageKind::Chain(stages) => {
                    let mut current = data;
                    for stage in stages {
                        current = stage.run(current).await?;
                    }
                    current
                }
            };

            tracing::info!(
                "transformer [{}] completed in {}",
                self.name,
                format_elapsed(start.elapsed())
            );

            if let Some(storage) = &self.storage {
                store::run_storage(storage.as_ref(), &output).await?;
            }
            Ok(output)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChainParams {
    transforms: Vec<ComponentConfig>,
}

type TransformCtor = fn(&ComponentConfig) -> Result<Box<dyn Transform>>;

/// Registered leaf transform types. `chain` is resolved by the factory
/// itself since it recurses into this table for its children.
static TRANSFORMS: &[(&str, TransformCtor)] = &[
    ("noop", common::NoopTransform::from_config),
    ("query", common::QueryTransform::from_config),
];

/// Look up `config.type` and build the transform stage, attaching the
/// optional terminal `storage` to the head stage only.
///
/// # Errors
///
/// Returns [`EtlError::UnknownComponentType`] on a registry miss, or a
/// configuration error from the selected constructor.
pub fn create_transformer(
    config: &ComponentConfig,
    storage: Option<Arc<dyn Store>>,
) -> Result<TransformStage> {
    let kind = if config.type_name == "chain" {
        let params: ChainParams = config.params()?;
        let stages = params
            .transforms
            .iter()
            .map(|child| create_transformer(child, None))
            .collect::<Result<Vec<_>>>()?;
        StageKind::Chain(stages)
    } else {
        let ctor = TRANSFORMS
            .iter()
            .find(|(type_name, _)| *type_name == config.type_name)
            .map(|(_, ctor)| ctor)
            .ok_or_else(|| EtlError::UnknownComponentType {
                role: ComponentRole::Transformer,
                type_name: config.type_name.clone(),
            })?;
        StageKind::Leaf(ctor(config)?)
    };

    tracing::info!(component = %config.name, "created transformer [{}]", config.type_name);
    Ok(TransformStage {
        name: config.name.clone(),
        kind,
        storage,
    })
}
