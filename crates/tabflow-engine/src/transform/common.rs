//! Built-in transforms: identity pass-through and SQL query execution.
//!
//! The query transform registers the incoming batches as a table named
//! `input` and rewrites the user's query by literal replacement of the
//! configured `table_name` token, so the configuration must pick a token
//! that does not collide with other identifiers in the query.

use std::sync::Arc;

use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use serde::Deserialize;

use super::Transform;
use tabflow_types::{ComponentConfig, Dataset, EtlError, Result};

/// Binding name the SQL engine exposes the incoming dataset under.
const QUERY_BINDING: &str = "input";

/// Pass-through transform.
#[derive(Debug)]
pub(crate) struct NoopTransform {
    name: String,
}

impl NoopTransform {
    pub(crate) fn from_config(config: &ComponentConfig) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Self {
            name: config.name.clone(),
        }))
    }
}

#[async_trait]
impl Transform for NoopTransform {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, data: Dataset) -> Result<Dataset> {
        tracing::info!(component = %self.name, "passing dataset through unchanged");
        Ok(data)
    }
}

/// Which library executes the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QueryEngine {
    Datafusion,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryParams {
    use_package: QueryEngine,
    query: String,
    table_name: String,
}

/// Runs a SQL query against the incoming dataset.
#[derive(Debug)]
pub(crate) struct QueryTransform {
    name: String,
    params: QueryParams,
}

impl QueryTransform {
    pub(crate) fn from_config(config: &ComponentConfig) -> Result<Box<dyn Transform>> {
        let params: QueryParams = config.params()?;
        Ok(Box::new(Self {
            name: config.name.clone(),
            params,
        }))
    }

    async fn run_datafusion(&self, data: Dataset) -> Result<Dataset> {
        let query = self.params.query.replace(&self.params.table_name, QUERY_BINDING);

        let session = SessionContext::new();
        let table = MemTable::try_new(data.schema(), vec![data.into_batches()])
            .map_err(EtlError::backend_read)?;
        session
            .register_table(QUERY_BINDING, Arc::new(table))
            .map_err(EtlError::backend_read)?;

        let df = session.sql(&query).await.map_err(EtlError::backend_read)?;
        let schema = Arc::new(arrow::datatypes::Schema::from(df.schema()));
        let batches = df.collect().await.map_err(EtlError::backend_read)?;
        Ok(Dataset::new(schema, batches))
    }
}

#[async_trait]
impl Transform for QueryTransform {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, data: Dataset) -> Result<Dataset> {
        tracing::info!(
            component = %self.name,
            "use 'package' = [datafusion] to transform data"
        );
        match self.params.use_package {
            QueryEngine::Datafusion => self.run_datafusion(data).await,
        }
    }
}
