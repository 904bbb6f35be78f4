use anyhow::Result;
use async_trait::async_trait;
use types::{execution::Eth1Block, primitives::ExecutionBlockNumber};

/// Read access to an execution node.
#[async_trait]
pub trait Eth1Client: Send + Sync {
    /// Block `number` with every transaction enriched by its receipt and traces.
    ///
    /// Fails as a whole if any part of the block cannot be fetched.
    async fn get_block(&self, number: ExecutionBlockNumber) -> Result<Eth1Block>;

    async fn get_latest_eth1_block_number(&self) -> Result<ExecutionBlockNumber>;

    /// Makes all subsequent requests fail with [`Error::Closed`].
    ///
    /// [`Error::Closed`]: crate::Error::Closed
    fn close(&self);
}
