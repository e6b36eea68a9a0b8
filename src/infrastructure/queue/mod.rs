use anyhow::Result;
use async_trait::async_trait;

pub mod rabbitmq;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()>;
}
