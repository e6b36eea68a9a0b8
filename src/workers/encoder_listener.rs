use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::modules::video::error::VideoResult;
use crate::modules::video::events::{VideoEncoderCompleted, VideoEncoderError, VideoEncoderResult};
use crate::modules::video::media::MediaStatus;
use crate::modules::video::model::VideoId;
use crate::modules::video::status::{UpdateMediaStatusCommand, UpdateMediaStatusService};
use futures_util::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

const CONSUMER_TAG: &str = "catalog_admin_encoder_listener";
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Turns encoder result messages into media status updates.
#[derive(Clone)]
pub struct EncoderListener {
    service: UpdateMediaStatusService,
}

impl EncoderListener {
    pub fn new(service: UpdateMediaStatusService) -> Self {
        Self { service }
    }

    /// Undecodable and error messages are logged and dropped. Only failures worth a
    /// redelivery come back as `Err`.
    pub async fn on_message(&self, payload: &[u8]) -> VideoResult<()> {
        let raw = String::from_utf8_lossy(payload);
        let result = match serde_json::from_slice::<VideoEncoderResult>(payload) {
            Ok(result) => result,
            Err(e) => {
                error!(status = "unknown", payload = %raw, "Discarding encoder message: {}", e);
                return Ok(());
            }
        };

        match result {
            VideoEncoderResult::Completed(completed) => {
                info!(status = "completed", payload = %raw, "Encoder result received");
                self.on_completed(completed).await
            }
            VideoEncoderResult::Error(failure) => {
                error!(status = "error", payload = %raw, "Encoder result received");
                on_error(&failure);
                Ok(())
            }
        }
    }

    async fn on_completed(&self, completed: VideoEncoderCompleted) -> VideoResult<()> {
        let video_id = match completed.id.parse::<VideoId>() {
            Ok(id) => id,
            Err(e) => {
                error!("Encoder result carries an invalid video id '{}': {}", completed.id, e);
                return Ok(());
            }
        };

        let metadata = completed.video;
        let command = UpdateMediaStatusCommand {
            status: MediaStatus::Completed,
            video_id,
            resource_id: metadata.resource_id,
            folder: metadata.encoded_video_folder,
            filename: metadata.file_path,
        };

        let outcome = self.service.execute(command).await?;
        info!("Encoder result for video {} applied: {:?}", video_id, outcome);
        Ok(())
    }
}

fn on_error(failure: &VideoEncoderError) {
    match &failure.message {
        Some(message) => error!(
            "Encoder failed for resource {} ({}): {}",
            message.resource_id, message.file_path, failure.error
        ),
        None => error!("Encoder failed: {}", failure.error),
    }
}

/// Consumes `queue` and fans deliveries out to `consumers` tasks. A consumer closed by the
/// broker is replaced after reconnecting.
pub async fn start_encoder_listener(
    rabbit: RabbitMqService,
    listener: EncoderListener,
    queue: String,
    consumers: usize,
) -> anyhow::Result<()> {
    let consumers = consumers.max(1);
    let prefetch = u16::try_from(consumers).unwrap_or(u16::MAX);
    let consumer = rabbit.consume(&queue, CONSUMER_TAG, prefetch).await?;

    let (tx, rx) = async_channel::bounded::<Delivery>(consumers);

    for worker_id in 0..consumers {
        let rx = rx.clone();
        let listener = listener.clone();
        tokio::spawn(async move {
            while let Ok(delivery) = rx.recv().await {
                handle_delivery(&listener, delivery).await;
            }
            info!("Encoder listener worker {} stopped", worker_id);
        });
    }

    info!("Encoder listener consuming '{}' with {} workers", queue, consumers);

    let resubscribe = move || {
        let rabbit = rabbit.clone();
        let queue = queue.clone();
        async move {
            rabbit.reconnect().await?;
            rabbit.consume(&queue, CONSUMER_TAG, prefetch).await
        }
    };
    tokio::spawn(forward_deliveries(consumer, resubscribe, tx, RESUBSCRIBE_DELAY));

    Ok(())
}

/// Feeds `first` and every later subscription into `tx`, until no worker is left to receive.
async fn forward_deliveries<St, T, E, S, Fut>(
    first: St,
    mut resubscribe: S,
    tx: async_channel::Sender<T>,
    retry_delay: Duration,
) where
    St: Stream<Item = Result<T, E>> + Unpin,
    E: Display,
    S: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<St>>,
{
    let mut stream = first;

    loop {
        while let Some(delivery) = stream.next().await {
            match delivery {
                Ok(delivery) => {
                    if tx.send(delivery).await.is_err() {
                        return;
                    }
                }
                Err(e) => error!("Failed to receive encoder message: {}", e),
            }
        }
        warn!("Encoder result consumer closed, resubscribing");

        stream = loop {
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(retry_delay).await;
            match resubscribe().await {
                Ok(stream) => break stream,
                Err(e) => error!("Failed to resubscribe to encoder results: {}", e),
            }
        };
        info!("Encoder result consumer resubscribed");
    }
}

async fn handle_delivery(listener: &EncoderListener, delivery: Delivery) {
    match listener.on_message(&delivery.data).await {
        Ok(()) => {
            if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                error!("Failed to ack encoder message: {}", e);
            }
        }
        Err(e) => {
            let requeue = e.is_transient();
            error!("Failed to apply encoder result (requeue: {}): {}", requeue, e);
            let options = BasicNackOptions {
                requeue,
                ..BasicNackOptions::default()
            };
            if let Err(e) = delivery.nack(options).await {
                error!("Failed to nack encoder message: {}", e);
            }
        }
    }
}
