use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::config::Region;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::CrawlConfig;
use crate::models::{CrawlRecord, Offer};
use crate::partition_key;

pub const ACTIVE_STATUS: &str = "ACTIVE";

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Stream {stream} is not active. Please wait a few moments and try again. (status: {status})")]
    NotActive { stream: String, status: String },

    #[error("Error found while describing the stream {stream}: {message}")]
    Describe { stream: String, message: String },

    #[error("failed to put record on {stream}: {message}")]
    Put { stream: String, message: String },
}

/// The two calls the publisher makes against a data stream.
#[async_trait]
pub trait RecordStream {
    /// Current status string from the stream's descriptor, e.g. "ACTIVE".
    async fn stream_status(&self, stream: &str) -> Result<String, StreamError>;

    async fn put_record(
        &self,
        stream: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<(), StreamError>;
}

pub struct KinesisStream {
    client: aws_sdk_kinesis::Client,
}

impl KinesisStream {
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let client = aws_sdk_kinesis::Client::new(&config);
        KinesisStream { client }
    }
}

#[async_trait]
impl RecordStream for KinesisStream {
    async fn stream_status(&self, stream: &str) -> Result<String, StreamError> {
        let output = self
            .client
            .describe_stream()
            .stream_name(stream)
            .send()
            .await
            .map_err(|e| StreamError::Describe {
                stream: stream.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output
            .stream_description()
            .map(|d| d.stream_status().as_str().to_string())
            .unwrap_or_default())
    }

    async fn put_record(
        &self,
        stream: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<(), StreamError> {
        let output = self
            .client
            .put_record()
            .stream_name(stream)
            .partition_key(partition_key)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| StreamError::Put {
                stream: stream.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(
            shard_id = output.shard_id(),
            sequence_number = output.sequence_number(),
            "record accepted"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Fails unless the stream reports exactly [`ACTIVE_STATUS`].
pub async fn ensure_active<S>(stream: &S, name: &str) -> Result<(), StreamError>
where
    S: RecordStream + ?Sized,
{
    let status = stream.stream_status(name).await?;
    if status != ACTIVE_STATUS {
        return Err(StreamError::NotActive {
            stream: name.to_string(),
            status,
        });
    }
    Ok(())
}

/// Prints and publishes each offer in order.
///
/// The stream is re-validated before every record and a validation failure
/// aborts the run. A failed put only affects its own record.
pub async fn publish_offers<S>(
    stream: &S,
    config: &CrawlConfig,
    offers: &[Offer],
) -> Result<PublishSummary, StreamError>
where
    S: RecordStream + ?Sized,
{
    let mut summary = PublishSummary::default();

    for offer in offers {
        println!("{offer}");
        ensure_active(stream, &config.stream_name).await?;

        let record = CrawlRecord::from(offer);
        let body = match record.to_json() {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, ?record, "could not serialize crawl record");
                summary.skipped += 1;
                continue;
            }
        };

        let key = partition_key::generate(config.partition_key_len);
        println!("Putting record: ({key}) {body}");

        match stream
            .put_record(&config.stream_name, &key, body.into_bytes())
            .await
        {
            Ok(()) => summary.published += 1,
            Err(e) => {
                warn!(error = %e, partition_key = %key, "put failed, continuing");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
