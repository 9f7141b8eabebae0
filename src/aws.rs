use crate::alert::{AlertError, AlertSink};
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::operation::create_log_group::CreateLogGroupError;
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use tracing::debug;

/// CloudWatch Logs implementation of [`LogSink`].
///
/// Groups and streams map one-to-one onto CloudWatch log groups and log
/// streams. Retention is set with `PutRetentionPolicy` right after a group
/// is created, and never touched again.
#[derive(Clone)]
pub struct CloudWatchLogsSink {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogsSink {
    pub fn new(client: aws_sdk_cloudwatchlogs::Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_cloudwatchlogs::Client::new(config))
    }
}

#[async_trait]
impl LogSink for CloudWatchLogsSink {
    async fn ensure_group(&self, name: &str, retention_days: u32) -> Result<(), SinkError> {
        if let Err(err) = self
            .client
            .create_log_group()
            .log_group_name(name)
            .send()
            .await
        {
            let message = DisplayErrorContext(&err).to_string();
            return match err.into_service_error() {
                CreateLogGroupError::ResourceAlreadyExistsException(_) => {
                    Err(SinkError::AlreadyExists(name.to_string()))
                }
                _ => Err(SinkError::Backend(message)),
            };
        }

        debug!(group = name, retention_days, "created log group");
        self.client
            .put_retention_policy()
            .log_group_name(name)
            .retention_in_days(i32::try_from(retention_days).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(|e| SinkError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError> {
        if let Err(err) = self
            .client
            .create_log_stream()
            .log_group_name(group)
            .log_stream_name(stream)
            .send()
            .await
        {
            let message = DisplayErrorContext(&err).to_string();
            return match err.into_service_error() {
                CreateLogStreamError::ResourceAlreadyExistsException(_) => {
                    Err(SinkError::AlreadyExists(format!("{}/{}", group, stream)))
                }
                _ => Err(SinkError::Backend(message)),
            };
        }
        debug!(group, stream, "created log stream");
        Ok(())
    }

    async fn append(
        &self,
        group: &str,
        stream: &str,
        timestamp_ms: i64,
        message: &str,
    ) -> Result<(), SinkError> {
        let event = InputLogEvent::builder()
            .timestamp(timestamp_ms)
            .message(message)
            .build()
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        self.client
            .put_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .log_events(event)
            .send()
            .await
            .map_err(|e| SinkError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

/// SNS implementation of [`AlertSink`]; `topic` is a topic ARN.
#[derive(Clone)]
pub struct SnsAlertSink {
    client: aws_sdk_sns::Client,
}

impl SnsAlertSink {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_sns::Client::new(config))
    }
}

#[async_trait]
impl AlertSink for SnsAlertSink {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        self.client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| AlertError::Publish(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
