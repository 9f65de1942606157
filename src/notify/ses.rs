use async_trait::async_trait;
use aws_sdk_ses::{
    config::Region,
    error::DisplayErrorContext,
    primitives::Blob,
    types::RawMessage,
    Client,
};

use crate::{
    errors::{ProgressError, Result},
    logln,
};

use super::Mailer;

pub struct SesMailer {
    client: Client,
}

impl SesMailer {
    const CC: &'static str = "SesMailer";

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_raw(&self, sender: &str, recipient: &str, raw: Vec<u8>) -> Result<()> {
        let message = RawMessage::builder()
            .data(Blob::new(raw))
            .build()
            .map_err(|err| ProgressError::Notify(err.to_string()))?;

        let output = self
            .client
            .send_raw_email()
            .source(sender)
            .destinations(recipient)
            .raw_message(message)
            .send()
            .await
            .map_err(|err| ProgressError::Notify(format!("{}", DisplayErrorContext(&err))))?;

        logln!("email to {} accepted as {}", recipient, output.message_id());
        Ok(())
    }
}
