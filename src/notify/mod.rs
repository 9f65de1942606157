use async_trait::async_trait;
use lettre::message::{
    header::{ContentDisposition, ContentId, ContentType},
    Mailbox, MultiPart, SinglePart,
};
use lettre::Message;

use crate::errors::{ProgressError, Result};

pub mod ses;

pub const SUBJECT: &str = "Weekly Garmin Progress Report";
pub const IMAGE_CID: &str = "progress_graph";
pub const IMAGE_NAME: &str = "progress.png";

/// Relay that accepts a fully formatted MIME message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_raw(&self, sender: &str, recipient: &str, raw: Vec<u8>) -> Result<()>;
}

/// Opening lines of the email body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Greeting {
    /// Sent after a fresh collection.
    Update,
    /// Sent from the stored log alone.
    Weekly,
}

impl Greeting {
    fn html(&self) -> &'static str {
        match self {
            Greeting::Update => "<p>Hey! Here's your updated running progress 📈</p>",
            Greeting::Weekly => {
                "<h2>Your Weekly Garmin Progress 📈</h2>\n<p>See how you're progressing toward your goals!</p>"
            }
        }
    }
}

pub struct ProgressEmail;

impl ProgressEmail {
    /// `multipart/related` message with the chart inlined under `IMAGE_CID`.
    pub fn compose(sender: &str, recipient: &str, greeting: Greeting, png: Vec<u8>) -> Result<Vec<u8>> {
        let from: Mailbox = sender
            .parse()
            .map_err(|err| ProgressError::Config(format!("sender '{}': {}", sender, err)))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|err| ProgressError::Config(format!("recipient '{}': {}", recipient, err)))?;

        let html = format!(
            "<html>\n<body>\n{}\n<img src=\"cid:{}\" alt=\"Progress Graph\" />\n</body>\n</html>\n",
            greeting.html(),
            IMAGE_CID
        );

        let image_type = ContentType::parse("image/png")
            .map_err(|err| ProgressError::Notify(err.to_string()))?;
        let image = SinglePart::builder()
            .header(image_type)
            .header(ContentDisposition::inline_with_name(IMAGE_NAME))
            .header(ContentId::from(format!("<{}>", IMAGE_CID)))
            .body(png);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .multipart(MultiPart::related().singlepart(SinglePart::html(html)).singlepart(image))
            .map_err(|err| ProgressError::Notify(err.to_string()))?;

        Ok(message.formatted())
    }
}
