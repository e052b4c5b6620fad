#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends one email through a Postal relay

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use postal_client::{
    domain::mail::{Mailer, Message},
    infrastructure::postal::{PostalClient, PostalConfig},
};
use tracing::info;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The Postal connection details
    #[clap(flatten)]
    pub postal: PostalConfig,

    /// The sender address
    #[arg(long, env = "POSTAL_FROM")]
    pub from: String,

    /// A recipient address, may be repeated
    #[arg(long, env = "POSTAL_TO", value_delimiter = ',', required = true)]
    pub to: Vec<String>,

    /// A carbon-copy recipient, may be repeated
    #[arg(long)]
    pub cc: Vec<String>,

    /// A blind carbon-copy recipient, may be repeated
    #[arg(long)]
    pub bcc: Vec<String>,

    /// The subject line
    #[arg(long, default_value = "")]
    pub subject: String,

    /// The plain text body
    #[arg(long)]
    pub text: Option<String>,

    /// The HTML body
    #[arg(long)]
    pub html: Option<String>,

    /// A file to attach, may be repeated
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,
}

impl Args {
    fn message(&self) -> Result<Message> {
        let mut message = Message::new();
        message.from = self.from.clone();
        message.to = self.to.clone();
        message.cc = self.cc.clone();
        message.bcc = self.bcc.clone();
        message.subject = self.subject.clone();
        message.plain_body = self.text.clone();
        message.html_body = self.html.clone();

        for path in &self.attachments {
            message
                .attach_file(path)
                .with_context(|| format!("failed to attach {}", path.display()))?;
        }

        Ok(message)
    }
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let client = PostalClient::from_config(&args.postal)?;
    let receipt = client.send_message(args.message()?).await?;

    info!(message_id = %receipt.message_id, "message sent");

    println!("message id: {}", receipt.message_id);

    for (recipient, message) in &receipt.messages {
        println!("  {recipient}: id={} token={}", message.id, message.token);
    }

    Ok(())
}
