// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::utils::http_client;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info};

pub trait Mailer {
    fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
struct MailRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

pub struct HttpMailer {
    endpoint: String,
    token: Option<String>,
    from: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, from: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            token,
            from,
            client: http_client()?,
        })
    }
}

impl Mailer for HttpMailer {
    fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        if to.is_empty() {
            bail!("No recipients");
        }
        let payload = MailRequest {
            from: self.from.as_deref(),
            to,
            subject,
            text: body,
        };
        let mut req = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        debug!("Posting mail to {} for {} recipient(s)", self.endpoint, to.len());
        req.send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Mail relay {} rejected the message", self.endpoint))?;
        Ok(())
    }
}

pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        info!("mail to [{}]: {}\n{}", to.join(", "), subject, body);
        Ok(())
    }
}

// Falls back to logging when no relay is configured.
pub fn from_settings(settings: &Settings) -> Result<Box<dyn Mailer>> {
    match &settings.mail_endpoint {
        Some(endpoint) => Ok(Box::new(HttpMailer::new(
            endpoint.clone(),
            settings.mail_token.clone(),
            settings.mail_from.clone(),
        )?)),
        None => Ok(Box::new(LogMailer)),
    }
}
