use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use super::{Notifier, NotifyError};

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

static CHANNEL_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[CGD][A-Z0-9]{8,}$").unwrap());

/// Strip one leading `#` from a channel name.
pub fn normalize_channel(channel: &str) -> &str {
    channel.strip_prefix('#').unwrap_or(channel)
}

/// Blocking Slack Web API client authenticated with a bot token.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateMessage<'a> {
    channel: &'a str,
    ts: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct Posted {
    ts: String,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
    name: String,
}

#[derive(Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct ChannelPage {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize)]
struct UploadTarget {
    upload_url: String,
    file_id: String,
}

impl SlackClient {
    pub fn new(token: &str) -> Result<Self, NotifyError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, NotifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("reposync-notifier"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Send a Web API request and unwrap the `{"ok": ...}` envelope.
    fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, NotifyError> {
        let body: Value = req.send()?.error_for_status()?.json()?;
        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let err = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            return Err(NotifyError::Api(err.to_string()));
        }
        Ok(serde_json::from_value(body)?)
    }

    fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String, NotifyError> {
        let msg = PostMessage {
            channel: normalize_channel(channel),
            text,
            thread_ts,
        };
        let posted: Posted = self.call(self.client.post(self.url("chat.postMessage")).json(&msg))?;
        Ok(posted.ts)
    }

    /// Resolve a channel name (with or without `#`) to its id.
    ///
    /// Names that already look like channel ids are returned unchanged.
    /// Walks every page of `conversations.list`.
    pub fn channel_id(&self, channel: &str) -> Result<Option<String>, NotifyError> {
        let name = normalize_channel(channel);
        if CHANNEL_ID.is_match(name) {
            return Ok(Some(name.to_string()));
        }

        let mut cursor = String::new();
        loop {
            let req = self.client.get(self.url("conversations.list")).query(&[
                ("limit", "200"),
                ("types", "public_channel,private_channel"),
                ("cursor", cursor.as_str()),
            ]);
            let page: ChannelPage = self.call(req)?;
            debug!(count = page.channels.len(), "listed channels");
            if let Some(c) = page.channels.into_iter().find(|c| c.name == name) {
                return Ok(Some(c.id));
            }
            if page.response_metadata.next_cursor.is_empty() {
                return Ok(None);
            }
            cursor = page.response_metadata.next_cursor;
        }
    }

    fn require_channel_id(&self, channel: &str) -> Result<String, NotifyError> {
        self.channel_id(channel)?
            .ok_or_else(|| NotifyError::ChannelNotFound(normalize_channel(channel).to_string()))
    }

    /// Upload a file to `channel` with an initial comment. Returns the file id.
    ///
    /// Uses the external upload flow: reserve an upload URL, send the bytes,
    /// then complete the upload into the channel.
    pub fn upload_file(
        &self,
        channel: &str,
        path: &Path,
        initial_comment: &str,
    ) -> Result<String, NotifyError> {
        let channel_id = self.require_channel_id(channel)?;
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let length = bytes.len().to_string();

        let target: UploadTarget = self.call(
            self.client
                .post(self.url("files.getUploadURLExternal"))
                .form(&[("filename", filename.as_str()), ("length", length.as_str())]),
        )?;

        self.client
            .post(&target.upload_url)
            .body(bytes)
            .send()?
            .error_for_status()?;

        let complete = serde_json::json!({
            "files": [{ "id": target.file_id, "title": filename }],
            "channel_id": channel_id,
            "initial_comment": initial_comment,
        });
        let _: Value = self.call(
            self.client
                .post(self.url("files.completeUploadExternal"))
                .json(&complete),
        )?;
        Ok(target.file_id)
    }
}

impl Notifier for SlackClient {
    fn send_message(&self, channel: &str, text: &str) -> Result<String, NotifyError> {
        self.post_message(channel, text, None)
    }

    fn send_thread_reply(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<String, NotifyError> {
        if thread_ts.trim().is_empty() {
            return Err(NotifyError::MissingThread);
        }
        self.post_message(channel, text, Some(thread_ts))
    }

    fn edit_message(&self, channel: &str, ts: &str, text: &str) -> Result<(), NotifyError> {
        let channel_id = self.require_channel_id(channel)?;
        let update = UpdateMessage {
            channel: &channel_id,
            ts,
            text,
        };
        let _: Value = self.call(self.client.post(self.url("chat.update")).json(&update))?;
        Ok(())
    }
}
