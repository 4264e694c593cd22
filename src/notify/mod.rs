//! Status notifications over the Slack Web API.
//!
//! [`Notifier`] is the narrow interface the run board depends on; [`SlackClient`]
//! is the real implementation.

mod command;
mod error;
mod slack;

pub use command::{client_from_config, cmd_edit, cmd_reply, cmd_send, cmd_upload};
pub use error::NotifyError;
pub use slack::{DEFAULT_BASE_URL, SlackClient, normalize_channel};

/// Posts and edits status messages. Message ids are opaque strings.
pub trait Notifier: Send + Sync {
    /// Post `text` to `channel` and return the new message id.
    fn send_message(&self, channel: &str, text: &str) -> Result<String, NotifyError>;

    /// Post `text` as a reply in the thread started by `thread_ts`.
    fn send_thread_reply(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<String, NotifyError>;

    /// Replace the text of message `ts` in `channel`.
    fn edit_message(&self, channel: &str, ts: &str, text: &str) -> Result<(), NotifyError>;
}
