use std::future::Future;

use crate::error::Result;
use crate::format::OutgoingMessage;
use crate::giphy::MediaItem;
use crate::slack::PostedMessage;

/// Calls into the Slack Web API.
///
/// Handlers only see this trait; production uses [`SlackClient`](crate::slack::SlackClient),
/// tests swap in a recording mock.
pub trait SlackApi: Send + Sync + Clone + 'static {
    /// Trade an OAuth authorization code for an access token.
    ///
    /// Returns Slack's response body untouched so it can be forwarded as-is.
    fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Post a message to the channel named in `message.channel`.
    fn post_message(
        &self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<PostedMessage>> + Send;
}

/// Looks up a single random piece of media.
pub trait MediaSearch: Send + Sync + Clone + 'static {
    fn random_media(
        &self,
        tag: &str,
        rating: &str,
        format: &str,
    ) -> impl Future<Output = Result<MediaItem>> + Send;
}
