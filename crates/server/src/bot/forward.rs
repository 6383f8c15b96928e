//! What the bot offers for a message forwarded from a channel.

use cinedex_core::{Category, ChannelRef, ChannelsConfig, MessageSource, SourceError};

#[derive(Debug, Clone)]
pub enum ForwardDecision {
    /// The channel is in neither category list.
    UnknownChannel,
    /// The bot lacks admin rights in the channel, so it cannot read it.
    BotNotAdmin,
    /// The admin check itself failed.
    CheckFailed(SourceError),
    /// Offer to index the channel into `Category`.
    Offer(Category),
}

/// Decide how to answer a forward from `channel`. The source is only asked
/// about channels that are configured.
pub async fn decide_forward(
    channels: &ChannelsConfig,
    source: &dyn MessageSource,
    channel: ChannelRef,
) -> ForwardDecision {
    let Some(category) = channels.category_of(channel) else {
        return ForwardDecision::UnknownChannel;
    };

    match source.is_authorized_admin(channel).await {
        Ok(true) => ForwardDecision::Offer(category),
        Ok(false) => ForwardDecision::BotNotAdmin,
        Err(e) => ForwardDecision::CheckFailed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinedex_core::testing::MockMessageSource;

    const MOVIES: ChannelRef = ChannelRef(-1001);
    const SHOWS: ChannelRef = ChannelRef(-1002);

    fn channels() -> ChannelsConfig {
        ChannelsConfig {
            movies: vec![MOVIES.0],
            tv_shows: vec![SHOWS.0],
        }
    }

    #[tokio::test]
    async fn test_unknown_channel_skips_admin_check() {
        let source = MockMessageSource::new();
        source
            .fail_admin_check(Some(SourceError::Request("unreachable".to_string())))
            .await;

        let decision = decide_forward(&channels(), &source, ChannelRef(-1999)).await;
        assert!(matches!(decision, ForwardDecision::UnknownChannel));
    }

    #[tokio::test]
    async fn test_bot_without_admin_rights_is_refused() {
        let source = MockMessageSource::new();
        source.set_admin(SHOWS, true).await;

        let decision = decide_forward(&channels(), &source, MOVIES).await;
        assert!(matches!(decision, ForwardDecision::BotNotAdmin));
    }

    #[tokio::test]
    async fn test_failed_admin_check_is_reported() {
        let source = MockMessageSource::new();
        source.set_admin(MOVIES, true).await;
        source
            .fail_admin_check(Some(SourceError::RateLimited("retry after 5s".to_string())))
            .await;

        let decision = decide_forward(&channels(), &source, MOVIES).await;
        assert!(matches!(
            decision,
            ForwardDecision::CheckFailed(SourceError::RateLimited(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_channel_offers_its_category() {
        let source = MockMessageSource::new();
        source.set_admin(MOVIES, true).await;
        source.set_admin(SHOWS, true).await;

        assert!(matches!(
            decide_forward(&channels(), &source, MOVIES).await,
            ForwardDecision::Offer(Category::Movie)
        ));
        assert!(matches!(
            decide_forward(&channels(), &source, SHOWS).await,
            ForwardDecision::Offer(Category::TvShow)
        ));
    }
}
