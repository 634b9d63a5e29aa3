//! Thin clients for the external services the daemon listens to and acts
//! through. All of them fail soft: the daemon isolates a failed source
//! instead of aborting a cycle.

pub mod discord;
pub mod governance;
pub mod miners;
pub mod rewards;
pub mod twitter;

pub use discord::DiscordNotifier;
pub use governance::GovernanceClient;
pub use miners::MinerMonitor;
pub use rewards::RewardHandler;
pub use twitter::SocialMonitor;
