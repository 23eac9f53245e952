//! Channel seeding: the post store only reads channels and memberships, so
//! these commands exist to populate them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poststore_core::Channel;
use poststore_store::PostStore;

use super::print_json;

#[derive(Parser, Debug)]
pub struct ChannelArgs {
    #[command(subcommand)]
    pub command: ChannelCommands,
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommands {
    /// Create or replace a channel
    Add(AddArgs),
    /// Add a user to a channel
    Join(JoinArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Channel id (26 characters)
    pub id: String,

    /// Team the channel belongs to
    #[arg(long)]
    pub team: String,
}

#[derive(Parser, Debug)]
pub struct JoinArgs {
    /// Channel id
    pub channel: String,

    /// User id to add as a member
    #[arg(long)]
    pub user: String,
}

pub async fn run_channel(store: &PostStore, args: ChannelArgs) -> Result<()> {
    match args.command {
        ChannelCommands::Add(args) => {
            let channel = Channel::new(args.id, args.team);
            store
                .primary()
                .upsert_channel(&channel)
                .await
                .context(format!("Failed to save channel {}", channel.id))?;
            print_json(&channel)
        }
        ChannelCommands::Join(args) => {
            store
                .primary()
                .add_channel_member(&args.channel, &args.user)
                .await
                .context(format!("Failed to add {} to {}", args.user, args.channel))?;
            print_json(&serde_json::json!({
                "channel_id": args.channel,
                "user_id": args.user,
            }))
        }
    }
}
