use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cove")]
#[command(about = "Link wallet sessions and tail their pending dapp requests")]
pub struct Cli {
    /// Relay server base URL (overrides COVE_RELAY_URL)
    #[arg(long, env = "COVE_RELAY_URL")]
    pub relay_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link a session from its id and hex secret, then exit
    Link {
        /// Session id as displayed by the dapp side
        #[arg(long)]
        session: String,

        /// 32-byte session secret, hex encoded
        #[arg(long)]
        secret: String,
    },
    /// Poll a linked session and print each pending request
    Watch {
        /// Session id to watch
        #[arg(long)]
        session: String,

        /// 32-byte session secret, hex encoded
        #[arg(long)]
        secret: String,

        /// Poll interval in milliseconds (overrides COVE_POLL_MS)
        #[arg(long)]
        poll_ms: Option<u64>,
    },
}
