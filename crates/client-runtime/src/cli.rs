//! Command line definition.

use crate::config::NetworkMode;
use clap::{Args, Parser, Subcommand};
use fc_02_submission::EndorsementPolicy;
use std::path::PathBuf;

/// oemctl: client for the OEM requirements chaincode
#[derive(Parser, Debug)]
#[command(name = "oemctl", version)]
#[command(about = "Invoke, query and listen to the OEM requirements chaincode")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the configuration file and `OEM_*` variables.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "OEM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connection profile (YAML or JSON)
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Client profile merged over the connection profile
    #[arg(long, global = true)]
    pub client_profile: Option<PathBuf>,

    /// Wallet directory
    #[arg(long, global = true)]
    pub wallet: Option<PathBuf>,

    /// Wallet label to act as
    #[arg(long, global = true)]
    pub identity: Option<String>,

    #[arg(long, global = true)]
    pub channel: Option<String>,

    #[arg(long, global = true)]
    pub chaincode: Option<String>,

    /// Target peer for invoke, query and listen
    #[arg(long, global = true)]
    pub peer: Option<String>,

    #[arg(long, global = true, value_enum)]
    pub network: Option<NetworkMode>,

    /// Endorsements required before ordering: a number, `majority` or `all`
    #[arg(long, global = true)]
    pub policy: Option<EndorsementPolicy>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Propose to the target peer, then order (client/channel flow)
    #[command(subcommand)]
    Invoke(InvokeCommand),

    /// Evaluate a chaincode function on the target peer
    Query(FunctionArgs),

    /// Print chaincode events from the target peer until interrupted
    Listen(ListenArgs),

    /// Gateway/contract flow
    #[command(subcommand)]
    Gateway(GatewayCommand),

    /// End-to-end run against an in-process network
    Demo(DemoArgs),

    /// Manage wallet identities
    #[command(subcommand)]
    Identity(IdentityCommand),
}

#[derive(Subcommand, Debug)]
pub enum InvokeCommand {
    /// Create a requirement
    NewAsset(NewAssetArgs),

    /// Share a range of requirements in one transaction
    ShareBulk(ShareBulkArgs),

    /// Any chaincode function with string arguments
    Raw(FunctionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommitArgs {
    /// Wait for the commit event before returning
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NewAssetArgs {
    pub id: String,

    #[arg(long, default_value = "John")]
    pub first_name: String,

    #[arg(long, default_value = "Doe")]
    pub last_name: String,

    /// Requirement text
    #[arg(long, conflicts_with = "data_file")]
    pub text: Option<String>,

    /// Read the requirement text from a file
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ShareBulkArgs {
    /// Id prefix; ids are `<prefix><n>` for every n in the range
    #[arg(long, default_value = "Req-1")]
    pub prefix: String,

    #[arg(long, default_value_t = 4504)]
    pub from: u64,

    /// Inclusive
    #[arg(long, default_value_t = 9504)]
    pub to: u64,

    #[arg(long, default_value = "Sam")]
    pub first_name: String,

    #[arg(long, default_value = "Designer")]
    pub last_name: String,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct FunctionArgs {
    pub function: String,
    pub args: Vec<String>,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
    /// Chaincode event names
    #[arg(long = "event", default_values_t = [
        "newAsset".to_string(),
        "assetShared".to_string(),
        "assetModified".to_string(),
        "assetAccessed".to_string(),
    ])]
    pub events: Vec<String>,

    /// Also print block events
    #[arg(long)]
    pub blocks: bool,

    /// Replay from this block
    #[arg(long)]
    pub from_block: Option<u64>,

    /// Stop after this many events
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum GatewayCommand {
    Submit(FunctionArgs),
    Evaluate(FunctionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Requirements to create and share
    #[arg(long, default_value_t = 3)]
    pub assets: usize,
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommand {
    /// Generate a key pair and store it under a label
    Generate {
        label: String,
        #[arg(long, default_value = "RequirementsMSP")]
        msp_id: String,
    },
    /// List wallet labels
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_share_bulk_defaults_match_sample_range() {
        let cli = Cli::try_parse_from(["oemctl", "invoke", "share-bulk"]).unwrap();
        match cli.command {
            Command::Invoke(InvokeCommand::ShareBulk(args)) => {
                assert_eq!((args.from, args.to), (4504, 9504));
                assert_eq!(args.prefix, "Req-1");
                assert!(!args.commit.wait);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "oemctl", "query", "GetAsset", "Req-1", "--network", "devnet", "--policy", "majority",
        ])
        .unwrap();
        assert_eq!(cli.global.network, Some(NetworkMode::Devnet));
        assert_eq!(cli.global.policy, Some(EndorsementPolicy::Majority));
        match cli.command {
            Command::Query(f) => assert_eq!(f.args, vec!["Req-1".to_string()]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_listen_default_events() {
        let cli = Cli::try_parse_from(["oemctl", "listen", "--count", "2"]).unwrap();
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.events.len(), 4);
                assert_eq!(args.count, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
