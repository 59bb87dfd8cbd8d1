//! `oemctl invoke`: the explicit two-phase flow against the target peer.
//!
//! Each invocation is proposed once, endorsement failures are logged, and
//! the endorsed transaction is ordered under the same id.

use super::Session;
use crate::cli::{FunctionArgs, InvokeCommand, NewAssetArgs, ShareBulkArgs};
use anyhow::Context;
use fc_02_submission::{CommitWait, SubmitOutcome, TransactionSubmissionApi};
use shared_types::payloads::Owner;
use shared_types::ChaincodeInvocation;
use tracing::{info, warn};

/// Text stored when neither `--text` nor `--data-file` is given.
pub const DEFAULT_TEXT: &str = "The system shall record every requirement on the ledger.";

pub async fn run(session: &Session, command: InvokeCommand) -> anyhow::Result<SubmitOutcome> {
    match command {
        InvokeCommand::NewAsset(args) => {
            let invocation = new_asset_invocation(session, &args).await?;
            submit(session, invocation, session.commit_wait(args.commit.wait)).await
        }
        InvokeCommand::ShareBulk(args) => share_bulk(session, &args).await,
        InvokeCommand::Raw(FunctionArgs {
            function,
            args,
            commit,
        }) => {
            let invocation = session.invocation(&function, &args);
            submit(session, invocation, session.commit_wait(commit.wait)).await
        }
    }
}

pub async fn new_asset_invocation(
    session: &Session,
    args: &NewAssetArgs,
) -> anyhow::Result<ChaincodeInvocation> {
    let text = match (&args.text, &args.data_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading requirement text from {}", path.display()))?,
        (None, None) => DEFAULT_TEXT.to_string(),
    };
    let owner = serde_json::to_string(&Owner::new(&args.first_name, &args.last_name))?;
    Ok(session.invocation("NewAsset", &[args.id.clone(), owner, text]))
}

/// `<prefix><n>` for every n in `from..=to`.
#[must_use]
pub fn bulk_ids(prefix: &str, from: u64, to: u64) -> Vec<String> {
    (from..=to).map(|n| format!("{prefix}{n}")).collect()
}

pub fn share_bulk_invocation(
    session: &Session,
    args: &ShareBulkArgs,
) -> anyhow::Result<ChaincodeInvocation> {
    let ids = bulk_ids(&args.prefix, args.from, args.to);
    if ids.is_empty() {
        anyhow::bail!("empty id range {}..={}", args.from, args.to);
    }
    let ids = serde_json::to_string(&ids)?;
    let owner = serde_json::to_string(&Owner::new(&args.first_name, &args.last_name))?;
    Ok(session.invocation("ShareAssetsBulk", &[ids, owner]))
}

async fn share_bulk(session: &Session, args: &ShareBulkArgs) -> anyhow::Result<SubmitOutcome> {
    let invocation = share_bulk_invocation(session, args)?;
    let started = chrono::Utc::now().timestamp();
    info!(
        prefix = %args.prefix,
        from = args.from,
        to = args.to,
        start = started,
        "Bulk share started"
    );
    let outcome = submit(session, invocation, session.commit_wait(args.commit.wait)).await?;
    info!(
        tx_id = %outcome.tx_id,
        end = chrono::Utc::now().timestamp(),
        "Bulk share ordered"
    );
    Ok(outcome)
}

/// Propose to the target peer, then order the endorsed transaction.
pub async fn submit(
    session: &Session,
    invocation: ChaincodeInvocation,
    commit: CommitWait,
) -> anyhow::Result<SubmitOutcome> {
    let submitter = session.submitter(commit).await?;
    let function = invocation.function.clone();

    let endorsed = submitter
        .propose(
            vec![session.target()],
            invocation,
            &session.config().submission.policy,
        )
        .await?;
    for failure in endorsed.endorsements().failures() {
        warn!(tx_id = %endorsed.tx_id().short(), %failure, "Peer did not endorse");
    }
    info!(
        tx_id = %endorsed.tx_id().short(),
        function = %function,
        endorsements = endorsed.endorsements().endorsed_count(),
        "Proposal endorsed"
    );

    Ok(submitter.order(endorsed, commit).await?)
}
