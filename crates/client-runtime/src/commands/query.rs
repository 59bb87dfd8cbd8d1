//! `oemctl query`: evaluate on the target peer. Nothing is ordered.

use super::Session;
use crate::cli::FunctionArgs;
use fc_02_submission::TransactionSubmissionApi;
use shared_types::ChaincodeInvocation;
use tracing::debug;

pub async fn run(session: &Session, args: &FunctionArgs) -> anyhow::Result<Vec<u8>> {
    evaluate(session, session.invocation(&args.function, &args.args)).await
}

pub async fn evaluate(
    session: &Session,
    invocation: ChaincodeInvocation,
) -> anyhow::Result<Vec<u8>> {
    let submitter = session.submitter(fc_02_submission::CommitWait::Skip).await?;
    debug!(function = %invocation.function, peer = %session.target(), "Evaluating");
    Ok(submitter
        .evaluate_transaction(vec![session.target()], invocation)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::session;
    use super::*;
    use crate::cli::CommitArgs;
    use crate::commands::invoke;
    use fc_02_submission::SubmitError;
    use shared_types::payloads::Requirement;
    use std::sync::atomic::Ordering;

    fn args(function: &str, args: &[&str]) -> FunctionArgs {
        FunctionArgs {
            function: function.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            commit: CommitArgs { wait: false },
        }
    }

    #[tokio::test]
    async fn test_query_reads_committed_asset_without_ordering() {
        let (session, network) = session().await;
        let owner = r#"{"firstname":"John","lastname":"Doe"}"#;
        invoke::submit(
            &session,
            session.invocation(
                "NewAsset",
                &["Req-1".to_string(), owner.to_string(), "text".to_string()],
            ),
            fc_02_submission::CommitWait::Skip,
        )
        .await
        .unwrap();
        let blocks = network.orderer().stats().blocks_cut.load(Ordering::Relaxed);

        let payload = run(&session, &args("GetAsset", &["Req-1"])).await.unwrap();
        let requirement: Requirement = serde_json::from_slice(&payload).unwrap();
        assert_eq!(requirement.id, "Req-1");
        assert_eq!(
            network.orderer().stats().blocks_cut.load(Ordering::Relaxed),
            blocks
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_endorsement_failure() {
        let (session, _) = session().await;
        let err = run(&session, &args("GetAsset", &["Req-404"]))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SubmitError>().unwrap().kind().exit_code(), 5);
        assert!(err.to_string().contains("Req-404"));
    }
}
