//! The self-maintenance pipeline that redeploys this workspace's output on
//! every push to the release branch.

use accountstack_core::{AccountStackError, EnvironmentRegistry, PipelineSourceKind, SynthConfig};
use serde_json::{json, Value};
use tracing::debug;

use crate::catalog;
use crate::error::SynthResult;
use crate::model::{reference, DeclarationSet, Layer, ResourceDeclaration, ResourceId, ResourceKind, StackSpec};
use crate::shared::bootstrap_role_arn;

/// Logical name of the build project.
pub const BUILD_PROJECT: &str = "CDKAppBuilder";
/// Logical name of the approval notification topic.
pub const NOTIFICATION_TOPIC: &str = "IamPipelineEmailTopic";
/// Logical name of the pipeline.
pub const PIPELINE: &str = "SEIamPipeline";

const APPROVAL_NOTE: &str = "There are new IAM Policy changes from the SE team. Please review.";

/// Declare the pipeline in the root account. The pipeline is ordered after
/// every id in `upstream`, which the caller fills with the run's managed
/// policies and permission sets.
///
/// # Errors
/// Fails with `MissingConfiguration` when the source is GitHub and no
/// connection ARN is configured, and with `InvalidConfiguration` when the
/// GitHub repository is not an `owner/repo` pair.
pub fn declare_pipeline(
    registry: &EnvironmentRegistry,
    config: &SynthConfig,
    upstream: &[ResourceId],
) -> SynthResult<DeclarationSet> {
    let root = registry.root();
    let source = source_action(registry, config)?;

    let mut set = DeclarationSet::new();
    set.add_stack(StackSpec::new(
        catalog::PIPELINE_STACK,
        root,
        "This stack contains the CI/CD pipeline for IAM permissions.",
    ));

    let publishing_roles: Vec<String> = ["file-publishing", "image-publishing", "deploy"]
        .iter()
        .map(|role| bootstrap_role_arn(role, "*", root.region.as_str()))
        .collect();
    let project_id = ResourceId::new(&root.name, BUILD_PROJECT);
    set.push(
        ResourceDeclaration::new(
            project_id.clone(),
            ResourceKind::BuildProject,
            catalog::PIPELINE_STACK,
            json!({
                "buildSpec": "buildspec.yml",
                "environment": { "buildImage": "AMAZON_LINUX_2_ARM_3", "computeType": "SMALL" },
                "policyStatements": [{
                    "sid": "extraPermissionsRequiredForPublishingAssets",
                    "effect": "Allow",
                    "actions": ["sts:AssumeRole"],
                    "resources": publishing_roles,
                }],
            }),
        )
        .in_layer(Layer::Pipeline),
    );

    let topic_id = ResourceId::new(&root.name, NOTIFICATION_TOPIC);
    set.push(
        ResourceDeclaration::new(
            topic_id.clone(),
            ResourceKind::NotificationTopic,
            catalog::PIPELINE_STACK,
            json!({
                "topicName": NOTIFICATION_TOPIC,
                "displayName": "SE IAM Pipeline Notification Topic",
            }),
        )
        .in_layer(Layer::Pipeline),
    );

    let mut pipeline = ResourceDeclaration::new(
        ResourceId::new(&root.name, PIPELINE),
        ResourceKind::Pipeline,
        catalog::PIPELINE_STACK,
        json!({
            "pipelineName": PIPELINE,
            "stages": [
                { "name": "Source", "actions": [source] },
                { "name": "ManualApproval1", "actions": [{
                    "name": "ManualApproval1",
                    "additionalInformation": APPROVAL_NOTE,
                    "notificationTopic": reference(&topic_id, "arn"),
                }] },
                { "name": "ManualApproval2", "actions": [{
                    "name": "ManualApproval2",
                    "additionalInformation": APPROVAL_NOTE,
                }] },
                { "name": "Build", "actions": [{
                    "name": "CodeBuild",
                    "project": reference(&project_id, "name"),
                    "input": "SE_IAMSourceOutput",
                    "outputs": ["SE_IAMBuildOutput"],
                }] },
            ],
        }),
    )
    .in_layer(Layer::Pipeline)
    .with_dependency(&project_id)
    .with_dependency(&topic_id);
    pipeline.depends_on.extend(upstream.iter().cloned());
    set.push(pipeline);

    debug!(
        source = ?config.pipeline_source,
        upstream = upstream.len(),
        "declared self-maintenance pipeline"
    );
    Ok(set)
}

fn source_action(registry: &EnvironmentRegistry, config: &SynthConfig) -> SynthResult<Value> {
    let root = registry.root();
    let action = match config.pipeline_source {
        PipelineSourceKind::CodeCommit => json!({
            "name": "CodeCommit",
            "provider": "codecommit",
            "repositoryArn": format!(
                "arn:aws:codecommit:{}:{}:{}",
                root.region, root.account, config.pipeline_repository
            ),
            "branch": config.pipeline_branch,
            "output": "SE_IAMSourceOutput",
        }),
        PipelineSourceKind::GitHub => {
            let connection_arn = config.require_pipeline_connection_arn()?;
            let (owner, repo) = github_repository(&config.pipeline_repository)?;
            json!({
                "name": "GitHub",
                "provider": "codestar-connections",
                "owner": owner,
                "repo": repo,
                "branch": config.pipeline_branch,
                "connectionArn": connection_arn,
                "output": "SE_IAMSourceOutput",
            })
        }
    };
    Ok(action)
}

/// Split a GitHub `owner/repo` pair; both halves must be non-empty.
fn github_repository(value: &str) -> SynthResult<(&str, &str)> {
    match value.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(AccountStackError::InvalidConfiguration {
            name: "PIPELINE_REPOSITORY".to_owned(),
            reason: format!("expected owner/repo for a GitHub source, got {value:?}"),
        }
        .into()),
    }
}
