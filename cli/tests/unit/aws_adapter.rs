//! `AwsCli` argument construction and response parsing, against a recording
//! runner.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeMap;

use n8n_stack::application::ports::{DeployRequest, IdentityProbe, StackDeployer, ZoneLookup};
use n8n_stack::domain::error::{ProviderError, error_code};
use n8n_stack::infra::aws::AwsCli;

use crate::mocks::{MockCommandRunner, err_output, ok_output};

#[tokio::test]
async fn test_lookup_zone_picks_exact_public_match() {
    let runner = MockCommandRunner::with_responses(vec![ok_output(
        br#"{"HostedZones":[
            {"Id":"/hostedzone/ZPRIVATE","Name":"aws.example.com.","Config":{"PrivateZone":true}},
            {"Id":"/hostedzone/ZPUBLIC","Name":"aws.example.com.","Config":{"PrivateZone":false}},
            {"Id":"/hostedzone/ZOTHER","Name":"b.example.com.","Config":{"PrivateZone":false}}
        ]}"#,
    )]);
    let aws = AwsCli::new(runner.clone());

    let zone = aws.lookup_zone("aws.example.com", "us-east-1").await.unwrap();
    assert_eq!(zone.id, "ZPUBLIC");
    assert_eq!(zone.name, "aws.example.com");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "aws");
    assert_eq!(
        calls[0].1[..4],
        ["route53", "list-hosted-zones-by-name", "--dns-name", "aws.example.com"]
    );
}

#[tokio::test]
async fn test_lookup_zone_without_match_fails() {
    let runner = MockCommandRunner::with_responses(vec![ok_output(
        br#"{"HostedZones":[{"Id":"/hostedzone/Z1","Name":"zzz.example.com."}]}"#,
    )]);
    let aws = AwsCli::new(runner);
    let err = aws.lookup_zone("aws.example.com", "us-east-1").await.unwrap_err();
    assert!(err.to_string().contains("aws.example.com"), "got: {err}");
}

#[tokio::test]
async fn test_lookup_zone_garbage_output_is_unexpected() {
    let runner = MockCommandRunner::with_responses(vec![ok_output(b"not json")]);
    let aws = AwsCli::new(runner);
    let err = aws.lookup_zone("example.com", "us-east-1").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::UnexpectedOutput { .. })
    ));
}

#[tokio::test]
async fn test_deploy_passes_capabilities_region_and_tags() {
    let runner = MockCommandRunner::default();
    let aws = AwsCli::new(runner.clone());
    let tags = BTreeMap::from([
        ("Environment".to_string(), "PoC".to_string()),
        ("Project".to_string(), "n8n-aws".to_string()),
    ]);

    aws.deploy(&DeployRequest {
        stack_name: "N8nStack",
        region: "us-east-1",
        template_body: "{}\n",
        tags: &tags,
    })
    .await
    .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0].1;
    assert_eq!(args[..2], ["cloudformation", "deploy"]);
    let flag = |name: &str| {
        let i = args.iter().position(|a| a == name).expect(name);
        args[i + 1].clone()
    };
    assert_eq!(flag("--stack-name"), "N8nStack");
    assert_eq!(flag("--capabilities"), "CAPABILITY_IAM");
    assert_eq!(flag("--region"), "us-east-1");
    assert!(flag("--template-file").ends_with(".template.json"));
    let tag_start = args.iter().position(|a| a == "--tags").unwrap();
    assert_eq!(
        args[tag_start + 1..],
        ["Environment=PoC".to_string(), "Project=n8n-aws".to_string()]
    );

    // Stack operations wait on CloudFormation and get the long timeout.
    assert!(runner.timeouts.lock().unwrap()[0].is_some());
}

#[tokio::test]
async fn test_deploy_failure_maps_to_provider_error() {
    let runner =
        MockCommandRunner::with_responses(vec![err_output(255, b"An error occurred (ValidationError)")]);
    let aws = AwsCli::new(runner);
    let tags = BTreeMap::new();
    let err = aws
        .deploy(&DeployRequest {
            stack_name: "N8nStack",
            region: "us-east-1",
            template_body: "{}",
            tags: &tags,
        })
        .await
        .unwrap_err();
    assert_eq!(error_code(&err), "PROVIDER");
    assert!(err.to_string().contains("ValidationError"), "got: {err}");
}

#[tokio::test]
async fn test_describe_outputs_maps_known_keys() {
    let runner = MockCommandRunner::with_responses(vec![ok_output(
        br#"{"Stacks":[{"StackName":"N8nStack","Outputs":[
            {"OutputKey":"InstanceId","OutputValue":"i-0abc"},
            {"OutputKey":"PublicIP","OutputValue":"203.0.113.7"},
            {"OutputKey":"N8nUrl","OutputValue":"https://n8n.example.com"},
            {"OutputKey":"SSHCommand","OutputValue":"ssh -i ~/.ssh/n8n-key.pem ec2-user@203.0.113.7"}
        ]}]}"#,
    )]);
    let aws = AwsCli::new(runner);
    let outputs = aws.describe_outputs("N8nStack", "us-east-1").await.unwrap();
    assert!(outputs.missing().is_empty());
    assert_eq!(outputs.url.as_deref(), Some("https://n8n.example.com"));
}

#[tokio::test]
async fn test_describe_outputs_missing_stack() {
    let runner = MockCommandRunner::with_responses(vec![err_output(
        254,
        b"An error occurred (ValidationError) when calling the DescribeStacks operation: Stack with id N8nStack does not exist",
    )]);
    let aws = AwsCli::new(runner);
    let err = aws.describe_outputs("N8nStack", "us-east-1").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::StackNotFound(name)) if name == "N8nStack"
    ));
}

#[tokio::test]
async fn test_delete_waits_for_completion() {
    let runner = MockCommandRunner::default();
    let aws = AwsCli::new(runner.clone());
    aws.delete("N8nStack", "eu-west-1").await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1[..2], ["cloudformation", "delete-stack"]);
    assert_eq!(
        calls[1].1[..3],
        ["cloudformation", "wait", "stack-delete-complete"]
    );
}

#[tokio::test]
async fn test_caller_account_parses_identity() {
    let runner = MockCommandRunner::with_responses(vec![ok_output(
        br#"{"UserId":"AIDA","Account":"123456789012","Arn":"arn:aws:iam::123456789012:user/ops"}"#,
    )]);
    let aws = AwsCli::new(runner.clone());
    assert_eq!(aws.caller_account("us-east-1").await.unwrap(), "123456789012");
    assert_eq!(runner.calls()[0].1[..2], ["sts", "get-caller-identity"]);
}
