//! Resource graph assembler.
//!
//! Maps a validated `StackConfig` plus the resolved hosted zone onto the
//! CloudFormation resources of the single-instance topology:
//!
//! ```text
//! VPC ─ public subnet ─ route table ─ IGW
//!  ├─ EFS security group ◄── NFS from ── instance security group
//!  ├─ EFS file system ─ mount target ─ access point
//!  └─ instance (role, profile, key pair, user data) ─ EIP ─ A record
//! ```
//!
//! Logical IDs are fixed strings, so identical inputs produce an identical
//! template.

use n8n_stack_common::cfn::{self, Output, Parameter, Resource, Tag, Template};
use n8n_stack_common::outputs;
use serde_json::{Value, json};

use crate::domain::bootstrap::{self, BootParams, RenderedBoot, TemplateSet};
use crate::domain::config::StackConfig;
use crate::domain::error::SynthError;
use crate::domain::naming;
use crate::domain::zone::HostedZone;

/// Logical IDs of every declared resource.
pub mod ids {
    pub const VPC: &str = "N8nVpc";
    pub const PUBLIC_SUBNET: &str = "N8nVpcPublicSubnet1Subnet";
    pub const ROUTE_TABLE: &str = "N8nVpcPublicSubnet1RouteTable";
    pub const ROUTE_TABLE_ASSOCIATION: &str = "N8nVpcPublicSubnet1RouteTableAssociation";
    pub const DEFAULT_ROUTE: &str = "N8nVpcPublicSubnet1DefaultRoute";
    pub const INTERNET_GATEWAY: &str = "N8nVpcIGW";
    pub const GATEWAY_ATTACHMENT: &str = "N8nVpcVPCGW";
    pub const EFS_SECURITY_GROUP: &str = "EfsSecurityGroup";
    pub const INSTANCE_SECURITY_GROUP: &str = "N8nSecurityGroup";
    pub const NFS_INGRESS: &str = "EfsSecurityGroupfromN8nSecurityGroupNfs";
    pub const FILE_SYSTEM: &str = "N8nEFS";
    pub const MOUNT_TARGET: &str = "N8nEFSEfsMountTarget1";
    pub const ACCESS_POINT: &str = "N8nEFSN8nAccessPoint";
    pub const ROLE: &str = "N8nEc2Role";
    pub const INSTANCE_PROFILE: &str = "N8nInstanceInstanceProfile";
    pub const KEY_PAIR: &str = "N8nKey";
    pub const INSTANCE: &str = "N8nInstance";
    pub const ELASTIC_IP: &str = "N8nEIP";
    pub const DNS_RECORD: &str = "N8nARecord";
    pub const AMI_PARAMETER: &str = "LatestAmazonLinux2023Ami";
}

/// CloudFormation resource types used by the graph.
pub mod kinds {
    pub const VPC: &str = "AWS::EC2::VPC";
    pub const SUBNET: &str = "AWS::EC2::Subnet";
    pub const ROUTE_TABLE: &str = "AWS::EC2::RouteTable";
    pub const ROUTE_TABLE_ASSOCIATION: &str = "AWS::EC2::SubnetRouteTableAssociation";
    pub const ROUTE: &str = "AWS::EC2::Route";
    pub const INTERNET_GATEWAY: &str = "AWS::EC2::InternetGateway";
    pub const GATEWAY_ATTACHMENT: &str = "AWS::EC2::VPCGatewayAttachment";
    pub const SECURITY_GROUP: &str = "AWS::EC2::SecurityGroup";
    pub const SECURITY_GROUP_INGRESS: &str = "AWS::EC2::SecurityGroupIngress";
    pub const FILE_SYSTEM: &str = "AWS::EFS::FileSystem";
    pub const MOUNT_TARGET: &str = "AWS::EFS::MountTarget";
    pub const ACCESS_POINT: &str = "AWS::EFS::AccessPoint";
    pub const ROLE: &str = "AWS::IAM::Role";
    pub const INSTANCE_PROFILE: &str = "AWS::IAM::InstanceProfile";
    pub const KEY_PAIR: &str = "AWS::EC2::KeyPair";
    pub const INSTANCE: &str = "AWS::EC2::Instance";
    pub const ELASTIC_IP: &str = "AWS::EC2::EIP";
    pub const RECORD_SET: &str = "AWS::Route53::RecordSet";
}

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const PUBLIC_SUBNET_CIDR: &str = "10.0.0.0/24";
pub const NFS_PORT: u16 = 2049;
pub const ACCESS_POINT_PATH: &str = "/n8n-data";
pub const RECORD_TTL: &str = "1800";

/// Managed policies attached to the instance role, in attachment order.
pub const MANAGED_POLICIES: &[&str] = &[
    "CloudWatchAgentServerPolicy",
    "AmazonElasticFileSystemClientFullAccess",
];

/// Public ports opened on the instance security group.
const PUBLIC_INGRESS: &[(u16, &str)] = &[
    (443, "Allow HTTPS traffic"),
    (80, "Allow HTTP traffic"),
    (22, "Allow SSH access"),
];

/// Stand-in for the file system ID inside rendered user data; replaced by a
/// `Ref` when the user data becomes an `Fn::Join`.
pub const FILE_SYSTEM_ID_TOKEN: &str = "${Token[N8nEFS.Ref]}";

const AL2023_X86_64: &str = "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-6.1-x86_64";
const AL2023_ARM64: &str = "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-6.1-arm64";

/// The assembled template plus the boot payload embedded in it.
#[derive(Debug, Clone)]
pub struct SynthesizedStack {
    pub stack_name: String,
    pub template: Template,
    /// Boot payload with the file system ID left as `FILE_SYSTEM_ID_TOKEN`.
    pub boot: RenderedBoot,
}

impl SynthesizedStack {
    /// Template body as submitted to CloudFormation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn template_body(&self) -> serde_json::Result<String> {
        self.template.to_json_pretty()
    }
}

/// Tag property name for taggable resource types.
#[must_use]
pub fn tag_property(kind: &str) -> Option<&'static str> {
    match kind {
        kinds::VPC
        | kinds::SUBNET
        | kinds::ROUTE_TABLE
        | kinds::INTERNET_GATEWAY
        | kinds::SECURITY_GROUP
        | kinds::ROLE
        | kinds::KEY_PAIR
        | kinds::INSTANCE
        | kinds::ELASTIC_IP => Some("Tags"),
        kinds::FILE_SYSTEM => Some("FileSystemTags"),
        kinds::ACCESS_POINT => Some("AccessPointTags"),
        _ => None,
    }
}

/// SSM parameter path of the latest Amazon Linux 2023 AMI for the instance's
/// architecture.
#[must_use]
pub fn ami_parameter_path(instance_type: &str) -> &'static str {
    if naming::is_arm64_instance_type(instance_type) {
        AL2023_ARM64
    } else {
        AL2023_X86_64
    }
}

/// Assemble the full template.
///
/// `config` must already have passed `StackConfig::validate`.
///
/// # Errors
///
/// Returns `SynthError::DomainOutsideZone` when the application domain is not
/// a subdomain of `zone`, and propagates template rendering errors.
pub fn assemble(
    config: &StackConfig,
    zone: &HostedZone,
    templates: &TemplateSet,
) -> anyhow::Result<SynthesizedStack> {
    let domain = config.domain_name();
    if naming::record_label(&domain, &zone.name).is_none() {
        return Err(SynthError::DomainOutsideZone {
            domain,
            zone: zone.name.clone(),
        }
        .into());
    }

    let boot = bootstrap::render_boot(
        templates,
        &BootParams {
            domain_name: &domain,
            certbot_email: &config.certificate.email,
            file_system_id: FILE_SYSTEM_ID_TOKEN,
            region: &config.env.region,
            timezone: &config.app.timezone,
            n8n_image: &config.app.image,
        },
    )?;

    let stack = &config.stack.name;
    let mut t = Template::new(Some(config.stack.description.clone()));

    t.add_parameter(
        ids::AMI_PARAMETER,
        Parameter {
            kind: "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>".to_string(),
            default: Some(ami_parameter_path(&config.instance.instance_type).to_string()),
            description: Some("Latest Amazon Linux 2023 AMI".to_string()),
        },
    )
    .map_err(SynthError::from)?;

    add_network(&mut t, stack)?;
    add_security_groups(&mut t)?;
    add_storage(&mut t, stack)?;
    add_identity(&mut t, config)?;
    add_compute(&mut t, config, &boot)?;
    add_addressing(&mut t, &domain, zone)?;
    add_outputs(&mut t, config)?;

    let tags: Vec<Tag> = config
        .stack
        .tags
        .iter()
        .map(|(k, v)| Tag::new(k, v))
        .collect();
    t.apply_tags(&tags, tag_property);
    t.check_dependencies().map_err(SynthError::from)?;

    Ok(SynthesizedStack {
        stack_name: stack.clone(),
        template: t,
        boot,
    })
}

fn name_tag(value: &str) -> Value {
    json!([{ "Key": "Name", "Value": value }])
}

fn add(t: &mut Template, id: &str, resource: Resource) -> Result<(), SynthError> {
    t.add_resource(id, resource).map_err(SynthError::from)
}

fn add_network(t: &mut Template, stack: &str) -> Result<(), SynthError> {
    let vpc_name = format!("{stack}/{}", ids::VPC);
    let subnet_name = format!("{vpc_name}/publicSubnet1");

    add(
        t,
        ids::VPC,
        Resource::new(kinds::VPC)
            .property("CidrBlock", json!(VPC_CIDR))
            .property("EnableDnsHostnames", json!(true))
            .property("EnableDnsSupport", json!(true))
            .property("InstanceTenancy", json!("default"))
            .property("Tags", name_tag(&vpc_name)),
    )?;
    add(
        t,
        ids::PUBLIC_SUBNET,
        Resource::new(kinds::SUBNET)
            .property("AvailabilityZone", cfn::first_availability_zone())
            .property("CidrBlock", json!(PUBLIC_SUBNET_CIDR))
            .property("MapPublicIpOnLaunch", json!(true))
            .property("VpcId", cfn::reference(ids::VPC))
            .property("Tags", name_tag(&subnet_name)),
    )?;
    add(
        t,
        ids::ROUTE_TABLE,
        Resource::new(kinds::ROUTE_TABLE)
            .property("VpcId", cfn::reference(ids::VPC))
            .property("Tags", name_tag(&subnet_name)),
    )?;
    add(
        t,
        ids::ROUTE_TABLE_ASSOCIATION,
        Resource::new(kinds::ROUTE_TABLE_ASSOCIATION)
            .property("RouteTableId", cfn::reference(ids::ROUTE_TABLE))
            .property("SubnetId", cfn::reference(ids::PUBLIC_SUBNET)),
    )?;
    add(
        t,
        ids::INTERNET_GATEWAY,
        Resource::new(kinds::INTERNET_GATEWAY).property("Tags", name_tag(&vpc_name)),
    )?;
    add(
        t,
        ids::GATEWAY_ATTACHMENT,
        Resource::new(kinds::GATEWAY_ATTACHMENT)
            .property("InternetGatewayId", cfn::reference(ids::INTERNET_GATEWAY))
            .property("VpcId", cfn::reference(ids::VPC)),
    )?;
    add(
        t,
        ids::DEFAULT_ROUTE,
        Resource::new(kinds::ROUTE)
            .property("DestinationCidrBlock", json!("0.0.0.0/0"))
            .property("GatewayId", cfn::reference(ids::INTERNET_GATEWAY))
            .property("RouteTableId", cfn::reference(ids::ROUTE_TABLE))
            .depends_on(ids::GATEWAY_ATTACHMENT),
    )
}

fn add_security_groups(t: &mut Template) -> Result<(), SynthError> {
    // allowAllOutbound=false is expressed as a single unroutable egress rule,
    // which replaces the implicit allow-all rule EC2 would otherwise add.
    add(
        t,
        ids::EFS_SECURITY_GROUP,
        Resource::new(kinds::SECURITY_GROUP)
            .property("GroupDescription", json!("Security group for EFS"))
            .property(
                "SecurityGroupEgress",
                json!([{
                    "CidrIp": "255.255.255.255/32",
                    "Description": "Disallow all traffic",
                    "FromPort": 252,
                    "IpProtocol": "icmp",
                    "ToPort": 86,
                }]),
            )
            .property("VpcId", cfn::reference(ids::VPC)),
    )?;

    let ingress: Vec<Value> = PUBLIC_INGRESS
        .iter()
        .map(|(port, description)| {
            json!({
                "CidrIp": "0.0.0.0/0",
                "Description": description,
                "FromPort": port,
                "IpProtocol": "tcp",
                "ToPort": port,
            })
        })
        .collect();
    add(
        t,
        ids::INSTANCE_SECURITY_GROUP,
        Resource::new(kinds::SECURITY_GROUP)
            .property("GroupDescription", json!("Security group for n8n EC2 instance"))
            .property(
                "SecurityGroupEgress",
                json!([{
                    "CidrIp": "0.0.0.0/0",
                    "Description": "Allow all outbound traffic by default",
                    "IpProtocol": "-1",
                }]),
            )
            .property("SecurityGroupIngress", Value::Array(ingress))
            .property("VpcId", cfn::reference(ids::VPC)),
    )?;

    add(
        t,
        ids::NFS_INGRESS,
        Resource::new(kinds::SECURITY_GROUP_INGRESS)
            .property("Description", json!("Allow NFS access from EC2"))
            .property("FromPort", json!(NFS_PORT))
            .property("GroupId", cfn::get_att(ids::EFS_SECURITY_GROUP, "GroupId"))
            .property("IpProtocol", json!("tcp"))
            .property(
                "SourceSecurityGroupId",
                cfn::get_att(ids::INSTANCE_SECURITY_GROUP, "GroupId"),
            )
            .property("ToPort", json!(NFS_PORT)),
    )
}

fn add_storage(t: &mut Template, stack: &str) -> Result<(), SynthError> {
    add(
        t,
        ids::FILE_SYSTEM,
        Resource::new(kinds::FILE_SYSTEM)
            .property("Encrypted", json!(true))
            .property(
                "FileSystemTags",
                name_tag(&format!("{stack}/{}", ids::FILE_SYSTEM)),
            )
            .property(
                "LifecyclePolicies",
                json!([{ "TransitionToIA": "AFTER_30_DAYS" }]),
            )
            .property("PerformanceMode", json!("generalPurpose"))
            .property("ThroughputMode", json!("bursting"))
            .destroy_with_stack(),
    )?;
    add(
        t,
        ids::MOUNT_TARGET,
        Resource::new(kinds::MOUNT_TARGET)
            .property("FileSystemId", cfn::reference(ids::FILE_SYSTEM))
            .property(
                "SecurityGroups",
                json!([cfn::get_att(ids::EFS_SECURITY_GROUP, "GroupId")]),
            )
            .property("SubnetId", cfn::reference(ids::PUBLIC_SUBNET)),
    )?;
    add(
        t,
        ids::ACCESS_POINT,
        Resource::new(kinds::ACCESS_POINT)
            .property("FileSystemId", cfn::reference(ids::FILE_SYSTEM))
            .property(
                "PosixUser",
                json!({ "Gid": bootstrap::POSIX_GID, "Uid": bootstrap::POSIX_UID }),
            )
            .property("RootDirectory", json!({ "Path": ACCESS_POINT_PATH })),
    )
}

fn add_identity(t: &mut Template, config: &StackConfig) -> Result<(), SynthError> {
    let policies: Vec<Value> = MANAGED_POLICIES
        .iter()
        .map(|name| cfn::managed_policy_arn(name))
        .collect();
    add(
        t,
        ids::ROLE,
        Resource::new(kinds::ROLE)
            .property(
                "AssumeRolePolicyDocument",
                json!({
                    "Statement": [{
                        "Action": "sts:AssumeRole",
                        "Effect": "Allow",
                        "Principal": { "Service": "ec2.amazonaws.com" },
                    }],
                    "Version": "2012-10-17",
                }),
            )
            .property("ManagedPolicyArns", Value::Array(policies)),
    )?;
    add(
        t,
        ids::INSTANCE_PROFILE,
        Resource::new(kinds::INSTANCE_PROFILE)
            .property("Roles", json!([cfn::reference(ids::ROLE)])),
    )?;
    add(
        t,
        ids::KEY_PAIR,
        Resource::new(kinds::KEY_PAIR).property("KeyName", json!(config.instance.key_name)),
    )
}

fn add_compute(t: &mut Template, config: &StackConfig, boot: &RenderedBoot) -> Result<(), SynthError> {
    let user_data = cfn::interpolate(
        &boot.user_data,
        &[(FILE_SYSTEM_ID_TOKEN, cfn::reference(ids::FILE_SYSTEM))],
    );
    add(
        t,
        ids::INSTANCE,
        Resource::new(kinds::INSTANCE)
            .property("AvailabilityZone", cfn::first_availability_zone())
            .property("IamInstanceProfile", cfn::reference(ids::INSTANCE_PROFILE))
            .property("ImageId", cfn::reference(ids::AMI_PARAMETER))
            .property("InstanceType", json!(config.instance.instance_type))
            .property("KeyName", cfn::reference(ids::KEY_PAIR))
            .property(
                "SecurityGroupIds",
                json!([cfn::get_att(ids::INSTANCE_SECURITY_GROUP, "GroupId")]),
            )
            .property("SubnetId", cfn::reference(ids::PUBLIC_SUBNET))
            .property("UserData", cfn::base64(user_data))
            .property(
                "Tags",
                name_tag(&format!("{}/{}", config.stack.name, ids::INSTANCE)),
            )
            // Internet access and the NFS endpoint must exist before the boot
            // script runs.
            .depends_on(ids::DEFAULT_ROUTE)
            .depends_on(ids::ROUTE_TABLE_ASSOCIATION)
            .depends_on(ids::MOUNT_TARGET)
            .depends_on(ids::NFS_INGRESS)
            .depends_on(ids::ROLE),
    )
}

fn add_addressing(t: &mut Template, domain: &str, zone: &HostedZone) -> Result<(), SynthError> {
    add(
        t,
        ids::ELASTIC_IP,
        Resource::new(kinds::ELASTIC_IP)
            .property("Domain", json!("vpc"))
            .property("InstanceId", cfn::reference(ids::INSTANCE)),
    )?;
    add(
        t,
        ids::DNS_RECORD,
        Resource::new(kinds::RECORD_SET)
            .property("HostedZoneId", json!(zone.id))
            .property("Name", json!(naming::fqdn(domain)))
            .property("ResourceRecords", json!([cfn::reference(ids::ELASTIC_IP)]))
            .property("TTL", json!(RECORD_TTL))
            .property("Type", json!("A")),
    )
}

fn add_outputs(t: &mut Template, config: &StackConfig) -> Result<(), SynthError> {
    let entries = [
        (
            outputs::INSTANCE_ID,
            cfn::reference(ids::INSTANCE),
            "EC2 Instance ID",
        ),
        (
            outputs::PUBLIC_IP,
            cfn::reference(ids::ELASTIC_IP),
            "Elastic IP address",
        ),
        (
            outputs::APP_URL,
            json!(config.app_url()),
            "n8n Application URL",
        ),
        (
            outputs::SSH_COMMAND,
            cfn::join(
                "",
                vec![
                    json!(format!(
                        "ssh -i ~/.ssh/{}.pem ec2-user@",
                        config.instance.key_name
                    )),
                    cfn::reference(ids::ELASTIC_IP),
                ],
            ),
            "SSH command to connect to the instance",
        ),
    ];
    for (id, value, description) in entries {
        t.add_output(
            id,
            Output {
                value,
                description: Some(description.to_string()),
            },
        )?;
    }
    Ok(())
}
