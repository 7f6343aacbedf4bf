//! Discord REST adapter
//!
//! Implements both [`PlatformServiceTrait`] and [`AuditChannelTrait`] over
//! the bot HTTP API. The bot's own user id is fetched once and cached.
//!
//! Status mapping:
//! - 404 on a lookup is "absent" (`Ok(None)`)
//! - 403 is a permission refusal
//! - every other failure, 429 included, is transient

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;

use gg_core::domain::entities::TenantId;
use gg_core::domain::value_objects::{
    BotMember, PlatformError, PlatformMember, PlatformRole, RoleAssignment,
};
use gg_core::services::audit::{AuditChannelError, AuditChannelTrait};
use gg_core::services::verification::PlatformServiceTrait;
use gg_shared::PlatformConfig;

use crate::InfrastructureError;

/// Permission bit allowing role management
pub const MANAGE_ROLES: u64 = 1 << 28;
/// Permission bit implying every other permission
pub const ADMINISTRATOR: u64 = 1 << 3;

const TEXT_CHANNEL: u8 = 0;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RoleDto {
    id: String,
    name: String,
    position: i64,
    #[serde(default)]
    permissions: String,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MemberDto {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelDto {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

/// Role with its permission bits, as needed to judge the bot's reach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: u64,
    pub position: i64,
    pub permissions: u64,
}

/// Work out what the bot may do from the guild's roles and its own role ids
///
/// The `@everyone` role shares the guild's id and applies to every member.
pub fn compute_bot_member(guild_id: u64, roles: &[RoleInfo], member_role_ids: &[u64]) -> BotMember {
    let mut permissions = 0u64;
    let mut top_role_position = 0i64;

    for role in roles {
        if role.id == guild_id {
            permissions |= role.permissions;
        } else if member_role_ids.contains(&role.id) {
            permissions |= role.permissions;
            top_role_position = top_role_position.max(role.position);
        }
    }

    BotMember {
        can_manage_roles: permissions & (MANAGE_ROLES | ADMINISTRATOR) != 0,
        top_role_position,
    }
}

fn parse_snowflake(value: &str) -> Result<u64, PlatformError> {
    value
        .parse()
        .map_err(|_| PlatformError::Transient(format!("malformed id in response: {}", value)))
}

fn parse_permissions(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Discord bot REST client
pub struct DiscordRestPlatform {
    client: reqwest::Client,
    config: PlatformConfig,
    bot_user_id: OnceCell<u64>,
}

impl DiscordRestPlatform {
    /// Create a new adapter from configuration
    pub fn new(config: PlatformConfig) -> Result<Self, InfrastructureError> {
        if config.bot_token.is_empty() {
            return Err(InfrastructureError::Config(
                "DISCORD_TOKEN must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        tracing::info!(api_base = %config.api_base, "Discord REST adapter initialized");

        Ok(Self {
            client,
            config,
            bot_user_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("Bot {}", self.config.bot_token),
        )
    }

    /// GET a JSON resource; 404 yields `None`
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, PlatformError> {
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(path = path, error = %e, event = "platform_request_failed", "Discord request failed");
                PlatformError::Transient(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(PlatformError::Forbidden);
        }
        if !status.is_success() {
            tracing::warn!(
                path = path,
                status = status.as_u16(),
                event = "platform_unexpected_status",
                "Discord returned an error status"
            );
            return Err(PlatformError::Transient(format!("{} from {}", status, path)));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| PlatformError::Transient(format!("invalid response from {}: {}", path, e)))
    }

    async fn bot_user_id(&self) -> Result<u64, PlatformError> {
        self.bot_user_id
            .get_or_try_init(|| async {
                let user: UserDto = self
                    .get_json("/users/@me")
                    .await?
                    .ok_or_else(|| PlatformError::Transient("bot user not found".to_string()))?;
                parse_snowflake(&user.id)
            })
            .await
            .copied()
    }

    async fn roles(&self, tenant: TenantId) -> Result<Vec<RoleDto>, PlatformError> {
        Ok(self
            .get_json(&format!("/guilds/{}/roles", tenant))
            .await?
            .unwrap_or_default())
    }

    async fn member_roles(&self, tenant: TenantId, user_id: u64) -> Result<Option<Vec<u64>>, PlatformError> {
        let member: Option<MemberDto> = self
            .get_json(&format!("/guilds/{}/members/{}", tenant, user_id))
            .await?;
        member
            .map(|m| {
                m.roles
                    .iter()
                    .map(|id| parse_snowflake(id))
                    .collect::<Result<Vec<u64>, PlatformError>>()
            })
            .transpose()
    }

    async fn find_text_channel(&self, tenant: TenantId, name: &str) -> Result<Option<u64>, PlatformError> {
        let channels: Vec<ChannelDto> = self
            .get_json(&format!("/guilds/{}/channels", tenant))
            .await?
            .unwrap_or_default();

        channels
            .into_iter()
            .find(|c| c.kind == TEXT_CHANNEL && c.name.as_deref() == Some(name))
            .map(|c| parse_snowflake(&c.id))
            .transpose()
    }
}

#[async_trait]
impl PlatformServiceTrait for DiscordRestPlatform {
    async fn find_role(&self, tenant: TenantId, name: &str) -> Result<Option<PlatformRole>, PlatformError> {
        for role in self.roles(tenant).await? {
            if role.name == name {
                return Ok(Some(PlatformRole {
                    id: parse_snowflake(&role.id)?,
                    name: role.name,
                    position: role.position,
                }));
            }
        }
        Ok(None)
    }

    async fn fetch_member(
        &self,
        tenant: TenantId,
        user_id: u64,
    ) -> Result<Option<PlatformMember>, PlatformError> {
        Ok(self
            .member_roles(tenant, user_id)
            .await?
            .map(|role_ids| PlatformMember { user_id, role_ids }))
    }

    async fn bot_member(&self, tenant: TenantId) -> Result<Option<BotMember>, PlatformError> {
        let bot_id = self.bot_user_id().await?;
        let Some(member_role_ids) = self.member_roles(tenant, bot_id).await? else {
            return Ok(None);
        };

        let roles = self
            .roles(tenant)
            .await?
            .into_iter()
            .map(|r| {
                Ok(RoleInfo {
                    id: parse_snowflake(&r.id)?,
                    position: r.position,
                    permissions: parse_permissions(&r.permissions),
                })
            })
            .collect::<Result<Vec<_>, PlatformError>>()?;

        Ok(Some(compute_bot_member(tenant.as_u64(), &roles, &member_role_ids)))
    }

    async fn assign_role(&self, tenant: TenantId, user_id: u64, role_id: u64, reason: &str) -> RoleAssignment {
        let path = format!("/guilds/{}/members/{}/roles/{}", tenant, user_id, role_id);
        let response = self
            .authorize(self.client.put(self.url(&path)))
            .header("X-Audit-Log-Reason", reason)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => RoleAssignment::Success,
            Ok(response) if response.status() == reqwest::StatusCode::FORBIDDEN => {
                RoleAssignment::Forbidden
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!(
                    tenant_id = %tenant,
                    user_id = user_id,
                    status = status.as_u16(),
                    event = "role_assign_failed",
                    "Role assignment returned an error status"
                );
                RoleAssignment::TransientError(format!("{} from role assignment", status))
            }
            Err(e) => RoleAssignment::TransientError(e.to_string()),
        }
    }
}

#[async_trait]
impl AuditChannelTrait for DiscordRestPlatform {
    async fn append(&self, tenant: TenantId, channel: &str, line: &str) -> Result<(), AuditChannelError> {
        let channel_id = match self.find_text_channel(tenant, channel).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(AuditChannelError::ChannelMissing(channel.to_string())),
            Err(PlatformError::Forbidden) => {
                return Err(AuditChannelError::CannotSend(channel.to_string()))
            }
            Err(PlatformError::Transient(message)) => {
                return Err(AuditChannelError::Transport(message))
            }
        };

        let response = self
            .authorize(self.client.post(self.url(&format!("/channels/{}/messages", channel_id))))
            .json(&MessageBody { content: line })
            .send()
            .await
            .map_err(|e| AuditChannelError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::FORBIDDEN {
            Err(AuditChannelError::CannotSend(channel.to_string()))
        } else {
            Err(AuditChannelError::Transport(format!(
                "{} posting to #{}",
                status, channel
            )))
        }
    }
}
