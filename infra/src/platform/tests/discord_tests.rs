//! Tests for the Discord REST adapter

use gg_core::domain::entities::TenantId;
use gg_core::domain::value_objects::{BotMember, PlatformError, RoleAssignment};
use gg_core::services::audit::{AuditChannelError, AuditChannelTrait};
use gg_core::services::verification::PlatformServiceTrait;
use gg_shared::PlatformConfig;

use crate::platform::discord::{compute_bot_member, DiscordRestPlatform, RoleInfo, ADMINISTRATOR, MANAGE_ROLES};
use crate::test_server::{CapturedRequest, StubServer};

const GUILD: u64 = 1000;

fn platform(server: &StubServer) -> DiscordRestPlatform {
    DiscordRestPlatform::new(PlatformConfig {
        bot_token: "token-abc".to_string(),
        api_base: server.url(),
    })
    .unwrap()
}

fn guild_api(request: &CapturedRequest) -> (u16, String) {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/users/@me") => (200, r#"{"id":"42","username":"gate"}"#.to_string()),
        ("GET", "/guilds/1000/roles") => (
            200,
            r#"[
                {"id":"1000","name":"@everyone","position":0,"permissions":"0"},
                {"id":"900","name":"Verified","position":2,"permissions":"0"},
                {"id":"800","name":"Gatekeeper","position":5,"permissions":"268435456"}
            ]"#
            .to_string(),
        ),
        ("GET", "/guilds/1000/members/42") => (200, r#"{"roles":["800"]}"#.to_string()),
        ("GET", "/guilds/1000/members/77") => (200, r#"{"roles":["900"]}"#.to_string()),
        ("GET", "/guilds/1000/channels") => (
            200,
            r#"[
                {"id":"1","name":"general","type":0},
                {"id":"2","name":"verification-logs","type":2},
                {"id":"3","name":"verification-logs","type":0}
            ]"#
            .to_string(),
        ),
        ("POST", "/channels/3/messages") => (200, r#"{"id":"555"}"#.to_string()),
        ("PUT", "/guilds/1000/members/77/roles/900") => (204, String::new()),
        ("PUT", "/guilds/1000/members/78/roles/900") => (403, r#"{"code":50013}"#.to_string()),
        ("PUT", _) => (502, String::new()),
        _ => (404, r#"{"message":"Unknown"}"#.to_string()),
    }
}

#[test]
fn test_compute_bot_member_uses_member_roles_and_everyone() {
    let roles = vec![
        RoleInfo { id: GUILD, position: 0, permissions: 0 },
        RoleInfo { id: 1, position: 3, permissions: 0 },
        RoleInfo { id: 2, position: 7, permissions: MANAGE_ROLES },
        RoleInfo { id: 3, position: 9, permissions: MANAGE_ROLES },
    ];

    assert_eq!(
        compute_bot_member(GUILD, &roles, &[1, 2]),
        BotMember { can_manage_roles: true, top_role_position: 7 }
    );
    assert_eq!(
        compute_bot_member(GUILD, &roles, &[1]),
        BotMember { can_manage_roles: false, top_role_position: 3 }
    );
}

#[test]
fn test_compute_bot_member_everyone_and_administrator_grant_management() {
    let everyone = vec![RoleInfo { id: GUILD, position: 0, permissions: MANAGE_ROLES }];
    assert!(compute_bot_member(GUILD, &everyone, &[]).can_manage_roles);

    let admin = vec![RoleInfo { id: 5, position: 4, permissions: ADMINISTRATOR }];
    let bot = compute_bot_member(GUILD, &admin, &[5]);
    assert!(bot.can_manage_roles);
    assert_eq!(bot.top_role_position, 4);
}

#[test]
fn test_empty_token_is_rejected() {
    assert!(DiscordRestPlatform::new(PlatformConfig::new("")).is_err());
}

#[actix_web::test]
async fn test_find_role_by_exact_name() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);

    let role = platform.find_role(TenantId(GUILD), "Verified").await.unwrap().unwrap();
    assert_eq!(role.id, 900);
    assert_eq!(role.position, 2);
    assert_eq!(platform.find_role(TenantId(GUILD), "verified").await.unwrap(), None);

    let auth = server.requests()[0].header("authorization").map(str::to_string);
    assert_eq!(auth.as_deref(), Some("Bot token-abc"));
}

#[actix_web::test]
async fn test_fetch_member_and_absent_member() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);

    let member = platform.fetch_member(TenantId(GUILD), 77).await.unwrap().unwrap();
    assert_eq!(member.user_id, 77);
    assert!(member.has_role(900));

    assert_eq!(platform.fetch_member(TenantId(GUILD), 12345).await.unwrap(), None);
}

#[actix_web::test]
async fn test_bot_member_is_computed_and_identity_cached() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);

    let first = platform.bot_member(TenantId(GUILD)).await.unwrap().unwrap();
    let second = platform.bot_member(TenantId(GUILD)).await.unwrap().unwrap();

    assert_eq!(first, BotMember { can_manage_roles: true, top_role_position: 5 });
    assert_eq!(first, second);
    let identity_calls = server
        .requests()
        .iter()
        .filter(|r| r.path == "/users/@me")
        .count();
    assert_eq!(identity_calls, 1);
}

#[actix_web::test]
async fn test_bot_outside_guild_is_absent() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);
    assert_eq!(platform.bot_member(TenantId(7)).await.unwrap(), None);
}

#[actix_web::test]
async fn test_assign_role_status_mapping() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);
    let tenant = TenantId(GUILD);

    assert_eq!(
        platform.assign_role(tenant, 77, 900, "User completed email verification").await,
        RoleAssignment::Success
    );
    assert_eq!(
        platform.assign_role(tenant, 78, 900, "reason").await,
        RoleAssignment::Forbidden
    );
    assert!(matches!(
        platform.assign_role(tenant, 79, 900, "reason").await,
        RoleAssignment::TransientError(_)
    ));

    let put = server
        .requests()
        .into_iter()
        .find(|r| r.path == "/guilds/1000/members/77/roles/900")
        .unwrap();
    assert_eq!(put.header("x-audit-log-reason"), Some("User completed email verification"));
}

#[actix_web::test]
async fn test_lookup_forbidden_and_server_error() {
    let server = StubServer::start(|request| match request.path.as_str() {
        "/guilds/1/roles" => (403, String::new()),
        _ => (500, String::new()),
    })
    .await;
    let platform = platform(&server);

    assert_eq!(platform.find_role(TenantId(1), "Verified").await, Err(PlatformError::Forbidden));
    assert!(matches!(
        platform.find_role(TenantId(2), "Verified").await,
        Err(PlatformError::Transient(_))
    ));
}

#[actix_web::test]
async fn test_append_posts_to_named_text_channel() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);

    platform
        .append(TenantId(GUILD), "verification-logs", "✅ alice verified with a@uni.edu")
        .await
        .unwrap();

    let post = server
        .requests()
        .into_iter()
        .find(|r| r.method == "POST")
        .unwrap();
    assert_eq!(post.path, "/channels/3/messages");
    let body: serde_json::Value = serde_json::from_str(&post.body).unwrap();
    assert_eq!(body["content"], "✅ alice verified with a@uni.edu");
}

#[actix_web::test]
async fn test_append_without_channel_reports_missing() {
    let server = StubServer::start(guild_api).await;
    let platform = platform(&server);

    let result = platform.append(TenantId(GUILD), "mod-log", "line").await;
    assert_eq!(result, Err(AuditChannelError::ChannelMissing("mod-log".to_string())));
}
