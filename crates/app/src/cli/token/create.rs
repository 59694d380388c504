use bazaar_app::{
    auth::PgAuthService,
    domain::{tenants::records::TenantUuid, users::records::UserUuid},
};
use clap::Args;
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Tenant UUID that owns the user
    #[arg(long)]
    tenant_uuid: Uuid,

    /// User the token authenticates as
    #[arg(long)]
    user_uuid: Uuid,

    /// Optional token expiration timestamp (RFC 3339)
    #[arg(long)]
    expires_at: Option<Timestamp>,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    let issued = PgAuthService::new(db)
        .issue_api_token(
            TenantUuid::from_uuid(args.tenant_uuid),
            UserUuid::from_uuid(args.user_uuid),
            args.expires_at,
        )
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.record.uuid);
    println!("tenant_uuid: {}", issued.record.tenant_uuid);
    println!("user_uuid: {}", issued.record.user_uuid);
    println!("token_created_at: {}", issued.record.created_at);
    if let Some(expires_at) = issued.record.expires_at {
        println!("token_expires_at: {expires_at}");
    }
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
