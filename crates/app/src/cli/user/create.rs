use bazaar_app::domain::{
    tenants::records::TenantUuid,
    users::{
        PgUsersService, UsersService,
        data::NewUser,
        records::{UserRole, UserUuid},
    },
};
use clap::Args;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Tenant the user belongs to
    #[arg(long)]
    tenant_uuid: Uuid,

    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    /// buyer, seller or admin
    #[arg(long, default_value = "buyer")]
    role: UserRole,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    let user = PgUsersService::new(db)
        .create_user(
            TenantUuid::from_uuid(args.tenant_uuid),
            NewUser {
                uuid: UserUuid::new(),
                email: args.email,
                first_name: args.first_name,
                role: args.role,
            },
        )
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_email: {}", user.email);
    println!("user_role: {}", user.role);

    Ok(())
}
