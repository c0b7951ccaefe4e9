//! Create-superuser command - operator account bootstrap.

use std::sync::Arc;

use accountd_shared::{
    credentials::{CredentialError, CredentialManager, Registration},
    db::pool::{close_pool, create_pool},
    store::postgres::PgCredentialStore,
};

use crate::{cli::CreateSuperuserArgs, config::Config};

/// Execute the create-superuser command
pub async fn execute(args: CreateSuperuserArgs, config: Config) -> anyhow::Result<()> {
    let pool = create_pool(config.pool_config()).await?;
    let credentials = CredentialManager::new(Arc::new(PgCredentialStore::new(pool.clone())));

    let result = credentials
        .create_superuser(Registration::new(args.email, args.password, args.name))
        .await;

    close_pool(pool).await;

    match result {
        Ok(user) => {
            println!("Superuser created: {}", user.email);
            Ok(())
        }
        Err(CredentialError::Validation(errors)) => {
            let details: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            anyhow::bail!("Invalid superuser: {}", details.join("; "))
        }
        Err(e) => Err(e.into()),
    }
}
