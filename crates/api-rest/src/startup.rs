//! Process startup shared by the server binaries.

use std::env;
use std::sync::Arc;

use shs_core::config::{
    authorization_strategy_from_env_value, country_calling_code_from_env_value,
    recent_patients_limit_from_env_value, session_ttl_days_from_env_value,
    unresolved_reference_policy_from_env_value,
};
use shs_core::{AppContext, AuthService, CoreConfig};

/// Resolve [`CoreConfig`] from the `SHS_*` environment variables.
pub fn core_config_from_env() -> anyhow::Result<CoreConfig> {
    Ok(CoreConfig::new(
        authorization_strategy_from_env_value(env::var("SHS_AUTHORIZATION_STRATEGY").ok())?,
        unresolved_reference_policy_from_env_value(
            env::var("SHS_UNRESOLVED_REFERENCE_POLICY").ok(),
        )?,
        session_ttl_days_from_env_value(env::var("SHS_SESSION_TTL_DAYS").ok())?,
        recent_patients_limit_from_env_value(env::var("SHS_RECENT_PATIENTS_LIMIT").ok())?,
        country_calling_code_from_env_value(env::var("SHS_COUNTRY_CALLING_CODE").ok()),
    )?)
}

/// Build the in-memory application context and seed the bootstrap super-admin.
pub fn context_from_env() -> anyhow::Result<AppContext> {
    let ctx = AppContext::in_memory(Arc::new(core_config_from_env()?));

    let username = env::var("SHS_SUPER_ADMIN_USERNAME")
        .map_err(|_| anyhow::anyhow!("SHS_SUPER_ADMIN_USERNAME must be set"))?;
    let password = env::var("SHS_SUPER_ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("SHS_SUPER_ADMIN_PASSWORD must be set"))?;
    if AuthService::new(ctx.clone()).seed_super_admin(&username, &password)? {
        tracing::info!(username = %username, "bootstrap super admin created");
    }

    Ok(ctx)
}
