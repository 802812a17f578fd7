mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{Environment, Settings};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn defaults_load_in_development() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("MAX_LEVELS");
        std::env::remove_var("TERMINAL_LEVEL_NAME");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().api_prefix, "/api");
        assert_eq!(settings.academic().max_levels, 5);
        assert_eq!(settings.academic().terminal_level_name, "Fourth Year");
        assert_eq!(settings.runtime().environment, Environment::Test);
        assert!(!settings.s3().is_configured());
    }

    #[tokio::test]
    async fn zero_level_cap_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("MAX_LEVELS", "0");

        let result = Settings::load();
        std::env::remove_var("MAX_LEVELS");

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn level_cap_cannot_exceed_five() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("MAX_LEVELS", "50");
        let raised = Settings::load();
        std::env::set_var("MAX_LEVELS", "3");
        let lowered = Settings::load();
        std::env::remove_var("MAX_LEVELS");

        assert!(matches!(
            raised,
            Err(super::types::ConfigError::InvalidValue { field: "MAX_LEVELS", .. })
        ));
        assert_eq!(lowered.expect("settings").academic().max_levels, 3);
    }

    #[tokio::test]
    async fn strict_mode_requires_superuser_password() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("PORTAL_STRICT_CONFIG", "1");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");

        let result = Settings::load();
        std::env::set_var("PORTAL_STRICT_CONFIG", "0");

        assert!(matches!(result, Err(super::types::ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"))));
    }
}
