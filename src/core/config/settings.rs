use std::path::{Path, PathBuf};

use super::parsing::{
    env_flag, env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_optional_usize, parse_u64, parse_usize,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DataSettings, ListSettings, RuntimeSettings,
    ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings,
};
use crate::services::submission_filter::SearchMode;
use crate::services::submission_list::ListOptions;
use crate::services::submission_sort::DEFAULT_ANONYMOUS_SHUFFLE_SEED;
use crate::services::submission_state::{GradeFormat, MAX_GRADE_DECIMAL_PLACES};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("ROSTER_HOST", "0.0.0.0");
        let port = env_or_default("ROSTER_PORT", "8000");

        let environment =
            parse_environment(env_optional("ROSTER_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ROSTER_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Submission Roster API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let data_root = PathBuf::from(env_or_default("ROSTER_DATA_ROOT", "data"));

        let anonymous_shuffle_seed = parse_u64(
            "ANONYMOUS_SHUFFLE_SEED",
            env_or_default("ANONYMOUS_SHUFFLE_SEED", &DEFAULT_ANONYMOUS_SHUFFLE_SEED.to_string()),
        )?;
        let grade_decimal_places =
            parse_optional_usize("GRADE_DECIMAL_PLACES", env_optional("GRADE_DECIMAL_PLACES"))?;
        let search_case_insensitive = env_flag("SEARCH_CASE_INSENSITIVE");
        let max_derive_rows =
            parse_usize("MAX_DERIVE_ROWS", env_or_default("MAX_DERIVE_ROWS", "10000"))?;

        let log_level = env_or_default("ROSTER_LOG_LEVEL", "info");
        let json = env_flag("ROSTER_LOG_JSON");
        let prometheus_enabled = env_flag("PROMETHEUS_ENABLED");

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            cors: CorsSettings { origins: cors_origins },
            data: DataSettings { root: data_root },
            list: ListSettings {
                anonymous_shuffle_seed,
                grade_decimal_places,
                search_case_insensitive,
                max_derive_rows,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn data_root(&self) -> &Path {
        &self.data.root
    }

    pub(crate) fn list(&self) -> &ListSettings {
        &self.list
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn list_options(&self) -> ListOptions {
        ListOptions {
            format: GradeFormat { decimal_places: self.list.grade_decimal_places },
            anonymous_seed: self.list.anonymous_shuffle_seed,
        }
    }

    pub(crate) fn search_mode(&self) -> SearchMode {
        if self.list.search_case_insensitive {
            SearchMode::CaseInsensitive
        } else {
            SearchMode::CaseSensitive
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.list.max_derive_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_DERIVE_ROWS",
                value: "0".to_string(),
            });
        }

        if let Some(places) = self.list.grade_decimal_places {
            if places > MAX_GRADE_DECIMAL_PLACES {
                return Err(ConfigError::InvalidValue {
                    field: "GRADE_DECIMAL_PLACES",
                    value: places.to_string(),
                });
            }
        }

        if !self.api.api_v1_str.starts_with('/') || self.api.api_v1_str.len() < 2 {
            return Err(ConfigError::InvalidValue {
                field: "API_V1_STR",
                value: self.api.api_v1_str.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !self.data.root.is_dir() {
            return Err(ConfigError::MissingDataRoot(self.data.root.display().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::types::Environment;
    use crate::test_support::{env_lock, set_test_env};

    #[tokio::test]
    async fn defaults_apply_when_unset() {
        let _guard = env_lock().await;
        set_test_env();
        std::env::remove_var("ROSTER_PORT");
        std::env::remove_var("ANONYMOUS_SHUFFLE_SEED");
        std::env::remove_var("GRADE_DECIMAL_PLACES");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.server_port(), 8000);
        assert_eq!(settings.api().api_v1_str, "/api/v1");
        assert_eq!(settings.list().anonymous_shuffle_seed, 1234);
        assert_eq!(settings.list_options().format.decimal_places, None);
        assert_eq!(settings.search_mode(), SearchMode::CaseSensitive);
        assert_eq!(settings.runtime().environment, Environment::Test);
    }

    #[tokio::test]
    async fn list_settings_are_read_from_env() {
        let _guard = env_lock().await;
        set_test_env();
        std::env::set_var("GRADE_DECIMAL_PLACES", "1");
        std::env::set_var("SEARCH_CASE_INSENSITIVE", "true");
        std::env::set_var("ANONYMOUS_SHUFFLE_SEED", "42");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.list_options().format, GradeFormat::rounded(1));
        assert_eq!(settings.list_options().anonymous_seed, 42);
        assert_eq!(settings.search_mode(), SearchMode::CaseInsensitive);

        std::env::remove_var("GRADE_DECIMAL_PLACES");
        std::env::remove_var("SEARCH_CASE_INSENSITIVE");
        std::env::remove_var("ANONYMOUS_SHUFFLE_SEED");
    }

    #[tokio::test]
    async fn strict_mode_requires_existing_data_root() {
        let _guard = env_lock().await;
        set_test_env();
        std::env::set_var("ROSTER_STRICT_CONFIG", "1");
        std::env::set_var("ROSTER_DATA_ROOT", "/definitely/not/a/roster/root");

        let err = Settings::load().expect_err("strict config");
        assert!(matches!(err, ConfigError::MissingDataRoot(_)));

        set_test_env();
    }

    #[tokio::test]
    async fn excessive_grade_precision_is_rejected() {
        let _guard = env_lock().await;
        set_test_env();
        std::env::set_var("GRADE_DECIMAL_PLACES", "70000");

        let err = Settings::load().expect_err("precision out of range");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "GRADE_DECIMAL_PLACES", .. }
        ));

        std::env::set_var("GRADE_DECIMAL_PLACES", "10");
        assert!(Settings::load().is_ok());

        std::env::remove_var("GRADE_DECIMAL_PLACES");
    }

    #[tokio::test]
    async fn invalid_port_is_rejected() {
        let _guard = env_lock().await;
        set_test_env();
        std::env::set_var("ROSTER_PORT", "0");

        assert!(matches!(Settings::load(), Err(ConfigError::InvalidPort(_))));

        std::env::remove_var("ROSTER_PORT");
    }
}
