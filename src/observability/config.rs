use crate::config::Settings;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) version: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    /// Filter used when `RUST_LOG` is unset or unparsable.
    pub(crate) default_directive: &'static str,
}

impl ObservabilityConfig {
    /// Settings may be unavailable when loading them failed; logging still
    /// comes up so the failure can be reported.
    pub(crate) fn from_settings(component: &str, settings: Option<&Settings>) -> Self {
        let component = component.trim().to_string();

        let service_context = match settings {
            Some(settings) => ServiceContext {
                service_name: settings.app.name.clone(),
                version: settings.app.version.clone(),
                environment: settings.app.environment.clone(),
                component,
            },
            None => ServiceContext {
                service_name: component.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment: "unknown".to_string(),
                component,
            },
        };

        let debug = settings.is_some_and(|settings| settings.app.debug);

        Self {
            service_context,
            default_directive: if debug { "debug" } else { "info" },
        }
    }
}
