//! Parameter configuration service.
//!
//! Resolves parameter paths against the table in `jackbridge_core::configure`
//! and reads or writes the backing variables through a [`DefaultsStore`].
//! Changes take effect the next time the managed service starts.

use std::sync::Arc;

use jackbridge_core::configure::{
    ConfigureError, Constraint, ParamSpec, ParamValue, ParameterValue, find_param,
};
use jackbridge_core::tracker::StateTracker;
use serde::Serialize;
use tracing::info;

use crate::defaults_store::DefaultsStore;
use crate::sound_cards::list_sound_cards;

/// Default sound card listing program.
pub const DEFAULT_CARD_LISTER: &str = "aplay";

/// Result of a successful set or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    /// Value now stored.
    pub value: ParamValue,
    /// The managed service is running and must be restarted to apply it.
    pub restart_required: bool,
    pub message: String,
}

pub struct ConfigureService {
    store: DefaultsStore,
    tracker: Arc<StateTracker>,
    card_lister: String,
}

impl ConfigureService {
    pub fn new(store: DefaultsStore, tracker: Arc<StateTracker>) -> Self {
        Self {
            store,
            tracker,
            card_lister: DEFAULT_CARD_LISTER.to_string(),
        }
    }

    /// Use a different program in place of `aplay` for card enumeration.
    #[must_use]
    pub fn with_card_lister(mut self, program: impl Into<String>) -> Self {
        self.card_lister = program.into();
        self
    }

    /// Current value of the parameter at `path`.
    pub async fn get<S: AsRef<str>>(&self, path: &[S]) -> Result<ParameterValue, ConfigureError> {
        let spec = resolve(path)?;
        let raw = match spec.variable {
            Some(variable) => self.store.read(variable).await?,
            None => None,
        };
        Ok(spec.decode(raw.as_deref()))
    }

    /// Validate and store `value` for the parameter at `path`.
    pub async fn set<S: AsRef<str>>(
        &self,
        path: &[S],
        value: ParamValue,
    ) -> Result<ParameterUpdate, ConfigureError> {
        let spec = resolve(path)?;
        spec.validate(&value)?;
        self.store_value(spec, value).await
    }

    /// Store the parameter's default value.
    pub async fn reset<S: AsRef<str>>(&self, path: &[S]) -> Result<ParameterUpdate, ConfigureError> {
        let spec = resolve(path)?;
        if spec.is_read_only() {
            return Err(ConfigureError::ReadOnly(spec.path()));
        }
        self.store_value(spec, spec.default_value()).await
    }

    /// Allowed values for the parameter at `path`.
    pub async fn constraint<S: AsRef<str>>(&self, path: &[S]) -> Result<Constraint, ConfigureError> {
        let spec = resolve(path)?;
        let mut constraint = spec.constraint();
        if spec.is_device() {
            let mut devices: Vec<ParamValue> = list_sound_cards(&self.card_lister)
                .await
                .iter()
                .flat_map(|card| card.device_names())
                .map(ParamValue::Str)
                .collect();
            devices.append(&mut constraint.values);
            constraint.values = devices;
        }
        Ok(constraint)
    }

    async fn store_value(
        &self,
        spec: &ParamSpec,
        value: ParamValue,
    ) -> Result<ParameterUpdate, ConfigureError> {
        let Some(variable) = spec.variable else {
            return Err(ConfigureError::ReadOnly(spec.path()));
        };
        self.store.write(variable, &spec.encode(&value)).await?;

        let restart_required = self.tracker.current().is_some_and(|s| s.is_running());
        info!(path = %spec.path(), %value, restart_required, "Parameter updated");
        Ok(ParameterUpdate {
            value,
            restart_required,
            message: spec.restart_hint().to_string(),
        })
    }
}

fn resolve<S: AsRef<str>>(path: &[S]) -> Result<&'static ParamSpec, ConfigureError> {
    find_param(path).ok_or_else(|| {
        let joined: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        ConfigureError::UnknownParameter(joined.join("/"))
    })
}
