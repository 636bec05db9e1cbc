//! Process runtime and OS-level concerns for jack-bridge.
//!
//! Adapters for the ports declared in `jackbridge-core`: pid-file liveness
//! probing, service manager commands, the poll loop, notification fan-out,
//! the control interface and defaults file access.
#![deny(unsafe_code)]

pub mod broadcaster;
mod command;
pub mod configure;
pub mod controller;
pub mod defaults_store;
pub mod monitor;
pub mod probe;
pub mod sound_cards;

pub use broadcaster::{NotificationBroadcaster, Subscription};
pub use command::ServiceCommandExecutor;
pub use configure::{ConfigureService, DEFAULT_CARD_LISTER, ParameterUpdate};
pub use controller::{BridgeController, DependentTiming};
pub use defaults_store::DefaultsStore;
pub use monitor::{LivenessMonitor, bounded_probe};
pub use probe::{PidFileProbe, pid_exists};
pub use sound_cards::{SoundCard, list_sound_cards, parse_aplay_list};
