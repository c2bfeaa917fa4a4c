//! Application lifecycle state machine.
//!
//! # States
//! ```text
//! Unstarted → ConfiguringClasspath → LoadingProperties → StartingDatasource
//!     → StartingServer → Running → ShuttingDown → Stopped
//! ```
//!
//! Transitions are strictly linear. A failure during startup leaves the
//! machine in the phase that failed; it never enters `ShuttingDown`.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Unstarted,
    ConfiguringClasspath,
    LoadingProperties,
    StartingDatasource,
    StartingServer,
    Running,
    ShuttingDown,
    Stopped,
}

impl LifecycleState {
    /// The only state reachable from `self`.
    pub fn successor(self) -> Option<LifecycleState> {
        use LifecycleState::*;
        match self {
            Unstarted => Some(ConfiguringClasspath),
            ConfiguringClasspath => Some(LoadingProperties),
            LoadingProperties => Some(StartingDatasource),
            StartingDatasource => Some(StartingServer),
            StartingServer => Some(Running),
            Running => Some(ShuttingDown),
            ShuttingDown => Some(Stopped),
            Stopped => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        use LifecycleState::*;
        match self {
            Unstarted => "unstarted",
            ConfiguringClasspath => "configuring_classpath",
            LoadingProperties => "loading_properties",
            StartingDatasource => "starting_datasource",
            StartingServer => "starting_server",
            Running => "running",
            ShuttingDown => "shutting_down",
            Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition {from} → {to}")]
pub struct LifecycleError {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// Tracks the current state and rejects anything but the next step.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: LifecycleState::Unstarted,
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn advance(&mut self, to: LifecycleState) -> Result<(), LifecycleError> {
        if self.state.successor() != Some(to) {
            return Err(LifecycleError {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %self.state, to = %to, "Lifecycle transition");
        self.state = to;
        Ok(())
    }
}
