//! `parrs` configuration and execution context.
//!
//! There is no global state: a [`Context`] pairs an explicitly created [`Runtime`] with a [`Config`],
//! and every operation creating a partitioned array takes the context by reference.

use parrs_runtime::{Placement, Runtime, RuntimeCreateError, RuntimeOptions};

use crate::array::ClampMode;

/// Configuration of partitioned array creation.
///
/// The default values are:
/// - `clamp_mode`: [`ClampMode::Shrink`]
/// - `placement`: [`Placement::Blocked`]
/// - `validate`: `true` in debug builds, `false` otherwise
#[derive(Debug, Clone, Copy)]
pub struct Config {
    clamp_mode: ClampMode,
    placement: Placement,
    validate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clamp_mode: ClampMode::default(),
            placement: Placement::default(),
            validate: cfg!(debug_assertions),
        }
    }
}

impl Config {
    /// Return the clamp mode used for the trailing partitions of arrays created without an explicit clamp mode.
    #[must_use]
    pub fn clamp_mode(&self) -> ClampMode {
        self.clamp_mode
    }

    /// Set the default clamp mode.
    pub fn set_clamp_mode(&mut self, clamp_mode: ClampMode) -> &mut Self {
        self.clamp_mode = clamp_mode;
        self
    }

    /// Set the default clamp mode.
    #[must_use]
    pub fn with_clamp_mode(mut self, clamp_mode: ClampMode) -> Self {
        self.set_clamp_mode(clamp_mode);
        self
    }

    /// Return the policy placing partitions on localities.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Set the policy placing partitions on localities.
    pub fn set_placement(&mut self, placement: Placement) -> &mut Self {
        self.placement = placement;
        self
    }

    /// Set the policy placing partitions on localities.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.set_placement(placement);
        self
    }

    /// Return the validate setting.
    ///
    /// If true, the tiling of a partitioned array is checked after it is created.
    /// The check only inspects partition offsets, shapes and localities: it does not wait for partition data.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.validate
    }

    /// Set whether or not to validate created arrays.
    pub fn set_validate(&mut self, validate: bool) -> &mut Self {
        self.validate = validate;
        self
    }

    /// Set whether or not to validate created arrays.
    #[must_use]
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.set_validate(validate);
        self
    }
}

/// A [`Runtime`] and a [`Config`].
///
/// Dropping the context shuts its runtime down.
#[derive(Debug)]
pub struct Context {
    runtime: Runtime,
    config: Config,
}

impl Context {
    /// Create a new context.
    #[must_use]
    pub fn new(runtime: Runtime, config: Config) -> Self {
        Self { runtime, config }
    }

    /// Create a new context with a runtime created from `options`.
    ///
    /// # Errors
    /// Returns a [`RuntimeCreateError`] if the runtime cannot be created.
    pub fn new_with_options(options: &RuntimeOptions, config: Config) -> Result<Self, RuntimeCreateError> {
        Ok(Self::new(Runtime::new(options)?, config))
    }

    /// Return the runtime.
    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the configuration mutably.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Shut the context and its runtime down.
    pub fn shutdown(self) {
        self.runtime.shutdown();
    }
}
