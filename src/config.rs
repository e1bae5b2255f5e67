//! Configuration of grid evaluations.

use crate::{
    error::{GridError, Result},
    profile::{EllipticalProfile, SphericalProfile},
};
use lazy_static::lazy_static;
use std::collections::HashMap;

#[cfg(feature = "json")]
use std::{fs, path::Path};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DEFAULT_RADIAL_MINIMA: HashMap<&'static str, f64> = vec![
        (SphericalProfile::PROFILE_TYPE, 1e-8),
        (EllipticalProfile::PROFILE_TYPE, 1e-8),
    ]
    .into_iter()
    .collect();
}

/// Minimum radius from the origin each profile type may be evaluated at.
///
/// Coordinates closer to the origin than this are moved outward before
/// evaluation; see [`crate::transform::RadialMinimumRelocation`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RadialMinimumConfig {
    radial_minimum: HashMap<String, f64>,
}

impl RadialMinimumConfig {
    /// Creates a configuration with no entries.
    pub fn empty() -> Self {
        Self {
            radial_minimum: HashMap::new(),
        }
    }

    /// Adds or replaces the radial minimum of the given profile type.
    pub fn with_radial_minimum(mut self, profile_type: &str, radial_minimum: f64) -> Self {
        self.radial_minimum
            .insert(profile_type.to_string(), radial_minimum);
        self
    }

    /// Looks up the radial minimum of the given profile type.
    pub fn radial_minimum_for(&self, profile_type: &str) -> Result<f64> {
        self.radial_minimum
            .get(profile_type)
            .copied()
            .ok_or_else(|| GridError::MissingRadialMinimum {
                profile_type: profile_type.to_string(),
            })
    }

    /// Parses a configuration from JSON text of the form
    /// `{"radial_minimum": {"ProfileType": 1e-8}}`.
    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    #[cfg(feature = "json")]
    pub fn from_json_file(file_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(file_path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!(
            "Read radial minima for {} profile types from {}",
            config.radial_minimum.len(),
            file_path.display()
        );
        Ok(config)
    }
}

impl Default for RadialMinimumConfig {
    fn default() -> Self {
        Self {
            radial_minimum: DEFAULT_RADIAL_MINIMA
                .iter()
                .map(|(&profile_type, &radial_minimum)| (profile_type.to_string(), radial_minimum))
                .collect(),
        }
    }
}
