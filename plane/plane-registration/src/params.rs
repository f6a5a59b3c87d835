//! Registration parameters.

use plane_descriptor::CENTER_KNN;
use plane_types::SurfaceMethod;

use crate::error::{RegistrationError, RegistrationResult};

/// Surface below which a plane is considered too small to orient a scan,
/// in squared cloud units.
pub const MIN_SURFACE: f64 = 30.0;

/// How source and target planes are paired in the weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrespondenceMode {
    /// Every pair contributes, weighted by the squared distance between the
    /// size-scaled target normal and the source normal.
    #[default]
    NormalDistance,
    /// Only pairs matched through their point feature histograms
    /// contribute, with unit weight.
    Descriptor,
}

/// Parameters for plane-based rotation estimation.
///
/// # Example
///
/// ```
/// use plane_registration::{CorrespondenceMode, RegistrationParams, MIN_SURFACE};
///
/// let params = RegistrationParams::new()
///     .with_default_min_surface()
///     .with_max_planes(Some(8))
///     .with_mode(CorrespondenceMode::Descriptor);
/// assert_eq!(params.min_surface, Some(MIN_SURFACE));
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrationParams {
    /// Planes with a smaller surface are ignored (default: no filtering).
    pub min_surface: Option<f64>,
    /// Keep at most this many planes per set, largest surfaces first
    /// (default: all).
    pub max_planes: Option<usize>,
    /// How the weight matrix is built (default: normal distance).
    pub mode: CorrespondenceMode,
    /// Neighbouring planes per descriptor in descriptor mode (default: 6).
    pub descriptor_k: usize,
    /// Singular values below this fraction of the largest are treated as
    /// zero (default: 1e-9).
    pub singular_tolerance: f64,
    /// How plane surfaces are re-estimated from clouds.
    pub surface_method: SurfaceMethod,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            min_surface: None,
            max_planes: None,
            mode: CorrespondenceMode::NormalDistance,
            descriptor_k: CENTER_KNN,
            singular_tolerance: 1e-9,
            surface_method: SurfaceMethod::ConvexHull,
        }
    }
}

impl RegistrationParams {
    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores planes smaller than `surface`.
    #[must_use]
    pub const fn with_min_surface(mut self, surface: f64) -> Self {
        self.min_surface = Some(surface);
        self
    }

    /// Ignores planes smaller than [`MIN_SURFACE`].
    #[must_use]
    pub const fn with_default_min_surface(self) -> Self {
        self.with_min_surface(MIN_SURFACE)
    }

    /// Disables surface filtering.
    #[must_use]
    pub const fn without_min_surface(mut self) -> Self {
        self.min_surface = None;
        self
    }

    /// Sets the per-set plane cap.
    #[must_use]
    pub const fn with_max_planes(mut self, max: Option<usize>) -> Self {
        self.max_planes = max;
        self
    }

    /// Sets the correspondence mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: CorrespondenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the descriptor neighbourhood size.
    #[must_use]
    pub const fn with_descriptor_k(mut self, k: usize) -> Self {
        self.descriptor_k = k;
        self
    }

    /// Sets the relative singular value tolerance.
    #[must_use]
    pub const fn with_singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    /// Sets the surface estimation method.
    #[must_use]
    pub const fn with_surface_method(mut self, method: SurfaceMethod) -> Self {
        self.surface_method = method;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidParameter`] naming the first
    /// offending field.
    pub fn validate(&self) -> RegistrationResult<()> {
        let invalid = |reason: String| Err(RegistrationError::InvalidParameter(reason));

        if let Some(surface) = self.min_surface {
            if !(surface >= 0.0 && surface.is_finite()) {
                return invalid(format!("min_surface must be non-negative, got {surface}"));
            }
        }
        if self.max_planes == Some(0) {
            return invalid("max_planes must be positive".to_string());
        }
        if self.descriptor_k < 2 {
            return invalid(format!(
                "descriptor_k must be at least 2, got {}",
                self.descriptor_k
            ));
        }
        if !(self.singular_tolerance > 0.0 && self.singular_tolerance < 1.0) {
            return invalid(format!(
                "singular_tolerance must be in (0, 1), got {}",
                self.singular_tolerance
            ));
        }
        Ok(())
    }
}
