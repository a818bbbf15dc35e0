//! Step Wizard Controller
//!
//! Linear multi-step editor navigation. All transitions clamp into
//! `[0, step_count)`; the initial index may be seeded externally (e.g.
//! from a URL slug) and out-of-range seeds clamp rather than reject.
//! Save gating on navigation lives in the editor session, which saves the
//! current step's dirty fields before advancing.

use listing_core::PropertyField;

/// Editor steps in display order
pub const STEP_COUNT: usize = 6;

/// Fields edited on a given step, used to scope the pre-navigation save
pub fn step_fields(step: usize) -> &'static [PropertyField] {
    const DETAILS: &[PropertyField] = &[
        PropertyField::Title,
        PropertyField::Description,
        PropertyField::Address,
        PropertyField::Price,
        PropertyField::Bedrooms,
        PropertyField::Bathrooms,
    ];
    const FEATURES: &[PropertyField] = &[PropertyField::Features, PropertyField::Areas];
    const GALLERY: &[PropertyField] = &[
        PropertyField::Images,
        PropertyField::FeaturedImage,
        PropertyField::FeaturedImages,
        PropertyField::GridImages,
    ];
    const FLOORPLANS: &[PropertyField] = &[
        PropertyField::Floorplans,
        PropertyField::TechnicalItems,
    ];
    const NEARBY: &[PropertyField] = &[
        PropertyField::NearbyPlaces,
        PropertyField::NearbyCities,
    ];
    const REVIEW: &[PropertyField] = &[];

    match step {
        0 => DETAILS,
        1 => FEATURES,
        2 => GALLERY,
        3 => FLOORPLANS,
        4 => NEARBY,
        _ => REVIEW,
    }
}

#[derive(Debug, Clone)]
pub struct StepWizard {
    step: usize,
    step_count: usize,
}

impl StepWizard {
    /// Create a wizard, clamping the seed into range
    pub fn new(step_count: usize, seed: usize) -> Self {
        let step_count = step_count.max(1);
        Self {
            step: seed.min(step_count - 1),
            step_count,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.step + 1)
    }

    pub fn previous(&mut self) -> usize {
        self.go_to(self.step.saturating_sub(1))
    }

    /// Jump to an arbitrary step, clamped into range
    pub fn go_to(&mut self, step: usize) -> usize {
        self.step = step.min(self.step_count - 1);
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_clamp_at_both_ends() {
        let mut wizard = StepWizard::new(3, 0);
        assert_eq!(wizard.previous(), 0);
        assert_eq!(wizard.next(), 1);
        assert_eq!(wizard.next(), 2);
        assert_eq!(wizard.next(), 2);
        assert_eq!(wizard.go_to(99), 2);
        assert_eq!(wizard.go_to(1), 1);
    }

    #[test]
    fn out_of_range_seed_clamps() {
        let wizard = StepWizard::new(4, 17);
        assert_eq!(wizard.step(), 3);
        let wizard = StepWizard::new(4, 2);
        assert_eq!(wizard.step(), 2);
    }

    #[test]
    fn every_saveable_field_belongs_to_a_step() {
        use std::collections::HashSet;
        let covered: HashSet<_> = (0..STEP_COUNT).flat_map(step_fields).collect();
        for field in PropertyField::ALL {
            assert!(covered.contains(&field), "{:?} not covered", field);
        }
    }
}
