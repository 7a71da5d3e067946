//! Weapon profile definitions and the profile collection
//!
//! The collection always holds at least one profile: the built-in
//! archetypes are seeded at construction and there is no removal API.

use serde::{Deserialize, Serialize};

use super::patterns;

/// Expected recoil displacement for one shot, in recoil units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoilPoint {
    pub x: f32,
    pub y: f32,
}

impl RecoilPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for RecoilPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A named recoil pattern with its compensation multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Display name
    pub name: String,
    /// Recoil offsets, one per shot in firing order
    pub pattern: Vec<RecoilPoint>,
    /// Vertical compensation multiplier
    pub vertical_control: f32,
    /// Horizontal compensation multiplier
    pub horizontal_sway: f32,
    /// Nominal time between shots (ms)
    pub shot_interval: u32,
}

impl WeaponProfile {
    /// Create a profile with the given multipliers
    pub fn new(
        name: impl Into<String>,
        pattern: Vec<RecoilPoint>,
        vertical_control: f32,
        horizontal_sway: f32,
        shot_interval: u32,
    ) -> Self {
        Self {
            name: name.into(),
            pattern,
            vertical_control,
            horizontal_sway,
            shot_interval,
        }
    }

    /// Create a user-built profile with default multipliers
    pub fn custom(name: impl Into<String>, pattern: Vec<RecoilPoint>) -> Self {
        Self::new(name, pattern, 1.0, 0.5, 100)
    }

    /// Number of shots covered by the pattern
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// Whether the pattern has no points (produces no compensation)
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Pattern point for a shot index, if the pattern is that long
    pub fn point(&self, index: usize) -> Option<RecoilPoint> {
        self.pattern.get(index).copied()
    }

    /// Fast-firing assault rifle archetype
    pub fn assault_rifle() -> Self {
        Self::new("Assault Rifle", patterns::ASSAULT_RIFLE.to_vec(), 1.2, 0.8, 90)
    }

    /// Medium submachine gun archetype
    pub fn smg() -> Self {
        Self::new("SMG", patterns::SMG.to_vec(), 0.8, 1.0, 75)
    }

    /// Slow pistol archetype
    pub fn pistol() -> Self {
        Self::new("Pistol", patterns::PISTOL.to_vec(), 0.6, 0.4, 120)
    }

    /// All built-in profiles in their stock order
    pub fn builtin() -> Vec<Self> {
        vec![Self::assault_rifle(), Self::smg(), Self::pistol()]
    }
}

/// Errors raised when building a collection
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile collection must contain at least one profile")]
    Empty,
}

/// Ordered profiles plus the index of the active one
#[derive(Debug, Clone)]
pub struct ProfileCollection {
    profiles: Vec<WeaponProfile>,
    current: usize,
    /// Profiles before this index were present at construction
    base_count: usize,
}

impl ProfileCollection {
    /// Create a collection seeded with the built-in profiles
    pub fn new() -> Self {
        let profiles = WeaponProfile::builtin();
        Self {
            base_count: profiles.len(),
            profiles,
            current: 0,
        }
    }

    /// Create a collection from explicit profiles
    pub fn from_profiles(profiles: Vec<WeaponProfile>) -> Result<Self, ProfileError> {
        if profiles.is_empty() {
            return Err(ProfileError::Empty);
        }
        Ok(Self {
            base_count: profiles.len(),
            profiles,
            current: 0,
        })
    }

    /// All profiles in order
    pub fn profiles(&self) -> &[WeaponProfile] {
        &self.profiles
    }

    /// Profiles appended after construction
    pub fn custom_profiles(&self) -> &[WeaponProfile] {
        &self.profiles[self.base_count..]
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The active profile
    pub fn current_profile(&self) -> &WeaponProfile {
        &self.profiles[self.current]
    }

    /// The active profile, for in-place field edits
    pub fn current_profile_mut(&mut self) -> &mut WeaponProfile {
        &mut self.profiles[self.current]
    }

    /// Index of the active profile
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Switch the active profile. Out-of-range indices are ignored.
    pub fn set_current_profile(&mut self, index: usize) {
        if index < self.profiles.len() {
            self.current = index;
            log::info!("Active weapon profile: {}", self.profiles[index].name);
        } else {
            log::warn!(
                "Ignoring profile index {} (collection has {})",
                index,
                self.profiles.len()
            );
        }
    }

    /// Switch to the first profile with this name. Returns whether one was found.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.profiles.iter().position(|p| p.name == name) {
            Some(index) => {
                self.set_current_profile(index);
                true
            }
            None => false,
        }
    }

    /// Append a profile. Names are not deduplicated.
    pub fn add_custom_profile(&mut self, profile: WeaponProfile) {
        log::info!(
            "Added custom profile '{}' ({} points)",
            profile.name,
            profile.len()
        );
        self.profiles.push(profile);
    }

    /// Append a custom profile built from a name and a point sequence
    pub fn add_custom_pattern(&mut self, name: impl Into<String>, points: Vec<RecoilPoint>) {
        self.add_custom_profile(WeaponProfile::custom(name, points));
    }
}

impl Default for ProfileCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_seeding() {
        let profiles = ProfileCollection::new();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles.current_index(), 0);
        assert_eq!(profiles.current_profile().name, "Assault Rifle");

        for profile in profiles.profiles() {
            assert!(!profile.is_empty());
        }
    }

    #[test]
    fn test_set_current_profile() {
        let mut profiles = ProfileCollection::new();
        profiles.set_current_profile(2);
        assert_eq!(profiles.current_index(), 2);
        assert_eq!(profiles.current_profile().name, "Pistol");
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut profiles = ProfileCollection::new();
        profiles.set_current_profile(1);

        profiles.set_current_profile(profiles.len());
        assert_eq!(profiles.current_index(), 1);

        profiles.set_current_profile(usize::MAX);
        assert_eq!(profiles.current_index(), 1);
    }

    #[test]
    fn test_add_custom_profile_keeps_duplicates() {
        let mut profiles = ProfileCollection::new();
        profiles.add_custom_pattern("SMG", vec![RecoilPoint::new(0.0, 5.0)]);

        assert_eq!(profiles.len(), 4);
        assert_eq!(profiles.custom_profiles().len(), 1);
        let custom = &profiles.profiles()[3];
        assert_eq!(custom.name, "SMG");
        assert_eq!(custom.vertical_control, 1.0);
        assert_eq!(custom.horizontal_sway, 0.5);
        assert_eq!(custom.shot_interval, 100);

        // First match wins when selecting by name
        assert!(profiles.select_by_name("SMG"));
        assert_eq!(profiles.current_index(), 1);
        assert!(!profiles.select_by_name("Railgun"));
    }

    #[test]
    fn test_empty_collection_rejected() {
        assert!(matches!(
            ProfileCollection::from_profiles(Vec::new()),
            Err(ProfileError::Empty)
        ));
    }

    #[test]
    fn test_current_profile_mut_edits_in_place() {
        let mut profiles = ProfileCollection::new();
        profiles.current_profile_mut().vertical_control = 1.5;
        assert_eq!(profiles.current_profile().vertical_control, 1.5);
    }

    #[test]
    fn test_point_lookup_past_end() {
        let profile = WeaponProfile::custom("Two", vec![(0.0, 15.0).into(), (2.0, 17.0).into()]);
        assert_eq!(profile.point(1), Some(RecoilPoint::new(2.0, 17.0)));
        assert_eq!(profile.point(2), None);
    }
}
