//! Weapon profiles and recoil patterns
//!
//! A profile pairs an ordered recoil pattern with the per-weapon multipliers
//! used when turning a pattern point into a compensating mouse movement.

pub mod patterns;
pub mod profiles;

pub use profiles::{ProfileCollection, ProfileError, RecoilPoint, WeaponProfile};
