//! Built-in recoil patterns
//!
//! Hand-authored spray patterns for the three stock archetypes. Each one has
//! an initial kick, a climb to a peak, then a settling tail whose vertical
//! magnitude never increases again while the horizontal component swings
//! left and right.

use super::profiles::RecoilPoint;

const fn pt(x: f32, y: f32) -> RecoilPoint {
    RecoilPoint { x, y }
}

/// Fast-firing, heavy-kick archetype
pub const ASSAULT_RIFLE: [RecoilPoint; 15] = [
    pt(0.0, 14.0), // Initial kick
    pt(2.0, 16.0),
    pt(-2.0, 19.0),
    pt(3.0, 21.0), // Peak
    pt(-3.0, 21.0),
    pt(1.0, 19.0),
    pt(-1.0, 17.0),
    pt(2.0, 15.0),
    pt(-3.0, 13.0),
    pt(2.0, 11.0),
    pt(-1.0, 9.0),
    pt(1.0, 7.0),
    pt(0.0, 5.0),
    pt(-1.0, 3.0),
    pt(0.0, 2.0),
];

/// Medium archetype: lighter kick, wider sway
pub const SMG: [RecoilPoint; 15] = [
    pt(0.0, 11.0),
    pt(1.0, 13.0),
    pt(-2.0, 15.0),
    pt(2.0, 17.0),
    pt(-3.0, 18.0), // Peak
    pt(2.0, 17.0),
    pt(-1.0, 15.0),
    pt(1.0, 13.0),
    pt(-2.0, 11.0),
    pt(1.0, 9.0),
    pt(0.0, 7.0),
    pt(-1.0, 5.0),
    pt(1.0, 4.0),
    pt(0.0, 2.0),
    pt(0.0, 1.0),
];

/// Slow archetype: short pattern, small sway
pub const PISTOL: [RecoilPoint; 10] = [
    pt(0.0, 9.0),
    pt(1.0, 11.0),
    pt(-1.0, 13.0),
    pt(2.0, 14.0), // Peak
    pt(-2.0, 14.0),
    pt(1.0, 12.0),
    pt(0.0, 10.0),
    pt(-1.0, 8.0),
    pt(1.0, 7.0),
    pt(0.0, 5.0),
];
