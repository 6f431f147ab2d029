// Humanization: small random timing and velocity perturbation.
//
// Applied once per onset, at the moment the note is created, with independent
// uniform draws for timing and velocity. Each generator carries its own
// `Humanizer` preset; the numbers follow how loose each player sits: drums
// push and pull the most, the lead and bass lines sit tight, and the pad's
// slow attack lets its chords drift the furthest.

use jazzhop_prng::SeededRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Humanizer {
    /// Maximum timing offset in seconds, either direction.
    pub timing: f64,
    /// Maximum velocity offset, either direction.
    pub velocity: i32,
    /// Velocity range after jitter.
    pub velocity_floor: i32,
    pub velocity_ceiling: i32,
}

impl Humanizer {
    pub const COMPING: Humanizer = Humanizer {
        timing: 0.01,
        velocity: 10,
        velocity_floor: 40,
        velocity_ceiling: 80,
    };

    pub const BASS: Humanizer = Humanizer {
        timing: 0.005,
        velocity: 10,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    pub const WALKING_BASS: Humanizer = Humanizer {
        timing: 0.005,
        velocity: 7,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    pub const LEAD: Humanizer = Humanizer {
        timing: 0.005,
        velocity: 10,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    pub const SOLO: Humanizer = Humanizer {
        timing: 0.003,
        velocity: 12,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    pub const DRUMS: Humanizer = Humanizer {
        timing: 0.01,
        velocity: 15,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    pub const PAD: Humanizer = Humanizer {
        timing: 0.02,
        velocity: 5,
        velocity_floor: 1,
        velocity_ceiling: 127,
    };

    /// Jittered onset time.
    pub fn time(&self, onset: f64, rng: &mut SeededRng) -> f64 {
        onset + rng.jitter(self.timing)
    }

    /// Jittered velocity around `base`, clamped to this preset's range and
    /// to 1-127.
    pub fn velocity(&self, base: i32, rng: &mut SeededRng) -> i32 {
        let jitter = rng.range_i32_inclusive(-self.velocity, self.velocity);
        (base + jitter)
            .clamp(self.velocity_floor, self.velocity_ceiling)
            .clamp(1, 127)
    }

    /// Timing then velocity, in that draw order.
    pub fn apply(&self, onset: f64, base_velocity: i32, rng: &mut SeededRng) -> (f64, i32) {
        let time = self.time(onset, rng);
        let velocity = self.velocity(base_velocity, rng);
        (time, velocity)
    }
}
