use rand::Rng;

/// Full scale of the 10-bit analog inputs.
pub const ANALOG_MAX: i64 = 1023;

/// Light dependent resistor reading for a point in the day, `0.0` being
/// midnight. Bright around noon, close to zero at night.
pub fn simulated_ldr(day_fraction: f64, rng: &mut impl Rng) -> i64 {
    const SUNRISE: f64 = 0.25;
    const SUNSET: f64 = 0.75;
    const NIGHT_LEVEL: f64 = 20.0;

    let base = if (SUNRISE..=SUNSET).contains(&day_fraction) {
        let radians = (day_fraction - SUNRISE) / (SUNSET - SUNRISE) * std::f64::consts::PI;
        NIGHT_LEVEL + radians.sin() * (ANALOG_MAX as f64 - NIGHT_LEVEL)
    } else {
        NIGHT_LEVEL
    };

    let noise = rng.random_range(-15.0..15.0);

    ((base + noise).round() as i64).clamp(0, ANALOG_MAX)
}

/// Knob drifting by a few steps per read.
pub fn drift_potentiometer(previous: i64, rng: &mut impl Rng) -> i64 {
    (previous + rng.random_range(-8..=8)).clamp(0, ANALOG_MAX)
}

pub fn simulated_presence(probability: f64, rng: &mut impl Rng) -> bool {
    rng.random_bool(probability)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_ldr_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for step in 0..=96 {
            let value = simulated_ldr(step as f64 / 96.0, &mut rng);
            assert!((0..=ANALOG_MAX).contains(&value));
        }
    }

    #[test]
    fn test_noon_is_brighter_than_midnight() {
        let mut rng = StdRng::seed_from_u64(7);

        assert!(simulated_ldr(0.5, &mut rng) > simulated_ldr(0.0, &mut rng));
    }

    #[test]
    fn test_potentiometer_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            assert!(drift_potentiometer(0, &mut rng) >= 0);
            assert!(drift_potentiometer(ANALOG_MAX, &mut rng) <= ANALOG_MAX);
        }
    }
}
