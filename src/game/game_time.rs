use log::warn;

/// Turns variable frame times into a whole number of fixed ticks, carrying the remainder over.
#[derive(Debug)]
pub struct FixedTimestep {
    tick: f32,
    overflow_seconds: f32,
    ticks: u64,
}

impl FixedTimestep {
    /// Frames longer than this are clamped, so a hitch doesn't turn into a burst of ticks.
    pub const MAX_TICKS_PER_FRAME: u32 = 8;

    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick: 1.0 / tick_rate.max(1) as f32,
            overflow_seconds: 0.0,
            ticks: 0,
        }
    }

    /// Length of one tick in seconds
    pub fn tick(&self) -> f32 {
        self.tick
    }

    /// Total number of ticks handed out
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.tick as f64
    }

    /// Returns how many ticks to simulate for a frame of `delta_time` seconds.
    pub fn advance_time(&mut self, delta_time: f32) -> u32 {
        if !(delta_time.is_finite() && delta_time >= 0.0) {
            warn!("Ignoring invalid frame time {}", delta_time);
            return 0;
        }

        self.overflow_seconds += delta_time;

        let mut ticks = 0;
        while self.overflow_seconds >= self.tick {
            self.overflow_seconds -= self.tick;
            ticks += 1;
        }

        if ticks > Self::MAX_TICKS_PER_FRAME {
            warn!(
                "Frame took {}s, dropping {} ticks",
                delta_time,
                ticks - Self::MAX_TICKS_PER_FRAME
            );
            ticks = Self::MAX_TICKS_PER_FRAME;
        }

        self.ticks += ticks as u64;
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_remainder() {
        let mut time = FixedTimestep::new(60);
        let tick = time.tick();
        assert_eq!(time.advance_time(tick * 1.25), 1);
        assert_eq!(time.advance_time(tick * 1.25), 1);
        assert_eq!(time.advance_time(tick * 0.75), 1);
        assert_eq!(time.ticks(), 3);
    }

    #[test]
    fn small_frames_accumulate() {
        let mut time = FixedTimestep::new(60);
        let total: u32 = (0..10).map(|_| time.advance_time(1.0 / 600.0 + 1.0e-6)).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn hitches_are_clamped() {
        let mut time = FixedTimestep::new(60);
        assert_eq!(time.advance_time(5.0), FixedTimestep::MAX_TICKS_PER_FRAME);
        assert_eq!(time.advance_time(f32::NAN), 0);
        assert_eq!(time.advance_time(-1.0), 0);
    }
}
