//! Timing and stepping system.

use std::cmp;
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use super::settings::EngineParams;

pub struct TimeSystem {
    params: EngineParams,
    timestep: Duration,
    previous_timesteps: VecDeque<Duration>,
    last_frame_timepoint: Instant,
}

impl TimeSystem {
    pub fn new(params: EngineParams) -> Self {
        TimeSystem {
            params,
            timestep: Duration::new(0, 0),
            previous_timesteps: VecDeque::new(),
            last_frame_timepoint: Instant::now(),
        }
    }

    /// Waits until the frame budget allows a new frame, and returns the (smoothed)
    /// duration of the last frame.
    pub fn advance(&mut self, focused: bool) -> Duration {
        let max_fps = if focused {
            self.params.max_fps
        } else {
            self.params.max_inactive_fps
        };

        // Perform waiting loop if maximum fps set, cooperatively gives up
        // a timeslice to the OS scheduler.
        if max_fps > 0 {
            let td = Duration::from_millis(u64::from(1000 / max_fps));
            while self.last_frame_timepoint.elapsed() <= td {
                if (self.last_frame_timepoint.elapsed() + Duration::from_millis(2)) < td {
                    thread::sleep(Duration::from_millis(1));
                } else {
                    thread::yield_now();
                }
            }
        }

        let elapsed = self.last_frame_timepoint.elapsed();
        self.last_frame_timepoint = Instant::now();
        self.step(elapsed)
    }

    /// Feeds the measured duration of a frame into the clamping and smoothing filters.
    pub fn step(&mut self, mut elapsed: Duration) -> Duration {
        // If fps lower than minimum, simply clamp it.
        if self.params.min_fps > 0 {
            elapsed = cmp::min(
                elapsed,
                Duration::from_millis(u64::from(1000 / self.params.min_fps)),
            );
        }

        let smoothing_step = self.params.time_smooth_step as usize;
        if smoothing_step > 0 {
            self.previous_timesteps.push_front(elapsed);
            self.previous_timesteps.truncate(smoothing_step);

            let sum = self
                .previous_timesteps
                .iter()
                .fold(Duration::new(0, 0), |acc, v| acc + *v);

            self.timestep = sum / self.previous_timesteps.len() as u32;
        } else {
            self.timestep = elapsed;
        }

        self.timestep
    }

    /// Set maximum frames per second. The Time will sleep if fps is higher
    /// than this for less resource(e.g. power) consumptions.
    #[inline]
    pub fn set_max_fps(&mut self, fps: u32) {
        self.params.max_fps = fps;
    }

    /// Set maximum frames per second when the application does not have input
    /// focus.
    #[inline]
    pub fn set_max_inactive_fps(&mut self, fps: u32) {
        self.params.max_inactive_fps = fps;
    }

    #[inline]
    pub fn set_min_fps(&mut self, fps: u32) {
        self.params.min_fps = fps;
    }

    /// Set how many frames to average for timestep smoothing.
    #[inline]
    pub fn set_time_smoothing_step(&mut self, step: u32) {
        self.params.time_smooth_step = step;
        self.previous_timesteps.clear();
    }

    /// Gets current fps.
    pub fn fps(&self) -> u32 {
        let secs = duration_to_secs(self.timestep);
        if secs <= 0.0 {
            0
        } else {
            (1.0 / secs).round() as u32
        }
    }

    /// Gets the duration duraing last frame.
    #[inline]
    pub fn frame_duration(&self) -> Duration {
        self.timestep
    }
}

#[inline]
pub fn duration_to_secs(v: Duration) -> f32 {
    v.as_secs() as f32 + v.subsec_nanos() as f32 * 1e-9
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn smoothing() {
        let mut time = TimeSystem::new(EngineParams {
            time_smooth_step: 2,
            ..EngineParams::default()
        });

        assert_eq!(time.step(ms(10)), ms(10));
        assert_eq!(time.step(ms(20)), ms(15));
        assert_eq!(time.step(ms(40)), ms(30));
        assert_eq!(time.fps(), 33);
    }

    #[test]
    fn clamp() {
        let mut time = TimeSystem::new(EngineParams {
            min_fps: 10,
            ..EngineParams::default()
        });

        assert_eq!(time.step(ms(500)), ms(100));
        assert_eq!(time.step(ms(50)), ms(50));
        assert_eq!(time.fps(), 20);
    }
}
