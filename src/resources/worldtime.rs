use bevy_ecs::prelude::Resource;

/// Simulation clock shared by every pet.
///
/// `elapsed` and `delta` are scaled seconds. Pet timers run on the
/// millisecond view returned by [`elapsed_ms`](WorldTime::elapsed_ms).
#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    /// Frames advanced since start.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn elapsed_ms(&self) -> u64 {
        (f64::from(self.elapsed) * 1000.0).round().max(0.0) as u64
    }
}
