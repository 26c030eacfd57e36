use glam::DVec3;

/// Axis-aligned box in field space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: DVec3,
    pub max: DVec3,
}

impl AABB {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        AABB { min, max }
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Number of lattice samples along each axis when stepping by `step`.
    /// The last sample lands on or past `max` so the whole box is covered.
    pub fn sample_counts(&self, step: f64) -> [usize; 3] {
        let size = self.size().max(DVec3::ZERO);
        [
            (size.x / step).ceil() as usize + 1,
            (size.y / step).ceil() as usize + 1,
            (size.z / step).ceil() as usize + 1,
        ]
    }
}
