use crate::config::NavConfig;

/// Player position and view direction in integer world units, persisted with
/// the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub x: i32,
    pub y: i32,
    pub z: i32, // eye height, z is up
    pub a: i32, // heading in degrees, 0..360
    pub l: i32, // look up/down offset
}

impl NavState {
    pub fn from_config(cfg: &NavConfig) -> Self {
        Self {
            x: cfg.start[0],
            y: cfg.start[1],
            z: cfg.start[2],
            a: cfg.heading.rem_euclid(360),
            l: cfg.look,
        }
    }

    /// Forward step for the current heading; +Y is forward at heading 0.
    fn step(&self, len: i32) -> (i32, i32) {
        let rad = (self.a as f32).to_radians();
        ((rad.sin() * len as f32) as i32, (rad.cos() * len as f32) as i32)
    }

    pub fn turn(&mut self, dir: i32, cfg: &NavConfig) {
        self.a = (self.a + dir * cfg.turn_step).rem_euclid(360);
    }

    pub fn walk(&mut self, dir: i32, cfg: &NavConfig) {
        let (dx, dy) = self.step(cfg.move_step);
        self.x += dir * dx;
        self.y += dir * dy;
    }

    /// Sideways step, positive to the right of the heading.
    pub fn strafe(&mut self, dir: i32, cfg: &NavConfig) {
        let (dx, dy) = self.step(cfg.move_step);
        self.x += dir * dy;
        self.y -= dir * dx;
    }

    pub fn climb(&mut self, dir: i32, cfg: &NavConfig) {
        self.z += dir * cfg.climb_step;
    }

    pub fn look(&mut self, dir: i32) {
        self.l += dir;
    }
}

pub struct Camera {
    pub pos: [f32; 2], // (x, y) position in world space
    pub yaw: f32,      // radians, camera facing direction in the X-Y plane
    pub eye_z: f32,    // camera height from ground plane
    pub horizon: f32,  // vertical shift of the horizon in pixels, positive looks up
    pub fx: f32,       // horizontal focal factor
    pub fy: f32,       // vertical focal factor
}

impl Camera {
    pub fn from_nav(nav: &NavState, look_step_px: f32) -> Self {
        Self {
            pos: [nav.x as f32, nav.y as f32],
            yaw: (nav.a as f32).to_radians(),
            eye_z: nav.z as f32,
            horizon: nav.l as f32 * look_step_px,
            fx: 0.0,
            fy: 0.0,
        }
    }

    #[inline]
    pub fn world_to_camera(&self, p: [f32; 2]) -> [f32; 2] {
        let dx = p[0] - self.pos[0];
        let dy = p[1] - self.pos[1];
        // Rotate by yaw so the heading maps onto +cy
        let c = self.yaw.cos();
        let s = self.yaw.sin();
        let cx = dx * c - dy * s;
        let cy = dx * s + dy * c;
        [cx, cy]
    }

    #[inline]
    pub fn project_x(&self, cx: f32, cy: f32, screen_width: f32) -> f32 {
        let cx0 = 0.5 * screen_width;
        self.fx * (cx / cy) + cx0
    }

    pub fn set_fov_from_horizontal(&mut self, width: f32, height: f32, fov_x_deg: f32) {
        let fov_x = fov_x_deg.to_radians();
        self.fx = 0.5 * width / (0.5 * fov_x).tan();
        let aspect = width / height;
        self.fy = self.fx / aspect;
    }

    #[inline]
    pub fn screen_center_y(&self, screen_h: f32) -> f32 {
        0.5 * screen_h + self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_wraps() {
        let cfg = NavConfig::default();
        let mut nav = NavState::from_config(&cfg);
        nav.turn(-1, &cfg);
        assert_eq!(nav.a, 360 - cfg.turn_step);
        nav.turn(1, &cfg);
        assert_eq!(nav.a, 0);
    }

    #[test]
    fn test_walk_follows_heading() {
        let cfg = NavConfig::default();
        let mut nav = NavState::from_config(&cfg);
        let (x, y) = (nav.x, nav.y);
        nav.walk(1, &cfg);
        assert_eq!((nav.x, nav.y), (x, y + cfg.move_step));
        nav.walk(-1, &cfg);
        assert_eq!((nav.x, nav.y), (x, y));
        nav.strafe(1, &cfg);
        assert_eq!((nav.x, nav.y), (x + cfg.move_step, y));
    }

    #[test]
    fn test_heading_maps_to_forward_axis() {
        let nav = NavState {
            x: 0,
            y: 0,
            z: 20,
            a: 90,
            l: 0,
        };
        let cam = Camera::from_nav(&nav, 4.0);
        // At heading 90 the player looks along +X
        let p = cam.world_to_camera([10.0, 0.0]);
        assert!(p[0].abs() < 1e-4);
        assert!((p[1] - 10.0).abs() < 1e-4);
    }
}
