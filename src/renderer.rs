use crate::camera::Camera;
use crate::textures::TextureBank;
use crate::world::{GeometryStore, Wall};

const NEAR: f32 = 1.0;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

fn wall_depth_cam_space(cam: &Camera, wall: &Wall) -> f32 {
    // Use midpoint depth in camera space for sorting
    let mid = [
        (wall.x1 + wall.x2) as f32 * 0.5,
        (wall.y1 + wall.y2) as f32 * 0.5,
    ];
    let m = cam.world_to_camera(mid);
    m[1] // cy (forward depth)
}

/// One wall to draw, with the heights of the sector it bounds.
struct Span<'a> {
    wall: &'a Wall,
    z1: f32,
    z2: f32,
}

/// First-person preview of every sector from the camera.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    store: &GeometryStore,
    camera: &Camera,
    textures: &dyn TextureBank,
) {
    // Clear background
    let sky = pack_rgb(30, 30, 70);
    let ground = pack_rgb(40, 40, 40);

    let mid = (camera.screen_center_y(height as f32).max(0.0) as usize).min(height);
    buf[..mid * width].fill(sky);
    buf[mid * width..].fill(ground);

    if store.num_walls() == 0 {
        return;
    }

    // sentinels
    let mut ceil_clip: Vec<i32> = vec![height as i32; width]; // “no top yet”
    let mut floor_clip: Vec<i32> = vec![-1; width];

    let mut spans: Vec<Span> = store
        .sectors()
        .iter()
        .enumerate()
        .flat_map(|(i, s)| {
            store.sector_walls(i).iter().map(move |wall| Span {
                wall,
                z1: s.z1 as f32,
                z2: s.z2 as f32,
            })
        })
        .collect();
    spans.sort_by(|a, b| {
        let da = wall_depth_cam_space(camera, a.wall);
        let db = wall_depth_cam_space(camera, b.wall);
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal) // farthest first
    });

    for span in &spans {
        draw_textured_wall(
            buf,
            width,
            height,
            camera,
            span,
            textures,
            &mut ceil_clip,
            &mut floor_clip,
        );
    }

    let ceil_color = pack_rgb(90, 90, 110);
    let floor_color = pack_rgb(60, 50, 40);

    // post fill
    for x in 0..width {
        // draw ceiling only if top is known
        let cc = ceil_clip[x];
        let fc = floor_clip[x];
        if cc >= height as i32 && fc < 0 {
            continue;
        }

        if cc < height as i32 {
            for y in 0..cc.clamp(0, height as i32) {
                buf[y as usize * width + x] = ceil_color;
            }
        }
        // draw floor only if bottom is known
        if fc >= 0 {
            for y in (fc.clamp(-1, height as i32 - 1) + 1)..(height as i32) {
                buf[y as usize * width + x] = floor_color;
            }
        }
    }
}

#[inline]
fn shaded(c: [u8; 3], shade: i32) -> u32 {
    let d = (shade / 2).clamp(0, 255) as u8;
    pack_rgb(c[0].saturating_sub(d), c[1].saturating_sub(d), c[2].saturating_sub(d))
}

#[allow(clippy::too_many_arguments)]
fn draw_textured_wall(
    buf: &mut [u32],
    width: usize,
    height: usize,
    camera: &Camera,
    span: &Span,
    textures: &dyn TextureBank,
    ceil_clip: &mut [i32],
    floor_clip: &mut [i32],
) {
    let wall = span.wall;
    let screen_width = width as f32;
    let screen_height = height as f32;
    let cy0 = camera.screen_center_y(screen_height);

    // Transform wall endpoints to camera space
    let mut p0 = camera.world_to_camera([wall.x1 as f32, wall.y1 as f32]);
    let mut p1 = camera.world_to_camera([wall.x2 as f32, wall.y2 as f32]);
    // Position along the wall, 0 at the first endpoint, for texture u
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    // Trivial reject: both behind near plane
    if p0[1] <= NEAR && p1[1] <= NEAR {
        return;
    }

    // Horizontal frustum reject (fully outside left/right)
    let tan_half_fovx = 0.5 * screen_width / camera.fx;

    let left_plane = |cx: f32, cy: f32| cx < -cy * tan_half_fovx;
    let right_plane = |cx: f32, cy: f32| cx > cy * tan_half_fovx;

    if (left_plane(p0[0], p0[1]) && left_plane(p1[0], p1[1]))
        || (right_plane(p0[0], p0[1]) && right_plane(p1[0], p1[1]))
    {
        return;
    }

    // Clip against near plane (cy > NEAR)
    if !clip_line_near(&mut p0, &mut p1, &mut t0, &mut t1) {
        return;
    }

    let sx0 = camera.project_x(p0[0], p0[1], screen_width);
    let sx1 = camera.project_x(p1[0], p1[1], screen_width);

    // If projected to a single column, skip
    if (sx0 - sx1).abs() < 0.5 {
        return;
    }

    // Order left to right, keeping the endpoint data in sync
    let (sx_left, sx_right, inv_cy0, inv_cy1, tl, tr) = if sx0 <= sx1 {
        (sx0, sx1, 1.0 / p0[1], 1.0 / p1[1], t0, t1)
    } else {
        (sx1, sx0, 1.0 / p1[1], 1.0 / p0[1], t1, t0)
    };
    let x0 = (sx_left.floor() as i32).max(0);
    let x1 = (sx_right.floor() as i32).min(width as i32 - 1);
    if x0 >= x1 {
        return; // off-screen
    }
    let sx_span = sx_right - sx_left;

    let tex = textures.resolve(wall.wt);
    let tw = textures.width(tex);
    let th = textures.height(tex);
    let u_tiles = wall.u.max(1) as f32;
    let v_tiles = wall.v.max(1) as f32;

    // Draw per column
    for xi in x0..=x1 {
        let x = xi as usize;
        let alpha = ((xi as f32) - sx_left) / sx_span; // 0..1 across the wall
        // Interpolate 1/cy and t/cy, which are linear in screen space
        let inv_cy = lerp(inv_cy0, inv_cy1, alpha);
        let t = lerp(tl * inv_cy0, tr * inv_cy1, alpha) / inv_cy;
        let tex_x = ((t * u_tiles * tw as f32) as usize) % tw;

        let y_to_screen = camera.fy * inv_cy;
        let top = cy0 - y_to_screen * (span.z2 - camera.eye_z);
        let bottom = cy0 - y_to_screen * (span.z1 - camera.eye_z);
        let wall_h = (bottom - top).max(1.0);

        // Clamp to screen
        let y0 = (top.floor() as i32).max(0);
        let y1 = (bottom.floor() as i32).min(height as i32 - 1);
        if y0 > y1 {
            continue;
        }

        let mut idx = (y0 as usize) * width + x;
        for y in y0..=y1 {
            let f = ((y as f32) - top) / wall_h;
            let tex_y = ((f * v_tiles * th as f32).max(0.0) as usize) % th;
            buf[idx] = shaded(textures.sample(tex, tex_x, tex_y), wall.shade);
            idx += width;
        }

        if y0 < ceil_clip[x] {
            ceil_clip[x] = y0;
        }
        if y1 > floor_clip[x] {
            floor_clip[x] = y1;
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

// Clip line segment in camera space so both endpoints have cy > NEAR,
// carrying the wall parameter of each endpoint along.
fn clip_line_near(p0: &mut [f32; 2], p1: &mut [f32; 2], t0: &mut f32, t1: &mut f32) -> bool {
    let in0 = p0[1] > NEAR;
    let in1 = p1[1] > NEAR;

    if !in0 && !in1 {
        return false; // both behind
    }

    // Intersect a point 'a' against the near plane along segment a->b
    let clip_endpoint = |a: &mut [f32; 2], ta: &mut f32, b: &[f32; 2], tb: f32| {
        let t = (NEAR - a[1]) / (b[1] - a[1]);
        a[0] += t * (b[0] - a[0]);
        a[1] = NEAR;
        *ta += t * (tb - *ta);
    };

    if !in0 {
        clip_endpoint(p0, t0, &*p1, *t1);
    } else if !in1 {
        clip_endpoint(p1, t1, &*p0, *t0);
    }
    true
}
