//! Top-down editor view: walls, endpoints, the player marker and the
//! parameter panel, drawn into the low-resolution framebuffer with y up.

use crate::construction::ConstructionState;
use crate::editor::EditorSession;
use crate::renderer::pack_rgb;
use crate::textures::TextureBank;

const SWATCH: usize = 13;

// 3x5 digit glyphs, one row per entry top to bottom, bit 2 is the left column.
const DIGITS: [[u8; 5]; 11] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
    [0b000, 0b000, 0b111, 0b000, 0b000], // minus
];

struct Canvas<'a> {
    buf: &'a mut [u32],
    width: usize,
    height: usize,
}

impl Canvas<'_> {
    /// Plots with the origin in the lower left corner; off-screen points are dropped.
    #[inline]
    fn pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let row = self.height - 1 - y as usize;
        self.buf[row * self.width + x as usize] = color;
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: u32) {
        let mut dx = x2 - x1;
        let mut dy = y2 - y1;
        let steps = dx.abs().max(dy.abs());
        if steps < 1.0 {
            self.pixel(x1 as i32, y1 as i32, color);
            return;
        }
        dx /= steps;
        dy /= steps;
        let (mut x, mut y) = (x1, y1);
        for _ in 0..steps as i32 {
            self.pixel(x.floor() as i32, y.floor() as i32, color);
            x += dx;
            y += dy;
        }
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.pixel(xx, yy, color);
            }
        }
    }

    /// Draws `n` with its lower left corner at `(x, y)`.
    fn number(&mut self, x: i32, y: i32, n: i32, color: u32) {
        let text = n.to_string();
        let mut cx = x;
        for ch in text.bytes() {
            let glyph = match ch {
                b'-' => &DIGITS[10],
                b'0'..=b'9' => &DIGITS[(ch - b'0') as usize],
                _ => continue,
            };
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.pixel(cx + col, y + 4 - row as i32, color);
                    }
                }
            }
            cx += 4;
        }
    }

    fn swatch(&mut self, x: i32, y: i32, textures: &dyn TextureBank, id: usize) {
        let tw = textures.width(id);
        let th = textures.height(id);
        for sy in 0..SWATCH {
            for sx in 0..SWATCH {
                let [r, g, b] = textures.sample(id, sx * tw / SWATCH, sy * th / SWATCH);
                self.pixel(x + sx as i32, y + sy as i32, pack_rgb(r, g, b));
            }
        }
    }

    fn darken(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for yy in y..y + h {
            for xx in x..x + w {
                if xx < 0 || yy < 0 || xx >= self.width as i32 || yy >= self.height as i32 {
                    continue;
                }
                let idx = (self.height - 1 - yy as usize) * self.width + xx as usize;
                self.buf[idx] = (self.buf[idx] >> 1) & 0x007F7F7F;
            }
        }
    }
}

pub fn render_grid(
    buf: &mut [u32],
    width: usize,
    height: usize,
    session: &EditorSession,
    textures: &dyn TextureBank,
) {
    let mut c = Canvas { buf, width, height };
    let cfg = session.config();
    let ctx = &session.ctx;
    let scale = ctx.scale.max(1) as f32;
    let canvas_w = (width - cfg.view.panel_width) as i32;

    // Background with grid dots on the click cells
    let bg = pack_rgb(40, 60, 40);
    c.buf.fill(bg);
    let dot = pack_rgb(70, 95, 70);
    let step = (cfg.grid.click_cell / ctx.scale.max(1)).max(2);
    for y in (0..height as i32).step_by(step as usize) {
        for x in (0..canvas_w).step_by(step as usize) {
            c.pixel(x, y, dot);
        }
    }

    // Sectors
    let white = pack_rgb(255, 255, 255);
    for s in 0..session.store.num_sectors() {
        let selected = ctx.selected_sector() == Some(s);
        for (k, w) in session.store.sector_walls(s).iter().enumerate() {
            let lit = selected && (ctx.sel_w == 0 || ctx.sel_w == k + 1);
            let hi: u8 = if lit { 80 } else { 0 };
            let color = pack_rgb(128 + hi, 128 + hi, 128 - hi);
            c.line(
                w.x1 as f32 / scale,
                w.y1 as f32 / scale,
                w.x2 as f32 / scale,
                w.y2 as f32 / scale,
                color,
            );
            c.pixel((w.x1 as f32 / scale) as i32, (w.y1 as f32 / scale) as i32, white);
            c.pixel((w.x2 as f32 / scale) as i32, (w.y2 as f32 / scale) as i32, white);
        }
    }

    // Player and heading
    let nav = &session.nav;
    let rad = (nav.a as f32).to_radians();
    let (px, py) = (nav.x as f32 / scale, nav.y as f32 / scale);
    c.pixel(px as i32, py as i32, pack_rgb(0, 255, 0));
    c.pixel(
        ((nav.x as f32 + rad.sin() * 12.0) / scale) as i32,
        ((nav.y as f32 + rad.cos() * 12.0) / scale) as i32,
        pack_rgb(0, 175, 0),
    );

    // Pointer cell
    let [qx, qy] = session.quantized_pointer();
    let (qx, qy) = ((qx as f32 / scale) as i32, (qy as f32 / scale) as i32);
    if qx < canvas_w {
        let cross = pack_rgb(200, 60, 60);
        c.pixel(qx - 1, qy, cross);
        c.pixel(qx + 1, qy, cross);
        c.pixel(qx, qy - 1, cross);
        c.pixel(qx, qy + 1, cross);
    }

    draw_panel(&mut c, session, textures, canvas_w);

    if session.show_info {
        let yellow = pack_rgb(255, 255, 0);
        let top = height as i32 - 6;
        let [mx, my] = session.pointer();
        for (i, v) in [nav.x, nav.y, nav.z, nav.a, nav.l, mx, my].iter().enumerate() {
            c.number(1, top - 6 * i as i32, *v, yellow);
        }
    }
}

fn draw_panel(c: &mut Canvas<'_>, session: &EditorSession, textures: &dyn TextureBank, x0: i32) {
    let ctx = &session.ctx;
    let h = c.height as i32;
    let w = c.width as i32 - x0;
    let white = pack_rgb(255, 255, 255);

    c.rect(x0, 0, w, h, pack_rgb(60, 60, 70));
    c.swatch(x0 + 1, h - 2 - SWATCH as i32, textures, textures.resolve(ctx.wt));
    c.number(x0 + 1, h - 9 - SWATCH as i32, ctx.wu, white);
    c.number(x0 + 8, h - 9 - SWATCH as i32, ctx.wv, white);

    let surf_y = h - 12 - 2 * SWATCH as i32;
    c.swatch(x0 + 1, surf_y, textures, textures.resolve(ctx.st));
    c.number(x0 + 8, surf_y - 7, ctx.ss, white);
    c.number(x0 + 1, surf_y - 15, ctx.z2, white);
    c.number(x0 + 1, surf_y - 22, ctx.z1, white);

    // Add sector button, darkened while construction is armed or placing
    let button_y = surf_y - 32;
    c.rect(x0 + 1, button_y, w - 2, 6, pack_rgb(160, 160, 90));
    if session.construction_state() != ConstructionState::Idle {
        c.darken(x0 + 1, button_y, w - 2, 6);
    }

    c.number(x0 + 1, 26, ctx.sel_s as i32, white);
    c.number(x0 + 1, 18, ctx.sel_w as i32, white);
}
