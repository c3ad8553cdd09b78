/// Read access to a fixed catalog of RGB images addressed by id.
pub trait TextureBank {
    fn len(&self) -> usize;
    fn width(&self, id: usize) -> usize;
    fn height(&self, id: usize) -> usize;
    /// Samples texel `(x, y)`; coordinates wrap around the image.
    fn sample(&self, id: usize, x: usize, y: usize) -> [u8; 3];

    /// Highest valid id, the upper bound texture cycling wraps at.
    fn max_id(&self) -> i32 {
        self.len().saturating_sub(1) as i32
    }

    /// Clamps any stored id (levels may carry out-of-range values) onto the catalog.
    fn resolve(&self, id: i32) -> usize {
        id.clamp(0, self.max_id()) as usize
    }
}

pub const TEXTURE_COUNT: usize = 21;
const TEX_SIZE: usize = 16;

struct Image {
    w: usize,
    h: usize,
    rgb: Vec<[u8; 3]>,
}

/// Generated stand-ins for the wall and surface images: bricks, checkers,
/// stripes and gradients in a spread of tints.
pub struct ProceduralTextures {
    images: Vec<Image>,
}

impl ProceduralTextures {
    pub fn new() -> Self {
        let images = (0..TEXTURE_COUNT).map(generate).collect();
        Self { images }
    }
}

impl Default for ProceduralTextures {
    fn default() -> Self {
        Self::new()
    }
}

fn tint(id: usize) -> [u8; 3] {
    const TINTS: [[u8; 3]; 7] = [
        [200, 200, 200],
        [190, 90, 60],
        [90, 150, 80],
        [80, 110, 190],
        [200, 180, 90],
        [150, 90, 170],
        [110, 170, 170],
    ];
    TINTS[id % TINTS.len()]
}

fn scale_rgb(c: [u8; 3], num: u32, den: u32) -> [u8; 3] {
    c.map(|v| (v as u32 * num / den).min(255) as u8)
}

fn generate(id: usize) -> Image {
    let base = tint(id);
    let dark = scale_rgb(base, 1, 2);
    let mut rgb = Vec::with_capacity(TEX_SIZE * TEX_SIZE);
    for y in 0..TEX_SIZE {
        for x in 0..TEX_SIZE {
            let texel = match id / 7 {
                // bricks
                0 => {
                    let row = y / 4;
                    let offset = if row % 2 == 0 { 0 } else { 4 };
                    if y % 4 == 3 || (x + offset) % 8 == 7 {
                        dark
                    } else {
                        base
                    }
                }
                // checkers
                1 => {
                    if (x / 4 + y / 4) % 2 == 0 {
                        base
                    } else {
                        dark
                    }
                }
                // stripes over a vertical gradient
                _ => {
                    let c = scale_rgb(base, (TEX_SIZE + y) as u32, (2 * TEX_SIZE) as u32);
                    if x % 5 == 0 { dark } else { c }
                }
            };
            rgb.push(texel);
        }
    }
    Image {
        w: TEX_SIZE,
        h: TEX_SIZE,
        rgb,
    }
}

impl TextureBank for ProceduralTextures {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn width(&self, id: usize) -> usize {
        self.images.get(id).map_or(1, |i| i.w)
    }

    fn height(&self, id: usize) -> usize {
        self.images.get(id).map_or(1, |i| i.h)
    }

    fn sample(&self, id: usize, x: usize, y: usize) -> [u8; 3] {
        match self.images.get(id) {
            Some(img) => img.rgb[(y % img.h) * img.w + (x % img.w)],
            None => [255, 0, 255],
        }
    }
}
