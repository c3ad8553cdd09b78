use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed mapping from dest pixels to the src pixel that covers them
pub struct ScaleLut {
    xs: Vec<usize>,
    rows: Vec<usize>, // src row offsets
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            xs: Vec::new(),
            rows: Vec::new(),
        }
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let xs = (0..dst_w)
        .map(|x| (x * src_w / dst_w.max(1)).min(src_w.saturating_sub(1)))
        .collect();
    let rows = (0..dst_h)
        .map(|y| (y * src_h / dst_h.max(1)).min(src_h.saturating_sub(1)) * src_w)
        .collect();
    ScaleLut { xs, rows }
}

/// Parallel nearest neighbour stretch, keeping the grid pixels hard edged.
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest_stretch(dst: &mut [u32], dw: usize, src: &[u32], lut: &ScaleLut) {
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&row) = lut.rows.get(y) else {
            return;
        };
        for (d, &x) in dst_row.iter_mut().zip(&lut.xs) {
            *d = src[row + x];
        }
    });
}
