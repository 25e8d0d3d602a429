use std::collections::HashMap;

use image::{Rgba, RgbaImage, imageops};

use crate::error::AtlasError;

/// Integer rectangle in sheet pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }

    pub fn overlaps(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Normalized coordinates of this rect in a `sheet_width x sheet_height` sheet.
    pub fn to_uv(&self, sheet_width: u32, sheet_height: u32) -> UvRect {
        let (w, h) = (sheet_width.max(1) as f32, sheet_height.max(1) as f32);
        UvRect {
            min_u: self.x as f32 / w,
            min_v: self.y as f32 / h,
            max_u: self.right() as f32 / w,
            max_v: self.bottom() as f32 / h,
        }
    }
}

/// Normalized texture rectangle, all components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub min_u: f32,
    pub min_v: f32,
    pub max_u: f32,
    pub max_v: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect { min_u: 0.0, min_v: 0.0, max_u: 1.0, max_v: 1.0 };

    pub fn width(&self) -> f32 {
        self.max_u - self.min_u
    }

    pub fn height(&self) -> f32 {
        self.max_v - self.min_v
    }
}

/// A sprite's position on the finished sheet. `rect` excludes padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub rect: PixelRect,
}

/// A finished, immutable atlas layout.
#[derive(Debug, Clone)]
pub struct Sheet {
    width: u32,
    height: u32,
    padding: u32,
    placements: Vec<Placement>,
    index: HashMap<String, usize>,
}

impl Sheet {
    pub(crate) fn new(width: u32, height: u32, padding: u32, placements: Vec<Placement>) -> Self {
        let index = placements.iter().enumerate().map(|(i, p)| (p.name.clone(), i)).collect();
        Self { width, height, padding, placements, index }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Placements in packing-tree order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn rect(&self, name: &str) -> Option<PixelRect> {
        self.index.get(name).map(|&i| self.placements[i].rect)
    }

    pub fn uv_rect(&self, name: &str) -> Option<UvRect> {
        self.rect(name).map(|r| r.to_uv(self.width, self.height))
    }

    /// Blits every sprite into one RGBA8 image of sheet dimensions and fills
    /// each padding border by extending the sprite's edge texels.
    pub fn compose(&self, sprites: &HashMap<String, RgbaImage>) -> Result<RgbaImage, AtlasError> {
        let mut out = RgbaImage::new(self.width, self.height);
        for placement in &self.placements {
            let sprite = sprites.get(&placement.name).ok_or_else(|| AtlasError::MissingSprite {
                item: placement.name.clone(),
                path: placement.name.clone(),
            })?;
            let r = placement.rect;
            imageops::replace(&mut out, sprite, r.x as i64, r.y as i64);
            if self.padding > 0 {
                extend_edges(&mut out, r, self.padding);
            }
        }
        Ok(out)
    }
}

/// Copies the nearest edge texel of `inner` into the `padding`-wide frame around it.
fn extend_edges(img: &mut RgbaImage, inner: PixelRect, padding: u32) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let x0 = inner.x.saturating_sub(padding);
    let y0 = inner.y.saturating_sub(padding);
    let x1 = (inner.right() + padding).min(img.width());
    let y1 = (inner.bottom() + padding).min(img.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let inside = (inner.x..inner.right()).contains(&x) && (inner.y..inner.bottom()).contains(&y);
            if inside {
                continue;
            }
            let sx = x.clamp(inner.x, inner.right() - 1);
            let sy = y.clamp(inner.y, inner.bottom() - 1);
            let px = *img.get_pixel(sx, sy);
            img.put_pixel(x, y, px);
        }
    }
}

/// Base image followed by successively halved levels, `levels` images in total.
///
/// `levels` is clamped to `[1, floor(log2(max_dim)) + 1]`.
pub fn mip_chain(base: &RgbaImage, levels: u32) -> Vec<RgbaImage> {
    let max_dim = base.width().max(base.height()).max(1);
    let possible = 32 - max_dim.leading_zeros();
    let levels = levels.clamp(1, possible);

    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.clone());
    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let next = box_downsample(prev);
        chain.push(next);
    }
    chain
}

/// Halves `src` by averaging each 2x2 block. Texels never bleed in from
/// outside their block, so padded sprites stay separate.
fn box_downsample(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
    RgbaImage::from_fn(nw, nh, |x, y| {
        let xs = [(2 * x).min(w - 1), (2 * x + 1).min(w - 1)];
        let ys = [(2 * y).min(h - 1), (2 * y + 1).min(h - 1)];
        let mut sum = [0u32; 4];
        for &sy in &ys {
            for &sx in &xs {
                for (acc, c) in sum.iter_mut().zip(src.get_pixel(sx, sy).0) {
                    *acc += u32::from(c);
                }
            }
        }
        Rgba(sum.map(|v| ((v + 2) / 4) as u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(padding: u32, placements: &[(&str, PixelRect)]) -> Sheet {
        let placements = placements
            .iter()
            .map(|(n, r)| Placement { name: n.to_string(), rect: *r })
            .collect();
        Sheet::new(16, 16, padding, placements)
    }

    #[test]
    fn uv_rect_divides_by_sheet_size() {
        let sheet = sheet_with(0, &[("a", PixelRect::new(4, 8, 4, 8))]);
        let uv = sheet.uv_rect("a").unwrap();
        assert_eq!(uv, UvRect { min_u: 0.25, min_v: 0.5, max_u: 0.5, max_v: 1.0 });
        assert!(sheet.uv_rect("missing").is_none());
    }

    #[test]
    fn overlap_is_strict() {
        let a = PixelRect::new(0, 0, 4, 4);
        assert!(!a.overlaps(&PixelRect::new(4, 0, 4, 4)));
        assert!(a.overlaps(&PixelRect::new(3, 3, 4, 4)));
    }

    #[test]
    fn compose_blits_at_placement() {
        let sheet = sheet_with(0, &[("red", PixelRect::new(2, 3, 2, 2))]);
        let mut sprites = HashMap::new();
        sprites.insert("red".to_string(), RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));

        let img = sheet.compose(&sprites).unwrap();
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(img.get_pixel(2, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(3, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 4), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn padding_extends_edge_texels() {
        let sheet = sheet_with(1, &[("s", PixelRect::new(1, 1, 2, 1))]);
        let mut sprite = RgbaImage::new(2, 1);
        sprite.put_pixel(0, 0, Rgba([10, 0, 0, 255]));
        sprite.put_pixel(1, 0, Rgba([20, 0, 0, 255]));
        let mut sprites = HashMap::new();
        sprites.insert("s".to_string(), sprite);

        let img = sheet.compose(&sprites).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([10, 0, 0, 255]));
        assert_eq!(img.get_pixel(3, 2), &Rgba([20, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([10, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn compose_reports_missing_sprite() {
        let sheet = sheet_with(0, &[("gone", PixelRect::new(0, 0, 1, 1))]);
        assert!(matches!(
            sheet.compose(&HashMap::new()),
            Err(AtlasError::MissingSprite { .. })
        ));
    }

    #[test]
    fn mip_chain_halves_until_clamped() {
        let base = RgbaImage::from_pixel(16, 8, Rgba([255, 255, 255, 255]));
        let chain = mip_chain(&base, 4);
        let dims: Vec<_> = chain.iter().map(|m| m.dimensions()).collect();
        assert_eq!(dims, [(16, 8), (8, 4), (4, 2), (2, 1)]);

        let capped = mip_chain(&base, 99);
        assert_eq!(capped.len(), 5);
        assert_eq!(capped.last().unwrap().dimensions(), (1, 1));
        assert_eq!(mip_chain(&base, 0).len(), 1);
    }

    #[test]
    fn mip_levels_average_whole_blocks_only() {
        // 2-texel black/white stripes: each 2x2 block is a single colour.
        let base = RgbaImage::from_fn(8, 2, |x, _| {
            let v = if (x / 2) % 2 == 0 { 0 } else { 255 };
            Rgba([v, v, v, 255])
        });
        let chain = mip_chain(&base, 2);
        let row: Vec<u8> = (0..4).map(|x| chain[1].get_pixel(x, 0)[0]).collect();
        assert_eq!(row, [0, 255, 0, 255]);

        // Mixed blocks round to the mean.
        let checker = RgbaImage::from_fn(2, 2, |x, y| {
            let v = if (x + y) % 2 == 0 { 0 } else { 255 };
            Rgba([v, 0, 0, 255])
        });
        assert_eq!(mip_chain(&checker, 2)[1].get_pixel(0, 0), &Rgba([128, 0, 0, 255]));
    }
}
