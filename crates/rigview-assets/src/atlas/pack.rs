//! Greedy first-fit guillotine packer over a binary space partition.
//!
//! Slots live in an arena and refer to their children by index. Placing a
//! holder in an empty slot splits the remainder into up to two children:
//! one to the right (holder height) and one below (full slot width). The
//! holder footprint plus the children tile the parent exactly.

use std::collections::HashSet;

use super::sheet::{PixelRect, Placement, Sheet};
use crate::error::PackingError;

/// A named image footprint to place on the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasHolder {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl AtlasHolder {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self { name: name.into(), width, height }
    }
}

type SlotId = usize;

#[derive(Debug, Clone)]
struct Slot {
    rect: PixelRect,
    /// Index into the sorted holder list.
    holder: Option<usize>,
    children: [Option<SlotId>; 2],
}

impl Slot {
    fn empty(rect: PixelRect) -> Self {
        Self { rect, holder: None, children: [None, None] }
    }
}

/// Slot arena plus the root slots added by each growth step.
#[derive(Debug, Default)]
struct SlotTree {
    slots: Vec<Slot>,
    roots: Vec<SlotId>,
    size: u32,
}

impl SlotTree {
    fn push(&mut self, rect: PixelRect) -> SlotId {
        self.slots.push(Slot::empty(rect));
        self.slots.len() - 1
    }

    fn add_root(&mut self, rect: PixelRect) -> SlotId {
        let id = self.push(rect);
        self.roots.push(id);
        id
    }

    /// Depth-first search for the first empty slot under `root` that fits.
    ///
    /// Occupied slots too small for the footprint are not descended into:
    /// their children are smaller still.
    fn find_free(&self, root: SlotId, width: u32, height: u32) -> Option<SlotId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let slot = &self.slots[id];
            if !slot.rect.fits(width, height) {
                continue;
            }
            if slot.holder.is_none() {
                return Some(id);
            }
            stack.extend(slot.children.iter().rev().flatten());
        }
        None
    }

    fn occupy(&mut self, id: SlotId, holder: usize, width: u32, height: u32) {
        let r = self.slots[id].rect;
        let right = (r.width > width)
            .then(|| self.push(PixelRect::new(r.x + width, r.y, r.width - width, height)));
        let below = (r.height > height)
            .then(|| self.push(PixelRect::new(r.x, r.y + height, r.width, r.height - height)));

        let slot = &mut self.slots[id];
        slot.holder = Some(holder);
        slot.children = [right, below];
    }

    fn allocate(&mut self, holder: usize, width: u32, height: u32) -> Option<SlotId> {
        let found = self.roots.iter().find_map(|&root| self.find_free(root, width, height));
        if let Some(id) = found {
            self.occupy(id, holder, width, height);
        }
        found
    }

    /// Occupied slots in root order, each subtree pre-order.
    fn occupied(&self) -> Vec<(usize, PixelRect)> {
        let mut out = Vec::new();
        for &root in &self.roots {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                let slot = &self.slots[id];
                if let Some(h) = slot.holder {
                    out.push((h, slot.rect));
                }
                stack.extend(slot.children.iter().rev().flatten());
            }
        }
        out
    }
}

/// Packs named footprints into one power-of-two square sheet.
///
/// Packing is deterministic: holders are sorted by width descending, then
/// height descending, then name, so equal inputs give equal layouts.
#[derive(Debug, Clone, Default)]
pub struct AtlasPacker {
    holders: Vec<AtlasHolder>,
    padding: u32,
    max_size: Option<u32>,
}

impl AtlasPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Border kept free around every sprite, on every side.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Largest allowed sheet edge, typically the device's max texture size.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn add(&mut self, name: impl Into<String>, width: u32, height: u32) {
        self.holders.push(AtlasHolder::new(name, width, height));
    }

    pub fn extend(&mut self, holders: impl IntoIterator<Item = AtlasHolder>) {
        self.holders.extend(holders);
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// Sorted holders with their padded footprints.
    fn prepare(&self) -> Result<Vec<(&AtlasHolder, u32, u32)>, PackingError> {
        if self.holders.is_empty() {
            return Err(PackingError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.holders.len());
        let mut sorted = Vec::with_capacity(self.holders.len());
        for h in &self.holders {
            if h.width == 0 || h.height == 0 {
                return Err(PackingError::ZeroSized { name: h.name.clone() });
            }
            if !seen.insert(h.name.as_str()) {
                return Err(PackingError::DuplicateName { name: h.name.clone() });
            }
            let border = self.padding.checked_mul(2);
            let padded_w = border.and_then(|b| h.width.checked_add(b));
            let padded_h = border.and_then(|b| h.height.checked_add(b));
            match (padded_w, padded_h) {
                (Some(w), Some(h2)) => sorted.push((h, w, h2)),
                _ => {
                    return Err(PackingError::SheetTooLarge {
                        name: h.name.clone(),
                        required: u32::MAX,
                        max: self.max_size.unwrap_or(u32::MAX),
                    });
                }
            }
        }
        sorted.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| a.0.name.cmp(&b.0.name))
        });
        Ok(sorted)
    }

    fn check_size(&self, name: &str, required: Option<u32>) -> Result<u32, PackingError> {
        let max = self.max_size.unwrap_or(u32::MAX);
        match required {
            Some(size) if size <= max => Ok(size),
            Some(size) => Err(PackingError::SheetTooLarge { name: name.to_string(), required: size, max }),
            None => Err(PackingError::SheetTooLarge { name: name.to_string(), required: u32::MAX, max }),
        }
    }

    /// Grows the sheet so that `width x height` fits and places it in one of
    /// the two new edge slots.
    fn grow_and_allocate(
        &self,
        tree: &mut SlotTree,
        name: &str,
        holder: usize,
        width: u32,
        height: u32,
    ) -> Result<(), PackingError> {
        let current = tree.size;
        let wanted = current
            .checked_add(width)
            .zip(current.checked_add(height))
            .map(|(w, h)| w.max(h))
            .and_then(u32::checked_next_power_of_two);
        let size = self.check_size(name, wanted)?;

        let right = tree.add_root(PixelRect::new(current, 0, size - current, current));
        let below = tree.add_root(PixelRect::new(0, current, size, size - current));
        tree.size = size;
        log::trace!("atlas grew {current} -> {size} for '{name}'");

        let target = [right, below]
            .into_iter()
            .find(|&id| tree.slots[id].rect.fits(width, height))
            .ok_or_else(|| PackingError::NoFit {
                name: name.to_string(),
                width,
                height,
                sheet_size: size,
            })?;
        tree.occupy(target, holder, width, height);
        Ok(())
    }

    fn build_tree(&self) -> Result<(SlotTree, Vec<(&AtlasHolder, u32, u32)>), PackingError> {
        let sorted = self.prepare()?;
        let (first, w0, h0) = sorted[0];
        let seed = self.check_size(&first.name, w0.max(h0).checked_next_power_of_two())?;

        let mut tree = SlotTree { size: seed, ..SlotTree::default() };
        tree.add_root(PixelRect::new(0, 0, seed, seed));

        for (i, &(holder, w, h)) in sorted.iter().enumerate() {
            if tree.allocate(i, w, h).is_none() {
                self.grow_and_allocate(&mut tree, &holder.name, i, w, h)?;
            }
        }
        Ok((tree, sorted))
    }

    /// Packs all holders. Does not consume the packer; repeated calls give
    /// identical sheets.
    pub fn pack(&self) -> Result<Sheet, PackingError> {
        let (tree, sorted) = self.build_tree()?;
        let p = self.padding;
        let placements = tree
            .occupied()
            .into_iter()
            .map(|(i, slot)| {
                let holder = sorted[i].0;
                Placement {
                    name: holder.name.clone(),
                    rect: PixelRect::new(slot.x + p, slot.y + p, holder.width, holder.height),
                }
            })
            .collect::<Vec<_>>();

        log::debug!("packed {} sprites into {}x{} sheet", placements.len(), tree.size, tree.size);
        Ok(Sheet::new(tree.size, tree.size, p, placements))
    }
}

/// Packs `holders` with no padding and no size limit.
pub fn pack(holders: &[AtlasHolder]) -> Result<Sheet, PackingError> {
    let mut packer = AtlasPacker::new();
    packer.extend(holders.iter().cloned());
    packer.pack()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(sheet: &Sheet) {
        let ps = sheet.placements();
        for (i, a) in ps.iter().enumerate() {
            assert!(a.rect.right() <= sheet.width() && a.rect.bottom() <= sheet.height(), "{a:?}");
            for b in &ps[i + 1..] {
                assert!(!a.rect.overlaps(&b.rect), "{a:?} overlaps {b:?}");
            }
        }
        assert!(sheet.width().is_power_of_two());
        assert_eq!(sheet.width(), sheet.height());
    }

    /// Every parent slot is tiled exactly by its footprint and children.
    fn assert_tiling(tree: &SlotTree, footprints: &[(u32, u32)]) {
        for slot in &tree.slots {
            let Some(h) = slot.holder else {
                assert!(slot.children.iter().all(Option::is_none));
                continue;
            };
            let (w, hgt) = footprints[h];
            let mut area = w as u64 * hgt as u64;
            for child in slot.children.iter().flatten() {
                let c = tree.slots[*child].rect;
                assert!(c.x >= slot.rect.x && c.right() <= slot.rect.right());
                assert!(c.y >= slot.rect.y && c.bottom() <= slot.rect.bottom());
                area += c.area();
            }
            assert_eq!(area, slot.rect.area());
        }
    }

    #[test]
    fn three_holders_scenario() {
        let sheet = pack(&[
            AtlasHolder::new("C", 16, 16),
            AtlasHolder::new("A", 64, 32),
            AtlasHolder::new("B", 32, 32),
        ])
        .unwrap();

        let order: Vec<_> = sheet.placements().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, ["A", "B", "C"]);
        assert!(sheet.width() >= 64);
        assert_eq!(sheet.rect("A").unwrap(), PixelRect::new(0, 0, 64, 32));
        assert_eq!(sheet.rect("B").unwrap(), PixelRect::new(0, 32, 32, 32));
        assert_eq!(sheet.rect("C").unwrap(), PixelRect::new(32, 32, 16, 16));
        assert_valid(&sheet);
    }

    #[test]
    fn sort_is_width_then_height_then_name() {
        let mut packer = AtlasPacker::new();
        packer.add("b", 8, 4);
        packer.add("a", 8, 4);
        packer.add("tall", 8, 8);
        packer.add("wide", 16, 1);
        let sorted: Vec<_> = packer.prepare().unwrap().iter().map(|h| h.0.name.clone()).collect();
        assert_eq!(sorted, ["wide", "tall", "a", "b"]);
    }

    #[test]
    fn packing_is_idempotent() {
        let holders: Vec<_> = (1..=12)
            .map(|i| AtlasHolder::new(format!("s{i}"), (i * 7) % 23 + 1, (i * 5) % 17 + 1))
            .collect();
        let a = pack(&holders).unwrap();
        let b = pack(&holders).unwrap();
        assert_eq!(a.placements(), b.placements());
        assert_eq!(a.width(), b.width());
    }

    #[test]
    fn growth_keeps_sheet_square_power_of_two() {
        let holders: Vec<_> =
            (0..20).map(|i| AtlasHolder::new(format!("tile{i:02}"), 16, 16)).collect();
        let sheet = pack(&holders).unwrap();
        assert_eq!(sheet.len(), 20);
        assert_eq!(sheet.width(), 128);
        assert_valid(&sheet);
    }

    #[test]
    fn mixed_sizes_never_overlap_and_tile_exactly() {
        let holders: Vec<_> = (0..40)
            .map(|i| AtlasHolder::new(format!("n{i}"), (i * 13) % 31 + 1, (i * 29) % 19 + 1))
            .collect();
        let mut packer = AtlasPacker::new();
        packer.extend(holders.iter().cloned());

        let (tree, sorted) = packer.build_tree().unwrap();
        let footprints: Vec<_> = sorted.iter().map(|&(_, w, h)| (w, h)).collect();
        assert_tiling(&tree, &footprints);

        let sheet = packer.pack().unwrap();
        assert_eq!(sheet.len(), holders.len());
        assert_valid(&sheet);
        for p in sheet.placements() {
            let uv = sheet.uv_rect(&p.name).unwrap();
            for v in [uv.min_u, uv.min_v, uv.max_u, uv.max_v] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn padding_reserves_border() {
        let mut packer = AtlasPacker::new().with_padding(2);
        packer.add("a", 12, 12);
        packer.add("b", 12, 12);
        let sheet = packer.pack().unwrap();

        let a = sheet.rect("a").unwrap();
        let b = sheet.rect("b").unwrap();
        assert_eq!((a.width, a.height), (12, 12));
        assert_eq!((a.x, a.y), (2, 2));
        assert!(b.x >= a.right() + 4 || b.y >= a.bottom() + 4);
        assert_valid(&sheet);
    }

    #[test]
    fn empty_zero_and_duplicate_inputs_are_errors() {
        assert_eq!(pack(&[]).unwrap_err(), PackingError::Empty);
        assert_eq!(
            pack(&[AtlasHolder::new("z", 0, 4)]).unwrap_err(),
            PackingError::ZeroSized { name: "z".into() }
        );
        assert_eq!(
            pack(&[AtlasHolder::new("d", 1, 1), AtlasHolder::new("d", 2, 2)]).unwrap_err(),
            PackingError::DuplicateName { name: "d".into() }
        );
    }

    #[test]
    fn max_size_is_enforced() {
        let mut packer = AtlasPacker::new().with_max_size(32);
        packer.add("a", 32, 32);
        packer.add("b", 32, 32);
        assert!(matches!(
            packer.pack(),
            Err(PackingError::SheetTooLarge { required: 64, max: 32, .. })
        ));
    }

    #[test]
    fn huge_holders_fail_without_overflow() {
        let mut packer = AtlasPacker::new();
        packer.add("a", u32::MAX - 1, 1);
        packer.add("b", u32::MAX - 1, 1);
        assert!(matches!(packer.pack(), Err(PackingError::SheetTooLarge { .. })));
    }
}
