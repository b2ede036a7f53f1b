use std::collections::HashSet;

use crate::container::{Bin, ContainerSpec};
use crate::item::{ItemSpec, OrientedBox};
use crate::types::{Axis, Vector3};

/// Tunables for the placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackingConfig {
    /// Above this many total units, every unit uses the simple strategy.
    pub simple_threshold: u64,
    /// The grid scan only runs while a bin holds fewer items than this.
    pub grid_item_limit: usize,
    pub grid_divisions: f64,
    pub min_grid_step: f64,
}

impl PackingConfig {
    pub const DEFAULT_SIMPLE_THRESHOLD: u64 = 100;
    pub const DEFAULT_GRID_ITEM_LIMIT: usize = 5;
    pub const DEFAULT_GRID_DIVISIONS: f64 = 5.0;
    pub const DEFAULT_MIN_GRID_STEP: f64 = 5.0;

    pub fn with_simple_threshold(mut self, threshold: u64) -> Self {
        self.simple_threshold = threshold;
        self
    }

    fn grid_step(&self, extent: f64) -> f64 {
        f64::max(self.min_grid_step, (extent / self.grid_divisions).floor())
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            simple_threshold: Self::DEFAULT_SIMPLE_THRESHOLD,
            grid_item_limit: Self::DEFAULT_GRID_ITEM_LIMIT,
            grid_divisions: Self::DEFAULT_GRID_DIVISIONS,
            min_grid_step: Self::DEFAULT_MIN_GRID_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scored search over pivots and a coarse grid.
    Full,
    /// First fit over face-adjacent pivots only.
    Simple,
}

#[derive(Debug, Clone)]
pub struct PackResult {
    /// Opening order.
    pub bins: Vec<Bin>,
    pub unpacked: Vec<OrientedBox>,
}

impl PackResult {
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn packed_count(&self) -> usize {
        self.bins.iter().map(|b| b.items.len()).sum()
    }
}

pub struct PackingEngine {
    items: Vec<ItemSpec>,
    containers: Vec<ContainerSpec>,
    config: PackingConfig,
}

impl PackingEngine {
    pub fn new(items: Vec<ItemSpec>, containers: Vec<ContainerSpec>) -> Self {
        Self {
            items,
            containers,
            config: PackingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PackingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|s| s.qty as u64).sum()
    }

    pub fn strategy(&self) -> Strategy {
        if self.total_units() > self.config.simple_threshold {
            Strategy::Simple
        } else {
            Strategy::Full
        }
    }

    pub fn pack(mut self) -> PackResult {
        // Largest containers and largest items first
        self.containers
            .sort_by(|a, b| b.template.volume().total_cmp(&a.template.volume()));
        self.items
            .sort_by(|a, b| b.template.volume().total_cmp(&a.template.volume()));

        let strategy = self.strategy();
        tracing::debug!(units = self.total_units(), ?strategy, "packing");

        let mut bins: Vec<Bin> = Vec::new();
        let mut unpacked: Vec<OrientedBox> = Vec::new();

        for spec_idx in 0..self.items.len() {
            for _ in 0..self.items[spec_idx].qty {
                let mut unit = self.items[spec_idx].template.clone();

                let mut packed = false;
                for bin in bins.iter_mut() {
                    if !bin.can_admit(&unit) {
                        continue;
                    }
                    if self.place(&mut unit, bin, strategy) {
                        packed = true;
                        break;
                    }
                }
                if packed {
                    continue;
                }

                if let Some(bin) = self.open_bin_for(&mut unit, strategy) {
                    tracing::debug!(container = %bin.id, item = %unit.id, "opened container");
                    bins.push(bin);
                } else {
                    tracing::debug!(item = %unit.id, dim = %unit.base_dim(), "item left unpacked");
                    unit.set_position(Vector3::ORIGIN);
                    unpacked.push(unit);
                }
            }
        }

        let result = PackResult { bins, unpacked };
        tracing::info!(
            containers = result.bin_count(),
            packed = result.packed_count(),
            unpacked = result.unpacked.len(),
            "packing finished"
        );
        result
    }

    /// Tries each container spec with supply left; the first one that takes `unit` is spent.
    fn open_bin_for(&mut self, unit: &mut OrientedBox, strategy: Strategy) -> Option<Bin> {
        let config = self.config;
        for spec in self.containers.iter_mut().filter(|s| s.qty > 0) {
            let mut bin = spec.template.clone();
            if !bin.can_admit(unit) {
                continue;
            }
            if place_with(&config, unit, &mut bin, strategy) {
                spec.qty -= 1;
                return Some(bin);
            }
        }
        None
    }

    fn place(&self, unit: &mut OrientedBox, bin: &mut Bin, strategy: Strategy) -> bool {
        place_with(&self.config, unit, bin, strategy)
    }
}

fn place_with(config: &PackingConfig, unit: &mut OrientedBox, bin: &mut Bin, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Full => pack_item(config, unit, bin),
        Strategy::Simple => pack_item_simple(unit, bin),
    }
}

/// Full strategy: score every feasible candidate position and commit the best one.
pub fn pack_item(config: &PackingConfig, item: &mut OrientedBox, bin: &mut Bin) -> bool {
    if bin.items.is_empty() {
        return pack_to_box(item, bin, Vector3::ORIGIN);
    }
    match find_best_position(config, item, bin) {
        Some(pos) => pack_to_box(item, bin, pos),
        None => {
            item.set_position(Vector3::ORIGIN);
            false
        }
    }
}

/// Simple strategy: first pivot/rotation that fits, no scoring and no grid.
pub fn pack_item_simple(item: &mut OrientedBox, bin: &mut Bin) -> bool {
    if bin.items.is_empty() {
        return pack_to_box(item, bin, Vector3::ORIGIN);
    }
    // Placed items outer, axes inner: the first item's three faces are tried before the next item's
    let pivots: Vec<Vector3> = bin
        .items
        .iter()
        .flat_map(|placed| {
            Axis::ALL
                .map(|axis| Vector3::compute_pivot(axis, placed.position(), placed.dimensions()))
        })
        .collect();
    pivots.into_iter().any(|pivot| pack_to_box(item, bin, pivot))
}

/// Candidate positions in visiting order, deduplicated by exact coordinates.
fn candidate_positions(config: &PackingConfig, bin: &Bin) -> Vec<Vector3> {
    let mut seen: HashSet<[u64; 3]> = HashSet::new();
    let mut candidates = Vec::new();
    let mut push = |pos: Vector3| {
        // +0.0 and -0.0 are the same position
        let key = [pos.length, pos.width, pos.height].map(|v| (v + 0.0).to_bits());
        if seen.insert(key) {
            candidates.push(pos);
        }
    };

    push(Vector3::ORIGIN);
    for placed in &bin.items {
        for axis in Axis::ALL {
            push(Vector3::compute_pivot(axis, placed.position(), placed.dimensions()));
        }
    }

    if bin.items.len() < config.grid_item_limit {
        let usable = bin.usable_dim();
        let step_l = config.grid_step(usable.length);
        let step_w = config.grid_step(usable.width);
        let step_h = config.grid_step(usable.height);

        let mut l = 0.0;
        while l < usable.length {
            let mut w = 0.0;
            while w < usable.width {
                let mut h = 0.0;
                while h < usable.height {
                    push(Vector3::new(l, w, h));
                    h += step_h;
                }
                w += step_w;
            }
            l += step_l;
        }
    }

    candidates
}

/// Highest-scoring feasible position; the rotation is chosen later by [`pack_to_box`].
fn find_best_position(config: &PackingConfig, item: &mut OrientedBox, bin: &Bin) -> Option<Vector3> {
    let usable = bin.usable_dim();
    let max_reach = usable.length + usable.width + usable.height;
    let mut best: Option<(Vector3, f64)> = None;

    for pos in candidate_positions(config, bin) {
        item.set_position(pos);
        let feasible = bin.permitted_rotations().iter().any(|&rot| {
            item.set_rotation(rot);
            bin.contains(item) && !bin.collides_with_any(item)
        });
        if !feasible {
            continue;
        }

        let on_floor = pos.height == 0.0;
        let on_wall = pos.length == 0.0 || pos.width == 0.0;
        if on_floor && on_wall {
            return Some(pos);
        }

        let distance = (max_reach - (pos.length + pos.width + pos.height)) / max_reach;
        let bottom = if on_floor { 0.5 } else { 0.0 };
        let corner = if on_wall { 0.3 } else { 0.0 };
        let score = distance + bottom + corner;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((pos, score));
        }
    }

    best.map(|(pos, _)| pos)
}

/// Places a copy of `item` at `pivot` using the first permitted rotation that fits.
///
/// On failure the item's position is reset to the origin.
pub fn pack_to_box(item: &mut OrientedBox, bin: &mut Bin, pivot: Vector3) -> bool {
    item.set_position(pivot);
    for &rot in bin.permitted_rotations() {
        item.set_rotation(rot);
        if !bin.contains(item) {
            continue;
        }
        if bin.collides_with_any(item) {
            continue;
        }
        bin.items.push(item.clone());
        return true;
    }
    item.set_position(Vector3::ORIGIN);
    false
}
