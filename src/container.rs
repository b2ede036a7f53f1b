use crate::item::OrientedBox;
use crate::types::{LabelOrientation, PackingMode, Rotation, Vector3};

/// A container with a fixed usable interior and the items placed in it so far.
#[derive(Debug, Clone)]
pub struct Bin {
    pub id: String,
    usable_dim: Vector3,
    /// Placement order.
    pub items: Vec<OrientedBox>,
    pub label_orientation: LabelOrientation,
    pub packing_mode: PackingMode,
    /// Kilograms. Only enforced in weight mode when positive.
    pub max_weight: f64,
    /// Kilograms of tare.
    pub net_weight: f64,
}

impl Bin {
    pub fn new(id: impl Into<String>, usable_dim: Vector3) -> Self {
        debug_assert!(
            usable_dim.is_valid_extent(),
            "container extents must be finite and non-negative, got {usable_dim}"
        );
        Self {
            id: id.into(),
            usable_dim,
            items: Vec::new(),
            label_orientation: LabelOrientation::default(),
            packing_mode: PackingMode::default(),
            max_weight: 0.0,
            net_weight: 0.0,
        }
    }

    pub fn with_orientation(mut self, orientation: LabelOrientation) -> Self {
        self.label_orientation = orientation;
        self
    }

    pub fn with_weight_limit(mut self, mode: PackingMode, max_weight: f64, net_weight: f64) -> Self {
        self.packing_mode = mode;
        self.max_weight = max_weight;
        self.net_weight = net_weight;
        self
    }

    pub fn usable_dim(&self) -> Vector3 {
        self.usable_dim
    }

    pub fn volume(&self) -> f64 {
        self.usable_dim.volume()
    }

    pub fn permitted_rotations(&self) -> &'static [Rotation] {
        self.label_orientation.permitted_rotations()
    }

    fn weight_limited(&self) -> bool {
        self.packing_mode == PackingMode::Weight && self.max_weight > 0.0
    }

    /// Grams: tare plus every item's effective weight. Zero outside weight mode.
    pub fn current_weight(&self) -> f64 {
        if self.packing_mode != PackingMode::Weight {
            return 0.0;
        }
        self.net_weight * 1000.0
            + self
                .items
                .iter()
                .map(OrientedBox::effective_weight)
                .sum::<f64>()
    }

    pub fn can_admit(&self, candidate: &OrientedBox) -> bool {
        if !self.weight_limited() {
            return true;
        }
        self.current_weight() + candidate.effective_weight() <= self.max_weight * 1000.0
    }

    /// True when `item`, at its current position and rotation, stays inside the interior.
    pub fn contains(&self, item: &OrientedBox) -> bool {
        item.dimensions().fits_in_at(item.position(), self.usable_dim)
    }

    pub fn collides_with_any(&self, item: &OrientedBox) -> bool {
        self.items.iter().any(|placed| item.collides(placed))
    }

    pub fn used_volume(&self) -> f64 {
        self.items.iter().map(OrientedBox::volume).sum()
    }

    /// Fraction of the usable volume occupied, 0.0 for a degenerate container.
    pub fn utilization(&self) -> f64 {
        let volume = self.volume();
        if volume == 0.0 {
            return 0.0;
        }
        self.used_volume() / volume
    }
}

/// Supply: a template container and how many more may be opened.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub template: Bin,
    pub qty: u32,
}

impl ContainerSpec {
    pub fn new(template: Bin, qty: u32) -> Self {
        Self { template, qty }
    }
}
