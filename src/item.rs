use crate::types::{Rotation, Vector3};

/// An item box: fixed base extents, a current rotation and, once placed, a position.
///
/// `id` is a label shared by every unit cut from the same [`ItemSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBox {
    pub id: String,
    base_dim: Vector3,
    rotation: Rotation,
    position: Vector3,
    /// Grams.
    pub product_net_weight: f64,
    /// Grams. Informational only.
    pub product_gross_weight: f64,
    /// Grams.
    pub box_net_weight: f64,
}

impl OrientedBox {
    pub fn new(id: impl Into<String>, base_dim: Vector3) -> Self {
        debug_assert!(
            base_dim.is_valid_extent(),
            "item extents must be finite and non-negative, got {base_dim}"
        );
        Self {
            id: id.into(),
            base_dim,
            rotation: Rotation::default(),
            position: Vector3::ORIGIN,
            product_net_weight: 0.0,
            product_gross_weight: 0.0,
            box_net_weight: 0.0,
        }
    }

    pub fn with_weights(mut self, product_net: f64, product_gross: f64, box_net: f64) -> Self {
        self.product_net_weight = product_net;
        self.product_gross_weight = product_gross;
        self.box_net_weight = box_net;
        self
    }

    pub fn base_dim(&self) -> Vector3 {
        self.base_dim
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    /// Extents under the current rotation.
    pub fn dimensions(&self) -> Vector3 {
        self.rotation.apply(self.base_dim)
    }

    pub fn volume(&self) -> f64 {
        self.base_dim.volume()
    }

    /// Grams counted against a container's weight limit.
    pub fn effective_weight(&self) -> f64 {
        self.product_net_weight + self.box_net_weight
    }

    /// AABB overlap on all three axes. Touching faces do not collide.
    pub fn collides(&self, other: &OrientedBox) -> bool {
        let (a_pos, a_dim) = (self.position, self.dimensions());
        let (b_pos, b_dim) = (other.position, other.dimensions());

        if a_pos.length + a_dim.length <= b_pos.length
            || b_pos.length + b_dim.length <= a_pos.length
        {
            return false;
        }
        if a_pos.width + a_dim.width <= b_pos.width || b_pos.width + b_dim.width <= a_pos.width {
            return false;
        }
        if a_pos.height + a_dim.height <= b_pos.height
            || b_pos.height + b_dim.height <= a_pos.height
        {
            return false;
        }
        true
    }
}

/// Demand: a template item and how many units of it to place.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub template: OrientedBox,
    pub qty: u32,
}

impl ItemSpec {
    pub fn new(template: OrientedBox, qty: u32) -> Self {
        Self { template, qty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(l: f64, w: f64, h: f64, at: (f64, f64, f64)) -> OrientedBox {
        let mut b = OrientedBox::new("b", Vector3::new(l, w, h));
        b.set_position(Vector3::new(at.0, at.1, at.2));
        b
    }

    #[test]
    fn test_dimensions_follow_rotation() {
        let mut b = OrientedBox::new("a", Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(b.dimensions(), Vector3::new(10.0, 20.0, 30.0));
        b.set_rotation(Rotation::HLW);
        assert_eq!(b.dimensions(), Vector3::new(30.0, 10.0, 20.0));
        b.set_rotation(Rotation::LWH);
        assert_eq!(b.dimensions(), Vector3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_touching_faces_do_not_collide() {
        let a = placed(10.0, 10.0, 10.0, (0.0, 0.0, 0.0));
        let b = placed(10.0, 10.0, 10.0, (10.0, 0.0, 0.0));
        let c = placed(10.0, 10.0, 10.0, (0.0, 0.0, 10.0));
        assert!(!a.collides(&b));
        assert!(!b.collides(&a));
        assert!(!a.collides(&c));
    }

    #[test]
    fn test_overlap_on_all_axes_collides() {
        let a = placed(10.0, 10.0, 10.0, (0.0, 0.0, 0.0));
        let b = placed(10.0, 10.0, 10.0, (5.0, 5.0, 5.0));
        assert!(a.collides(&b));
        assert!(b.collides(&a));
    }

    #[test]
    fn test_overlap_on_two_axes_only() {
        let a = placed(10.0, 10.0, 10.0, (0.0, 0.0, 0.0));
        let b = placed(10.0, 10.0, 10.0, (5.0, 5.0, 20.0));
        assert!(!a.collides(&b));
    }

    #[test]
    fn test_collision_uses_rotated_extents() {
        let a = placed(10.0, 10.0, 10.0, (0.0, 0.0, 0.0));
        let mut b = placed(5.0, 30.0, 5.0, (12.0, 0.0, 0.0));
        assert!(!a.collides(&b));
        b.set_position(Vector3::new(0.0, 12.0, 0.0));
        b.set_rotation(Rotation::WLH);
        assert!(!a.collides(&b));
        b.set_position(Vector3::new(0.0, 5.0, 0.0));
        assert!(a.collides(&b));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = OrientedBox::new("a", Vector3::new(1.0, 2.0, 3.0)).with_weights(500.0, 650.0, 100.0);
        a.set_rotation(Rotation::WHL);
        let copy = a.clone();
        a.set_rotation(Rotation::LWH);
        a.set_position(Vector3::new(4.0, 4.0, 4.0));
        assert_eq!(copy.rotation(), Rotation::WHL);
        assert_eq!(copy.position(), Vector3::ORIGIN);
        assert_eq!(copy.effective_weight(), 600.0);
    }
}
