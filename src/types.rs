use serde::{Deserialize, Serialize};

/// Three orthogonal extents (or a position) in one length unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Vector3 {
    pub const ORIGIN: Vector3 = Vector3 {
        length: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn get_by_axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.length,
            Axis::Y => self.width,
            Axis::Z => self.height,
        }
    }

    /// Position directly beside `pos` along `axis`, for a box of extents `dims` at `pos`.
    pub fn compute_pivot(axis: Axis, pos: Vector3, dims: Vector3) -> Vector3 {
        match axis {
            Axis::X => Vector3::new(pos.length + dims.length, pos.width, pos.height),
            Axis::Y => Vector3::new(pos.length, pos.width + dims.width, pos.height),
            Axis::Z => Vector3::new(pos.length, pos.width, pos.height + dims.height),
        }
    }

    /// True when a box of extents `self` placed at `pos` stays inside `bounds`.
    pub fn fits_in_at(&self, pos: Vector3, bounds: Vector3) -> bool {
        pos.length + self.length <= bounds.length
            && pos.width + self.width <= bounds.width
            && pos.height + self.height <= bounds.height
    }

    pub(crate) fn is_valid_extent(&self) -> bool {
        [self.length, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(dim: [f64; 3]) -> Self {
        Self::new(dim[0], dim[1], dim[2])
    }
}

impl std::fmt::Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// One of the six ways to assign base extents (L, W, H) to the spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rotation {
    #[default]
    LWH,
    WLH,
    WHL,
    HLW,
    HWL,
    LHW,
}

impl Rotation {
    /// Table order; also the order rotations are tried in.
    pub const ALL: [Rotation; 6] = [
        Rotation::LWH,
        Rotation::WLH,
        Rotation::WHL,
        Rotation::HLW,
        Rotation::HWL,
        Rotation::LHW,
    ];

    pub fn apply(self, base: Vector3) -> Vector3 {
        let Vector3 {
            length: l,
            width: w,
            height: h,
        } = base;
        match self {
            Rotation::LWH => Vector3::new(l, w, h),
            Rotation::WLH => Vector3::new(w, l, h),
            Rotation::WHL => Vector3::new(w, h, l),
            Rotation::HLW => Vector3::new(h, l, w),
            Rotation::HWL => Vector3::new(h, w, l),
            Rotation::LHW => Vector3::new(l, h, w),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rotation::LWH => "LWH",
            Rotation::WLH => "WLH",
            Rotation::WHL => "WHL",
            Rotation::HLW => "HLW",
            Rotation::HWL => "HWL",
            Rotation::LHW => "LHW",
        };
        f.write_str(s)
    }
}

/// Which face of an item may point up inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrientation {
    #[default]
    Auto,
    LengthWidthUp,
    LengthHeightUp,
    WidthHeightUp,
}

impl LabelOrientation {
    pub fn permitted_rotations(self) -> &'static [Rotation] {
        match self {
            LabelOrientation::Auto => &Rotation::ALL,
            LabelOrientation::LengthWidthUp => &[Rotation::LWH, Rotation::WLH],
            LabelOrientation::LengthHeightUp => &[Rotation::LHW, Rotation::HLW],
            LabelOrientation::WidthHeightUp => &[Rotation::WHL, Rotation::HWL],
        }
    }

    pub fn permits(self, rotation: Rotation) -> bool {
        self.permitted_rotations().contains(&rotation)
    }
}

impl std::str::FromStr for LabelOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(LabelOrientation::Auto),
            "length_width_up" => Ok(LabelOrientation::LengthWidthUp),
            "length_height_up" => Ok(LabelOrientation::LengthHeightUp),
            "width_height_up" => Ok(LabelOrientation::WidthHeightUp),
            _ => Err(format!(
                "invalid label orientation '{}', expected: auto, length_width_up, length_height_up, or width_height_up",
                s
            )),
        }
    }
}

/// Per-container admission policy. Only `Weight` enables weight checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingMode {
    #[default]
    Space,
    Weight,
    Quantity,
}

impl std::str::FromStr for PackingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space" => Ok(PackingMode::Space),
            "weight" => Ok(PackingMode::Weight),
            "quantity" => Ok(PackingMode::Quantity),
            _ => Err(format!(
                "invalid packing method '{}', expected: space, weight, or quantity",
                s
            )),
        }
    }
}
