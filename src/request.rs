//! Packing request and response payloads.
//!
//! This is the boundary layer: it validates caller input, bakes wall thickness and
//! padding into the extents, builds the engine's specs, and turns the engine's bins
//! back into the output payload.

use serde::{Deserialize, Deserializer, Serialize};

use crate::container::{Bin, ContainerSpec};
use crate::engine::{PackResult, PackingConfig, PackingEngine};
use crate::error::{Error, Result};
use crate::item::{ItemSpec, OrientedBox};
use crate::types::{LabelOrientation, PackingMode, Rotation, Vector3};

/// Accepts any integral JSON number, including ones written as floats (e.g. `3.0`).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {}",
            value
        )));
    }
    Ok(value as u32)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub id: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
    pub dim: [f64; 3],
    /// Padding added twice to the height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oe_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_net_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_gross_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_net_weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInput {
    pub id: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
    pub dim: [f64; 3],
    /// Wall thickness subtracted twice on every axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub label_orientation: LabelOrientation,
    #[serde(default)]
    pub packing_method: PackingMode,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_net_weight: Option<f64>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_gross_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_box_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackRequest {
    pub items: Vec<ItemInput>,
    pub containers: Vec<ContainerInput>,
}

fn check_non_negative(what: &str, id: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::InvalidInput(format!(
            "{} of '{}' must be a non-negative number, got {}",
            what, id, v
        ))),
        _ => Ok(()),
    }
}

fn check_extent(kind: &str, id: &str, dim: Vector3) -> Result<()> {
    let ok = [dim.length, dim.width, dim.height]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0);
    if !ok {
        return Err(Error::InvalidInput(format!(
            "{} '{}' must have positive dimensions, got {}",
            kind, id, dim
        )));
    }
    Ok(())
}

impl ItemInput {
    /// Base extents with padding baked in.
    pub fn effective_dim(&self) -> Vector3 {
        let [l, w, h] = self.dim;
        match self.thickness {
            Some(t) if t > 0.0 => Vector3::new(l, w, h + t * 2.0),
            _ => Vector3::new(l, w, h),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInput("item id must not be empty".to_string()));
        }
        check_non_negative("thickness", &self.id, self.thickness)?;
        check_non_negative("product net weight", &self.id, self.product_net_weight)?;
        check_non_negative("product gross weight", &self.id, self.product_gross_weight)?;
        check_non_negative("box net weight", &self.id, self.box_net_weight)?;
        check_extent("item", &self.id, self.effective_dim())
    }

    fn to_spec(&self) -> ItemSpec {
        let template = OrientedBox::new(self.id.clone(), self.effective_dim()).with_weights(
            self.product_net_weight.unwrap_or(0.0),
            self.product_gross_weight.unwrap_or(0.0),
            self.box_net_weight.unwrap_or(0.0),
        );
        ItemSpec::new(template, self.qty)
    }
}

impl ContainerInput {
    /// Interior extents after subtracting the walls.
    pub fn usable_dim(&self) -> Vector3 {
        let [l, w, h] = self.dim;
        match self.thickness {
            Some(t) if t > 0.0 => Vector3::new(l - t * 2.0, w - t * 2.0, h - t * 2.0),
            _ => Vector3::new(l, w, h),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInput("container id must not be empty".to_string()));
        }
        check_non_negative("thickness", &self.id, self.thickness)?;
        check_non_negative("max weight", &self.id, self.max_weight)?;
        check_non_negative("container net weight", &self.id, self.container_net_weight)?;
        check_non_negative("container gross weight", &self.id, self.container_gross_weight)?;
        check_extent("container", &self.id, self.usable_dim())
    }

    fn to_spec(&self) -> ContainerSpec {
        let template = Bin::new(self.id.clone(), self.usable_dim())
            .with_orientation(self.label_orientation)
            .with_weight_limit(
                self.packing_method,
                self.max_weight.unwrap_or(0.0),
                self.container_net_weight.unwrap_or(0.0),
            );
        ContainerSpec::new(template, self.qty)
    }
}

impl PackRequest {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|i| i.qty as u64).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for item in &self.items {
            item.validate()?;
        }
        for container in &self.containers {
            container.validate()?;
        }
        Ok(())
    }

    /// Validates the request and builds an engine that owns copies of its specs.
    pub fn to_engine(&self, config: PackingConfig) -> Result<PackingEngine> {
        self.validate()?;
        let items = self.items.iter().map(ItemInput::to_spec).collect();
        let containers = self.containers.iter().map(ContainerInput::to_spec).collect();
        Ok(PackingEngine::new(items, containers).with_config(config))
    }

    /// Validates, packs and marshals the result.
    pub fn pack(&self, config: PackingConfig) -> Result<PackOutput> {
        let result = self.to_engine(config)?.pack();
        Ok(PackOutput::from_result(self, &result))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutput {
    pub id: String,
    pub dim: Vector3,
    pub pos: Vector3,
    pub rot: Rotation,
    pub oe_number: String,
    pub product_net_weight: f64,
    pub product_gross_weight: f64,
    pub box_net_weight: f64,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOutput {
    pub id: String,
    pub dim: Vector3,
    pub items: Vec<ItemOutput>,
    pub order_box_number: String,
    pub container_net_weight: f64,
    pub container_gross_weight: f64,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackOutput {
    pub containers: Vec<ContainerOutput>,
    pub unpacked_items: Vec<ItemOutput>,
}

impl PackOutput {
    /// Passthrough fields come from the first input entry sharing the id.
    pub fn from_result(request: &PackRequest, result: &PackResult) -> Self {
        let item_output = |item: &OrientedBox| {
            let input = request.items.iter().find(|i| i.id == item.id);
            ItemOutput {
                id: item.id.clone(),
                dim: item.base_dim(),
                pos: item.position(),
                rot: item.rotation(),
                oe_number: input.and_then(|i| i.oe_number.clone()).unwrap_or_default(),
                product_net_weight: item.product_net_weight,
                product_gross_weight: item.product_gross_weight,
                box_net_weight: item.box_net_weight,
                qty: input.map(|i| i.qty).unwrap_or(0),
            }
        };

        let containers = result
            .bins
            .iter()
            .map(|bin| {
                let input = request.containers.iter().find(|c| c.id == bin.id);
                ContainerOutput {
                    id: bin.id.clone(),
                    dim: bin.usable_dim(),
                    items: bin.items.iter().map(item_output).collect(),
                    order_box_number: input
                        .and_then(|c| c.order_box_number.clone())
                        .unwrap_or_default(),
                    container_net_weight: bin.net_weight,
                    container_gross_weight: input
                        .and_then(|c| c.container_gross_weight)
                        .unwrap_or(0.0),
                    utilization: bin.utilization(),
                }
            })
            .collect();

        Self {
            containers,
            unpacked_items: result.unpacked.iter().map(item_output).collect(),
        }
    }

    pub fn packed_count(&self) -> usize {
        self.containers.iter().map(|c| c.items.len()).sum()
    }
}
