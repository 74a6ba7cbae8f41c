use super::*;

/// Constant electric (V/m) and magnetic (T) fields over the tracking volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldModel {
    pub efield: Vector,
    pub bfield: Vector,
}

impl FieldModel {
    pub fn new(efield: Vector, bfield: Vector) -> McoptResult<FieldModel> {
        if !efield.is_finite() {
            return Err(McoptError::InvalidParameter(format!("electric field {} must be finite", efield)));
        }
        if !bfield.is_finite() {
            return Err(McoptError::InvalidParameter(format!("magnetic field {} must be finite", bfield)));
        }
        Ok(FieldModel {
            efield,
            bfield,
        })
    }
}

/// Cylindrical detector volume along the z-axis.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ChamberVolume {
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_z_min")]
    pub z_min: f64,
    #[serde(default = "default_z_max")]
    pub z_max: f64,
}

fn default_radius() -> f64 {
    CHAMBER_RADIUS
}

fn default_z_min() -> f64 {
    0.
}

fn default_z_max() -> f64 {
    CHAMBER_LENGTH
}

impl Default for ChamberVolume {
    fn default() -> ChamberVolume {
        ChamberVolume {
            radius: CHAMBER_RADIUS,
            z_min: 0.,
            z_max: CHAMBER_LENGTH,
        }
    }
}

impl ChamberVolume {
    pub fn inside(&self, pos: &Vector) -> bool {
        (pos.z >= self.z_min) & (pos.z <= self.z_max) & ((pos.x*pos.x + pos.y*pos.y).sqrt() <= self.radius)
    }

    pub fn validate(&self) -> McoptResult<()> {
        if !(self.radius > 0.) | !(self.z_max > self.z_min) | !self.radius.is_finite() {
            return Err(McoptError::InvalidParameter(format!(
                "chamber volume must have positive radius and z_max > z_min, got r = {} z = [{}, {}]",
                self.radius, self.z_min, self.z_max)));
        }
        Ok(())
    }
}
