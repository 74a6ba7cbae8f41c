use super::*;

/// 3D vector.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Vector {
        Vector {
            x,
            y,
            z
        }
    }

    pub fn zero() -> Vector {
        Vector::new(0., 0., 0.)
    }

    /// Unit vector from an azimuthal angle in the x-y plane and a polar angle from the z-axis.
    pub fn from_angles(azimuth: f64, polar: f64) -> Vector {
        Vector::new(
            azimuth.cos()*polar.sin(),
            azimuth.sin()*polar.sin(),
            polar.cos()
        )
    }

    /// Calculates vector magnitude.
    pub fn magnitude(&self) -> f64 {
        (self.x*self.x + self.y*self.y + self.z*self.z).sqrt()
    }

    /// Normalizes vector components to magnitude 1.
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();
        self.x /= magnitude;
        self.y /= magnitude;
        self.z /= magnitude;
    }

    /// Add this vector and another and return a new vector.
    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(&self, factor: f64) -> Vector {
        Vector::new(self.x*factor, self.y*factor, self.z*factor)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x*other.x + self.y*other.y + self.z*other.z
    }

    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y*other.z - self.z*other.y,
            self.z*other.x - self.x*other.z,
            self.x*other.y - self.y*other.x
        )
    }

    /// Azimuthal angle of the vector in the x-y plane.
    pub fn azimuth(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Polar angle of the vector measured from the z-axis.
    pub fn polar(&self) -> f64 {
        (self.x*self.x + self.y*self.y).sqrt().atan2(self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() & self.y.is_finite() & self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vector {
    fn from(components: [f64; 3]) -> Vector {
        Vector::new(components[0], components[1], components[2])
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
