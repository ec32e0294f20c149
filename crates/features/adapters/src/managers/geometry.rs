use super::Binding;
use crate::error::{AdapterError, AdapterErrorExt};
use hb_domain::Point3;

#[derive(Debug, Clone)]
pub struct GeometryManager {
    binding: Binding,
}

impl GeometryManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn location(&self, id: i64) -> Result<Point3, AdapterError> {
        let native = self.binding.native_id(id)?;
        let xyz = self.binding.host.location(native).context(format!("element {id}"))?;
        self.binding.strategy.uniform_point(xyz)
    }

    /// Translates an element and returns its new location. Requires an open transaction.
    pub fn move_by(&self, id: i64, delta: Point3) -> Result<Point3, AdapterError> {
        let current = self.location(id)?;
        let target = Point3::new(current.x + delta.x, current.y + delta.y, current.z + delta.z);
        let native = self.binding.native_id(id)?;
        let xyz = self.binding.strategy.native_point(target)?;
        self.binding.host.set_location(native, xyz).context(format!("element {id}"))?;
        Ok(target)
    }

    pub fn distance(&self, a: i64, b: i64) -> Result<f64, AdapterError> {
        let (p, q) = (self.location(a)?, self.location(b)?);
        Ok((p.x - q.x).hypot(p.y - q.y).hypot(p.z - q.z))
    }
}
