use std::sync::Arc;

use glam::Vec4;

use crate::component::RenderStyle;

/// Shading description referenced by mesh instances.
///
/// Only what the binding layer needs to tell materials apart; the renderer
/// owns the actual shading parameters.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub color: Vec4,
    /// Preferred style when the instance does not override it.
    pub render_style: Option<RenderStyle>,
}

impl Material {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Vec4::ONE,
            render_style: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}

/// Shared handle to a [`Material`]. Equality is identity.
#[derive(Debug, Clone)]
pub struct MaterialHandle(Arc<Material>);

impl MaterialHandle {
    #[must_use]
    pub fn new(material: Material) -> Self {
        Self(Arc::new(material))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl PartialEq for MaterialHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MaterialHandle {}

impl std::ops::Deref for MaterialHandle {
    type Target = Material;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Material> for MaterialHandle {
    fn from(material: Material) -> Self {
        Self::new(material)
    }
}

/// Picks the material for a freshly generated primitive.
///
/// The component's own material wins unless it is unset or the engine default;
/// then slot 0's loaded asset material; then the engine default.
#[must_use]
pub fn resolve_primitive_material(
    component: Option<&MaterialHandle>,
    slot_zero: Option<&MaterialHandle>,
    engine_default: &MaterialHandle,
) -> MaterialHandle {
    component
        .filter(|m| *m != engine_default)
        .or(slot_zero)
        .unwrap_or(engine_default)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality_is_identity() {
        let a = MaterialHandle::new(Material::new("Same"));
        let b = MaterialHandle::new(Material::new("Same"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_primitive_material_precedence() {
        let default = MaterialHandle::new(Material::new("Default"));
        let custom = MaterialHandle::new(Material::new("Custom"));
        let slot = MaterialHandle::new(Material::new("Slot0"));

        assert_eq!(resolve_primitive_material(Some(&custom), Some(&slot), &default), custom);
        assert_eq!(resolve_primitive_material(Some(&default), Some(&slot), &default), slot);
        assert_eq!(resolve_primitive_material(None, Some(&slot), &default), slot);
        assert_eq!(resolve_primitive_material(Some(&default), None, &default), default);
        assert_eq!(resolve_primitive_material(None, None, &default), default);
    }
}
