use glam::Mat4;
use std::sync::Arc;
use uuid::Uuid;

/// Skeleton definition carried by skinned geometry.
///
/// Bones are identified by name and bound to concrete nodes only when a
/// [`SkinInstance`](crate::skinning::SkinInstance) is resolved against a root bone.
#[derive(Debug, Clone)]
pub struct Skin {
    pub id: Uuid,
    pub name: String,

    // bone_names[i] corresponds to joints[i] in shader
    pub bone_names: Vec<String>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

impl Skin {
    #[must_use]
    pub fn new(name: &str, bone_names: Vec<String>, inverse_bind_matrices: Vec<Mat4>) -> Self {
        debug_assert_eq!(
            bone_names.len(),
            inverse_bind_matrices.len(),
            "every bone needs an inverse bind matrix"
        );
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bone_names,
            inverse_bind_matrices,
        }
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }
}

#[derive(Debug, Clone)]
pub struct MorphTarget {
    pub name: String,
    pub default_weight: f32,
}

/// Morph target set carried by blend-shape geometry.
#[derive(Debug, Clone)]
pub struct Morph {
    pub id: Uuid,
    pub targets: Vec<MorphTarget>,
}

impl Morph {
    #[must_use]
    pub fn new(targets: Vec<MorphTarget>) -> Self {
        Self {
            id: Uuid::new_v4(),
            targets,
        }
    }
}

/// Per mesh instance morph weights. Never shared.
#[derive(Debug, Clone)]
pub struct MorphInstance {
    morph: Arc<Morph>,
    weights: Vec<f32>,
}

impl MorphInstance {
    #[must_use]
    pub fn new(morph: Arc<Morph>) -> Self {
        let weights = morph.targets.iter().map(|t| t.default_weight).collect();
        Self { morph, weights }
    }

    #[must_use]
    pub fn morph(&self) -> &Arc<Morph> {
        &self.morph
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn weight(&self, index: usize) -> Option<f32> {
        self.weights.get(index).copied()
    }

    pub fn set_weight(&mut self, index: usize, weight: f32) {
        if let Some(w) = self.weights.get_mut(index) {
            *w = weight;
        }
    }

    /// Sets a weight by target name; unknown names are ignored.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) {
        if let Some(index) = self.morph.targets.iter().position(|t| t.name == name) {
            self.weights[index] = weight;
        }
    }
}
