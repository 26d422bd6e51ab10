use bevy_ecs::prelude::Component;

/// Marker for static level geometry; bodies are pushed out of solids by the
/// movement system. The shape comes from the entity's
/// [`BoxCollider`](super::boxcollider::BoxCollider).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Solid;
