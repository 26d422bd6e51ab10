//! Trigger contacts between characters, jelloporters, monsters and obstacle
//! buttons.
//!
//! Contacts are reported on *enter* only: a pair that keeps overlapping is
//! reported once, and again only after it has separated. Pairs are tracked
//! regardless of whether the jelloporter currently responds, so a rider that
//! arrives overlapping its jelloporter is not re-triggered when the
//! jelloporter starts responding again.
//!
//! An obstacle button flips when a body or a kick reach starts touching it,
//! unless it is still cooling down from its previous flip.
use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashSet;

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::character::{Character, Facing};
use crate::components::jelloporter::Jelloporter;
use crate::components::mapposition::MapPosition;
use crate::components::monster::Monster;
use crate::components::obstacle::ObstacleButton;
use crate::events::signal::Signal;
use crate::resources::gameconfig::GameConfig;
use crate::resources::signalbus::SignalBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contact {
    /// Character body against a jelloporter, monster or button.
    Body(Entity, Entity),
    /// Kick reach of an attacking character against a monster or button.
    Reach(Entity, Entity),
}

/// Overlaps seen in the previous frame.
#[derive(Resource, Debug, Default)]
pub struct ContactPairs {
    pub active: FxHashSet<Contact>,
}

impl ContactPairs {
    pub fn is_touching(&self, contact: Contact) -> bool {
        self.active.contains(&contact)
    }
}

pub fn contact_system(
    mut pairs: ResMut<ContactPairs>,
    bus: NonSend<SignalBus>,
    config: Res<GameConfig>,
    characters: Query<(Entity, &Character, &MapPosition, &BoxCollider)>,
    mut jelloporters: Query<(Entity, &Jelloporter, &MapPosition, &BoxCollider, &mut Animator)>,
    monsters: Query<(Entity, &MapPosition, &BoxCollider), With<Monster>>,
    mut buttons: Query<
        (Entity, &mut ObstacleButton, &MapPosition, &BoxCollider, &mut Animator),
        Without<Jelloporter>,
    >,
) {
    let mut touching = FxHashSet::default();

    for (character_entity, character, position, collider) in characters.iter() {
        if !collider.enabled {
            continue;
        }

        for (jelloporter_entity, jelloporter, jp_position, jp_collider, mut animator) in
            jelloporters.iter_mut()
        {
            if !jp_collider.enabled || !collider.overlaps(position.pos, jp_collider, jp_position.pos) {
                continue;
            }
            let contact = Contact::Body(character_entity, jelloporter_entity);
            touching.insert(contact);
            if !pairs.is_touching(contact) && jelloporter.responds_to_collisions {
                debug!(
                    "character {:?} entered jelloporter {:?}",
                    character_entity, jelloporter_entity
                );
                animator.fire("GetEntered");
                bus.publish(Signal::PlayerHitJelloporter {
                    jelloporter: jelloporter_entity,
                    character: character_entity,
                });
            }
        }

        for (monster_entity, m_position, m_collider) in monsters.iter() {
            if !m_collider.enabled {
                continue;
            }
            let mut struck = false;
            if character.attacking
                && collider.reach_overlaps(
                    position.pos,
                    config.attack_reach,
                    character.facing == Facing::Right,
                    m_collider,
                    m_position.pos,
                )
            {
                let contact = Contact::Reach(character_entity, monster_entity);
                touching.insert(contact);
                struck = true;
                if !pairs.is_touching(contact) {
                    bus.publish(Signal::PlayerAttackedMonster {
                        character: character_entity,
                        monster: monster_entity,
                    });
                }
            }
            if collider.overlaps(position.pos, m_collider, m_position.pos) {
                let contact = Contact::Body(character_entity, monster_entity);
                touching.insert(contact);
                // A kick landing this frame wins over the body touch.
                if !struck && !pairs.is_touching(contact) {
                    bus.publish(Signal::MonsterAttackedPlayer {
                        character: character_entity,
                        monster: monster_entity,
                    });
                }
            }
        }

        for (button_entity, mut button, b_position, b_collider, mut animator) in buttons.iter_mut() {
            let mut entered = false;
            if collider.overlaps(position.pos, b_collider, b_position.pos) {
                let contact = Contact::Body(character_entity, button_entity);
                touching.insert(contact);
                entered |= !pairs.is_touching(contact);
            }
            if character.attacking
                && collider.reach_overlaps(
                    position.pos,
                    config.attack_reach,
                    character.facing == Facing::Right,
                    b_collider,
                    b_position.pos,
                )
            {
                let contact = Contact::Reach(character_entity, button_entity);
                touching.insert(contact);
                entered |= !pairs.is_touching(contact);
            }
            if entered && button.toggle(config.button_cooldown) {
                debug!(
                    "character {:?} toggled button {:?} to {}",
                    character_entity, button_entity, button.pressed
                );
                animator.fire(if button.pressed { "Pressed" } else { "Unpressed" });
                bus.publish(Signal::ObstacleButtonChanged {
                    button: button_entity,
                    pressed: button.pressed,
                });
            }
        }
    }

    pairs.active = touching;
}
