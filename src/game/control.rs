//! Control and AI systems
//!
//! Control turns an entity's command bitmask into Force and Torque. The
//! commands come from the entity's input channel (keyboard) or from its AI
//! component. AI only runs every `AI_INTERVAL` ticks.

use super::components::{AiState, ControlType, ACCELERATION, ANGULAR_ACCELERATION, RUN_SPEED, WALK_SPEED};
use super::collision::Directions;
use super::entity::Shape;
use super::input::{Commands, InputChannels};
use super::store::EntityStore;
use crate::world::{Board, TileFlags};

/// Ticks between AI decisions
pub const AI_INTERVAL: u32 = 31;

/// Update AI state machines.
///
/// Idle entities standing in the dark start patrolling leftwards.
/// Patrolling entities flash and turn around when blocked horizontally.
pub fn apply_ai(store: &mut EntityStore, board: &Board) {
    for i in 0..store.count {
        let shape = store.shapes[i];
        if !shape.has_all(Shape::AI | Shape::CONTROL) {
            continue;
        }
        if !store.controls[i].kind.has(ControlType::DIRECTIONAL) {
            continue;
        }

        match store.ais[i].state {
            AiState::Idle => {
                if !shape.has(Shape::POSITION) {
                    continue;
                }
                let pos = store.positions[i];
                if !board.has_flag_at_pos(pos.x, pos.y, TileFlags::LIT) {
                    store.ais[i].state = AiState::Patrol;
                    store.ais[i].commands |= Commands::MOVE_LEFT;
                }
            }
            AiState::Patrol => {
                if shape.has(Shape::VISIBLE) {
                    let color = &mut store.visibles[i].color;
                    color.r = color.r.wrapping_add(128);
                }
                if shape.has(Shape::COLLIDABLE) && store.collidables[i].collision.has(Directions::HORIZONTAL) {
                    store.ais[i].commands ^= Commands::MOVE_LEFT | Commands::MOVE_RIGHT;
                }
            }
        }
    }
}

/// Copy each controlled entity's commands and act on them
pub fn apply_control(store: &mut EntityStore, input: &InputChannels) {
    for i in 0..store.count {
        if !store.shapes[i].has(Shape::CONTROL) {
            continue;
        }

        let has_ai = store.shapes[i].has(Shape::AI);
        let control = &mut store.controls[i];
        if control.kind.has(ControlType::AI) {
            if has_ai {
                control.commands = store.ais[i].commands;
            }
        } else if control.kind.has(ControlType::KEYBOARD) {
            control.commands = input.get(control.input_channel);
        }

        control_entity(store, i);
    }
}

fn control_entity(store: &mut EntityStore, i: usize) {
    let shape = store.shapes[i];
    let commands = store.controls[i].commands;

    if shape.has(Shape::FORCE) {
        let force = &mut store.forces[i];
        force.x = if commands.either(Commands::MOVE_LEFT, Commands::MOVE_RIGHT) {
            if commands.has(Commands::MOVE_LEFT) { -ACCELERATION } else { ACCELERATION }
        } else {
            0.0
        };
        force.y = if commands.either(Commands::MOVE_UP, Commands::MOVE_DOWN) {
            if commands.has(Commands::MOVE_UP) { -ACCELERATION } else { ACCELERATION }
        } else {
            0.0
        };
    }

    if shape.has(Shape::TORQUE) {
        let torque = &mut store.torques[i];
        if commands.either(Commands::TURN_LEFT, Commands::TURN_RIGHT) {
            let step = if commands.has(Commands::TURN_LEFT) { ANGULAR_ACCELERATION } else { -ANGULAR_ACCELERATION };
            torque.ang_vel = (torque.ang_vel + step).clamp(-torque.max_ang_vel, torque.max_ang_vel);
        } else if torque.ang_vel >= ANGULAR_ACCELERATION {
            torque.ang_vel -= ANGULAR_ACCELERATION;
        } else if torque.ang_vel <= -ANGULAR_ACCELERATION {
            torque.ang_vel += ANGULAR_ACCELERATION;
        } else {
            torque.ang_vel = 0.0;
        }
    }

    if shape.has(Shape::VELOCITY) {
        let speed = if commands.has(Commands::MOVE_RUN) { RUN_SPEED } else { WALK_SPEED };
        store.velocities[i].max_vel_squared = speed * speed;
    }

    store.controls[i].commands.remove(Commands::MOVE_MASK);
}
