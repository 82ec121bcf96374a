use crate::components::{Direction, Player};
use crate::ecs::{Frame, Query, System, View, World};
use crate::game_loop::FrameContext;
use crate::platform::InputState;
use glam::Vec2;

/// Points the direction of every [`Player`] along the held directional input. Left wins over
/// right and up wins over down; y grows downwards.
pub struct PlayerControlSystem {
    players: View,
}

impl PlayerControlSystem {
    pub fn new(world: &mut World) -> Self {
        Self {
            players: world.archetype::<(Player, Direction)>(),
        }
    }
}

fn heading(input: InputState) -> Vec2 {
    let axis = |negative: bool, positive: bool| {
        if negative {
            -1.0
        } else if positive {
            1.0
        } else {
            0.0
        }
    };

    Vec2::new(axis(input.left, input.right), axis(input.up, input.down))
}

impl System<FrameContext> for PlayerControlSystem {
    fn name(&self) -> &'static str {
        "player_control"
    }

    fn update(&mut self, world: &mut World, frame: &mut Frame<'_, FrameContext>) {
        let target = heading(frame.context.input);

        for (_, direction) in world.storage.query_one_mut::<Direction>(&self.players) {
            direction.0 = target;
        }
    }
}
