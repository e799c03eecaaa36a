//! Sandbox edits (walls, agent and goal placement, random mazes) and the
//! view refreshed for the presentation layer after every change.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::events::GridEdit;
use crate::plugins::LabSet;
use crate::resources::{Lab, LabRng, LabView};

pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_grid_edits.in_set(LabSet::Edit));
        app.add_systems(PostUpdate, refresh_view.run_if(resource_changed::<Lab>));
    }
}

#[span_fn]
fn apply_grid_edits(
    mut edits: MessageReader<GridEdit>,
    mut lab: ResMut<Lab>,
    mut rng: ResMut<LabRng>,
) {
    for edit in edits.read() {
        let applied = match *edit {
            GridEdit::Wall(p) => lab.place_wall(p),
            GridEdit::Erase(p) => lab.erase(p),
            GridEdit::PlaceAgent(p) => lab.place_agent(p),
            GridEdit::PlaceGoal(p) => lab.place_goal(p),
            GridEdit::Randomize(density) => {
                lab.randomize(density, &mut rng.rng);
                info!(
                    "randomized grid at density {:.2}: {} walls",
                    density,
                    lab.grid.wall_count()
                );
                true
            }
            GridEdit::ClearAll => {
                lab.clear_walls();
                true
            }
        };
        if !applied {
            debug!("edit {:?} ignored", edit);
        }
    }
}

fn refresh_view(lab: Res<Lab>, mut view: ResMut<LabView>) {
    *view = lab.view();
}
