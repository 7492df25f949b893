//! Arena layout: obstacles, navigation graph, and the three agent groups.

use std::sync::Arc;

use anyhow::Result;

use sk_behavior::{
    ActiveAvoider, AgentAvoider, AgentSet, Cohesion, Falloff, GroupAlign, PathfindingFollower,
    PriorityWeightBlended, Separation, WallAvoider, Wander, WeightBlended,
};
use sk_core::{AgentId, GroupId, KinematicState, SimConfig, SimRng, Vec2};
use sk_formation::{Formation, Layout, Pattern, UsherHinge, UsherWaiter, WaitMode};
use sk_path::{AStar, GraphNavigator, TileGrid};
use sk_sense::{LayerMask, ObstacleSet};
use sk_sim::{Sim, SimBuilder};

const FLOCK_SIZE: usize = 12;
const CELL:       f32   = 40.0;
const COLUMNS:    u32   = 30;
const ROWS:       u32   = 20;

/// Region the flock is scattered over at start-up.
const FLOCK_AREA: (Vec2, Vec2) = (Vec2::new(100.0, 180.0), Vec2::new(300.0, 340.0));

/// Pillar in the middle of the arena, in grid cells.
const PILLAR: (u32, u32, u32, u32) = (13, 7, 16, 12);

pub struct Arena {
    pub sim:       Sim,
    pub courier:   AgentId,
    pub usher:     AgentId,
    pub formation: usize,
}

fn walls() -> Result<ObstacleSet> {
    let (w, h) = (COLUMNS as f32 * CELL, ROWS as f32 * CELL);
    let mut set = ObstacleSet::new();
    set.add_wall(Vec2::new(0.0, 0.0), Vec2::new(w, 0.0), LayerMask::ALL)?;
    set.add_wall(Vec2::new(w, 0.0), Vec2::new(w, h), LayerMask::ALL)?;
    set.add_wall(Vec2::new(w, h), Vec2::new(0.0, h), LayerMask::ALL)?;
    set.add_wall(Vec2::new(0.0, h), Vec2::new(0.0, 0.0), LayerMask::ALL)?;
    let (c0, r0, c1, r1) = PILLAR;
    set.add_rect(
        Vec2::new(c0 as f32 * CELL, r0 as f32 * CELL),
        Vec2::new(c1 as f32 * CELL, r1 as f32 * CELL),
        LayerMask::ALL,
    )?;
    Ok(set)
}

fn tiles() -> TileGrid {
    let mut grid = TileGrid::open(Vec2::ZERO, CELL, COLUMNS, ROWS).with_diagonal(true);
    let (c0, r0, c1, r1) = PILLAR;
    for col in c0..c1 {
        for row in r0..r1 {
            grid.block(col, row);
        }
    }
    grid
}

pub fn build(config: SimConfig) -> Result<Arena> {
    let obstacles = Arc::new(walls()?);
    let graph = Arc::new(tiles().to_nav_graph()?);
    let navigator = Arc::new(GraphNavigator::new(graph, AStar::default()).with_smoothing(obstacles.clone(), LayerMask::ALL));

    let mut scatter = SimRng::new(config.seed).child(1);
    let mut b = SimBuilder::new(config).oracles(obstacles.clone(), obstacles);

    // ── Flock ─────────────────────────────────────────────────────────────
    let flock: Vec<AgentId> = (0..FLOCK_SIZE).map(|i| AgentId(i as u32)).collect();
    for _ in 0..FLOCK_SIZE {
        let start = scatter.point_in(FLOCK_AREA.0, FLOCK_AREA.1);
        let heading: f32 = scatter.gen_range(-180.0..180.0);
        let state = KinematicState::at(start, heading).with_max_speed(70.0);
        let steering = PriorityWeightBlended::new()
            .with(WeightBlended::new().with(1.0, WallAvoider::new(LayerMask::ALL, 50.0)))
            .with(
                WeightBlended::new()
                    .with(2.0, Separation::new(AgentSet::List(flock.clone()), 35.0, Falloff::Linear))
                    .with(1.0, Cohesion::new(AgentSet::List(flock.clone()), 150.0))
                    .with(1.0, GroupAlign::new(AgentSet::List(flock.clone()), 150.0))
                    .with(0.5, Wander::default()),
            );
        b.add_agent(state, Box::new(steering));
    }

    // ── Courier ───────────────────────────────────────────────────────────
    let goal = Vec2::new(1_100.0, 400.0);
    let courier = b.add_agent(
        KinematicState::at(Vec2::new(60.0, 400.0), 0.0).with_max_speed(120.0),
        Box::new(ActiveAvoider::new(
            ActiveAvoider::new(
                PathfindingFollower::new(navigator, goal),
                AgentAvoider::new(AgentSet::All, 120.0),
                0.3,
            ),
            WallAvoider::new(LayerMask::ALL, 40.0),
            0.3,
        )),
    );

    // ── Formation ─────────────────────────────────────────────────────────
    let usher_steering = UsherWaiter::new(
        Box::new(UsherHinge::new(Vec2::new(1_000.0, 700.0)).with_hinge(10.0, 60.0)),
        GroupId(1),
        WaitMode::Stop,
    )
    .with_distances(80.0, 25.0);
    let usher = b.add_agent(KinematicState::at(Vec2::new(900.0, 120.0), 180.0).with_max_speed(60.0), Box::new(usher_steering));
    let formation = Formation::new(GroupId(1), usher, Layout::fixed(Pattern::Wedge { spacing: 40.0 }, 5))?
        .with_member_state(KinematicState::default().with_max_speed(110.0));
    let formation = b.add_formation(Box::new(formation));

    Ok(Arena { sim: b.build()?, courier, usher, formation })
}
