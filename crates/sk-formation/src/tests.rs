//! Unit tests for sk-formation.

#[cfg(test)]
mod helpers {
    use sk_behavior::{MarkerBoard, SteeringArgs, SteeringContext};
    use sk_core::{AgentId, KinematicState, Tick, Vec2};
    use sk_sense::{AgentIndex, ObstacleSet};

    use crate::{FormationResult, SpawnRequest, Spawner};

    pub const DT: f32 = 1.0 / 60.0;

    /// Hands out ids after the pre-existing agents and records every call.
    pub struct RecordingSpawner {
        pub next: u32,
        pub requests: Vec<SpawnRequest>,
        pub despawned: Vec<AgentId>,
    }

    impl RecordingSpawner {
        pub fn starting_at(next: u32) -> Self {
            Self { next, requests: Vec::new(), despawned: Vec::new() }
        }
    }

    impl Spawner for RecordingSpawner {
        fn spawn(&mut self, request: SpawnRequest) -> FormationResult<AgentId> {
            let id = AgentId(self.next);
            self.next += 1;
            self.requests.push(request);
            Ok(id)
        }

        fn despawn(&mut self, agent: AgentId) {
            self.despawned.push(agent);
        }
    }

    pub struct World {
        pub states: Vec<KinematicState>,
        pub index: AgentIndex,
        pub markers: MarkerBoard,
        pub obstacles: ObstacleSet,
    }

    impl World {
        pub fn new(states: Vec<KinematicState>) -> Self {
            let index = AgentIndex::build(&states, &[]);
            Self { states, index, markers: MarkerBoard::new(), obstacles: ObstacleSet::new() }
        }

        pub fn ctx(&self) -> SteeringContext<'_> {
            SteeringContext::new(
                Tick(0),
                DT,
                &self.states,
                &[],
                &self.index,
                &self.markers,
                &self.obstacles,
                &self.obstacles,
            )
        }

        pub fn args(&self, id: u32) -> SteeringArgs {
            SteeringArgs::new(AgentId(id), &self.states[id as usize], DT)
        }

        pub fn reindex(&mut self) {
            self.index = AgentIndex::build(&self.states, &[]);
        }
    }

    pub fn usher_at(x: f32, y: f32, orientation: f32) -> KinematicState {
        KinematicState::at(Vec2::new(x, y), orientation)
    }

    pub fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }
}

// ── Patterns ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod patterns {
    use sk_core::Vec2;

    use super::helpers::close;
    use crate::{FormationError, Pattern};

    #[test]
    fn line_is_centered() {
        let offsets = Pattern::Line { spacing: 10.0 }.offsets(3).unwrap();
        assert_eq!(offsets, vec![Vec2::new(0.0, 10.0), Vec2::ZERO, Vec2::new(0.0, -10.0)]);
    }

    #[test]
    fn column_extends_backward() {
        let offsets = Pattern::Column { spacing: 15.0 }.offsets(3).unwrap();
        assert_eq!(offsets, vec![Vec2::ZERO, Vec2::new(-15.0, 0.0), Vec2::new(-30.0, 0.0)]);
    }

    #[test]
    fn wedge_alternates_sides() {
        let offsets = Pattern::Wedge { spacing: 10.0 }.offsets(5).unwrap();
        assert_eq!(offsets[0], Vec2::ZERO);
        assert_eq!(offsets[1], Vec2::new(-10.0, 10.0));
        assert_eq!(offsets[2], Vec2::new(-10.0, -10.0));
        assert_eq!(offsets[3], Vec2::new(-20.0, 20.0));
        assert_eq!(offsets[4], Vec2::new(-20.0, -20.0));
    }

    #[test]
    fn grid_centers_partial_row() {
        let offsets = Pattern::Grid { columns: 3, spacing: Vec2::new(20.0, 10.0) }.offsets(5).unwrap();
        // Two rows, front row of three, back row of two.
        assert!(close(offsets[0], Vec2::new(10.0, 10.0)));
        assert!(close(offsets[2], Vec2::new(10.0, -10.0)));
        assert!(close(offsets[3], Vec2::new(-10.0, 5.0)));
        assert!(close(offsets[4], Vec2::new(-10.0, -5.0)));
    }

    #[test]
    fn circle_starts_ahead() {
        let offsets = Pattern::Circle { radius: 50.0 }.offsets(4).unwrap();
        assert!(close(offsets[0], Vec2::new(50.0, 0.0)));
        assert!(close(offsets[1], Vec2::new(0.0, 50.0)));
        assert!(close(offsets[2], Vec2::new(-50.0, 0.0)));
    }

    #[test]
    fn explicit_offsets_must_cover_members() {
        let pattern = Pattern::Offsets(vec![Vec2::ZERO, Vec2::X]);
        assert_eq!(pattern.offsets(1).unwrap(), vec![Vec2::ZERO]);
        assert!(matches!(pattern.offsets(3), Err(FormationError::InvalidLayout(_))));
    }

    #[test]
    fn degenerate_spacing_rejected() {
        assert!(Pattern::Line { spacing: 0.0 }.offsets(2).is_err());
        assert!(Pattern::Grid { columns: 0, spacing: Vec2::ONE }.offsets(2).is_err());
        assert!(Pattern::Circle { radius: f32::NAN }.offsets(2).is_err());
    }
}

// ── Scalable grids ────────────────────────────────────────────────────────────

#[cfg(test)]
mod scalable {
    use sk_core::Vec2;

    use crate::{ScalableLayout, ScalableMode};

    fn twelve_in_600_by_300() -> ScalableLayout {
        ScalableLayout::new(ScalableMode::FitQuantity { quantity: 12, dimensions: Vec2::new(600.0, 300.0) })
    }

    #[test]
    fn quantity_and_dimensions_give_grid() {
        let grid = twelve_in_600_by_300().solve().unwrap();
        assert_eq!(grid.quantity, 12);
        assert_eq!(grid.columns, 5);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.spacing, Vec2::new(120.0, 100.0));
        assert!((grid.density - 12.0 / 180_000.0).abs() < 1e-9);
    }

    #[test]
    fn density_round_trips() {
        let density = twelve_in_600_by_300().solve().unwrap().density;

        let by_density = ScalableLayout::new(ScalableMode::FitDensity { density, quantity: 12, aspect: 2.0 })
            .solve()
            .unwrap();
        assert!((by_density.dimensions.x - 600.0).abs() < 0.05);
        assert!((by_density.dimensions.y - 300.0).abs() < 0.05);
        assert_eq!(by_density.columns, 5);

        let by_area = ScalableLayout::new(ScalableMode::FillArea { density, dimensions: Vec2::new(600.0, 300.0) })
            .solve()
            .unwrap();
        assert_eq!(by_area.quantity, 12);
    }

    #[test]
    fn quantity_reduced_to_fit_spacing() {
        let grid = twelve_in_600_by_300().with_min_spacing(110.0).solve().unwrap();
        assert_eq!(grid.quantity, 8);
        assert_eq!(grid.columns, 4);
        assert_eq!(grid.rows, 2);
        assert!(grid.spacing.min_element() >= 110.0);
    }

    #[test]
    fn nothing_fits() {
        let layout = twelve_in_600_by_300().with_min_spacing(1000.0);
        assert!(layout.solve().is_err());

        let crowded = ScalableLayout::new(ScalableMode::FitDensity { density: 1.0, quantity: 10, aspect: 1.0 })
            .with_min_spacing(5.0);
        assert!(crowded.solve().is_err());
    }

    #[test]
    fn offsets_fill_the_rectangle() {
        let grid = twelve_in_600_by_300().solve().unwrap();
        let offsets = grid.offsets();
        assert_eq!(offsets.len(), 12);
        // Front row sits half a row in from the front edge.
        assert!((offsets[0].x - 100.0).abs() < 1e-3);
        assert!((offsets[0].y - 240.0).abs() < 1e-3);
        for o in &offsets {
            assert!(o.x.abs() <= 150.0 && o.y.abs() <= 300.0);
        }
        // Last row holds two members, centered.
        assert!((offsets[10].y + offsets[11].y).abs() < 1e-3);
    }
}

// ── Frames ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod frames {
    use sk_core::Vec2;

    use super::helpers::close;
    use crate::{PivotFrame, Transform2};

    #[test]
    fn relative_then_compose_is_identity() {
        let parent = Transform2::new(Vec2::new(10.0, -5.0), 30.0);
        let child = Transform2::new(Vec2::new(-3.0, 7.0), -100.0);
        let back = parent.compose(&child.relative_to(&parent));
        assert!(close(back.position, child.position));
        assert!((back.orientation - child.orientation).abs() < 1e-3);
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Transform2::new(Vec2::new(4.0, 2.0), 90.0);
        let p = Vec2::new(1.0, 0.0);
        assert!(close(t.transform_point(p), Vec2::new(4.0, 3.0)));
        assert!(close(t.inverse().transform_point(t.transform_point(p)), p));
    }

    #[test]
    fn child_wheels_around_pivot() {
        let hinge = Transform2::new(Vec2::new(0.0, 50.0), 0.0);
        let mut frame = PivotFrame::attach(hinge, Transform2::IDENTITY);
        frame.rotate_parent(90.0);
        let world = frame.detach();
        assert!(close(world.position, Vec2::new(50.0, 50.0)));
        assert!((world.orientation - 90.0).abs() < 1e-3);
    }
}

// ── Formation sync and publish ────────────────────────────────────────────────

#[cfg(test)]
mod formation {
    use sk_core::{AgentId, GroupId, Vec2};
    use sk_sense::LayerMask;

    use super::helpers::*;
    use crate::{
        Choreography, Formation, FormationError, FormationEvent, FormationWorld, Layout, Pattern,
    };

    fn line_of(n: usize) -> Layout {
        Layout::fixed(Pattern::Line { spacing: 20.0 }, n)
    }

    #[test]
    fn sync_spawns_one_member_per_slot() {
        let mut world = World::new(vec![usher_at(100.0, 0.0, 90.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(3)).unwrap();

        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();

        assert_eq!(formation.members(), vec![AgentId(1), AgentId(2), AgentId(3)]);
        assert_eq!(spawner.requests.len(), 3);
        // Facing +Y, so the usher's left is -X.
        let first = spawner.requests[0].state.position;
        assert!(close(first, Vec2::new(80.0, 0.0)));
        assert_eq!(spawner.requests[0].state.orientation, 90.0);

        let roster = world.markers.roster(GroupId(1));
        assert_eq!(roster.len(), 3);
        let marker = world.markers.get(roster[2].marker).unwrap();
        assert!(close(marker.position, Vec2::new(120.0, 0.0)));
        assert_eq!(roster[2].member, Some(AgentId(3)));
        assert!(!formation.is_dirty());
    }

    #[test]
    fn layout_change_resyncs_members() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(3)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        formation.drain_events();

        formation.set_layout(line_of(5)).unwrap();
        assert!(formation.is_dirty());
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        assert_eq!(formation.member_count(), 5);
        let events = formation.drain_events();
        assert_eq!(events[0], FormationEvent::DimensionsChanged { group: GroupId(1), slots: 5 });
        assert_eq!(events.iter().filter(|e| matches!(e, FormationEvent::MemberSpawned { .. })).count(), 2);

        formation.set_layout(line_of(2)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        assert_eq!(formation.members(), vec![AgentId(1), AgentId(2)]);
        assert_eq!(spawner.despawned, vec![AgentId(5), AgentId(4), AgentId(3)]);
        assert_eq!(world.markers.roster(GroupId(1)).len(), 2);
    }

    #[test]
    fn blocked_spot_fails_before_spawning() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        world.obstacles.add_disc(Vec2::new(0.0, -20.0), 5.0, LayerMask::ALL).unwrap();
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(3)).unwrap();

        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        let err = formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap_err();

        assert!(matches!(err, FormationError::SlotBlocked { slot: 2, .. }));
        assert!(spawner.requests.is_empty());
        assert!(world.markers.is_empty());
        assert!(formation.is_dirty());
    }

    #[test]
    fn missing_usher_is_an_error() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(2)).unwrap();
        let fw = FormationWorld::new(&world.states, &[false], &world.obstacles);
        let err = formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap_err();
        assert!(matches!(err, FormationError::MissingUsher));
    }

    #[test]
    fn publish_follows_usher() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(3)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }

        world.states[0].position = Vec2::new(50.0, 50.0);
        world.states[0].orientation = 180.0;
        world.states[0].velocity = Vec2::new(-10.0, 0.0);
        world.states[0].angular_velocity = 90.0;
        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        formation.publish(&fw, &mut world.markers);

        let left = world.markers.get(formation.slot_marker(0).unwrap()).unwrap();
        // Facing -X, the usher's left is -Y.
        assert!(close(left.position, Vec2::new(50.0, 30.0)));
        assert_eq!(left.orientation, Some(180.0));
        // Usher velocity plus the slot's swing around the usher.
        let swing = Vec2::new(20.0, 0.0) * 90f32.to_radians();
        assert!(close(left.velocity, Vec2::new(-10.0, 0.0) + swing));
    }

    #[test]
    fn obstructed_slots_are_flagged() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(3)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        formation.drain_events();

        world.obstacles.add_disc(Vec2::new(0.0, 20.0), 4.0, LayerMask::ALL).unwrap();
        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        formation.publish(&fw, &mut world.markers);

        assert!(formation.is_obstructed(0));
        assert!(world.markers.roster(GroupId(1))[0].obstructed);
        assert_eq!(formation.drain_events(), vec![FormationEvent::SlotObstructed { group: GroupId(1), slot: 0 }]);
    }

    #[test]
    fn dissolve_releases_everything() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let mut formation = Formation::new(GroupId(1), AgentId(0), line_of(2)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            formation.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        formation.dissolve(&mut world.markers, &mut spawner);
        assert_eq!(spawner.despawned.len(), 2);
        assert!(world.markers.is_empty());
        assert!(world.markers.roster(GroupId(1)).is_empty());
    }
}

// ── Two-level formations ──────────────────────────────────────────────────────

#[cfg(test)]
mod two_level {
    use sk_core::{AgentId, GroupId, Vec2};

    use super::helpers::*;
    use crate::{Choreography, Formation, FormationError, FormationWorld, Layout, Pattern, TwoLevelFormation};

    #[test]
    fn squads_spawn_around_their_ushers() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let top = Formation::new(GroupId(1), AgentId(0), Layout::fixed(Pattern::Line { spacing: 100.0 }, 2)).unwrap();
        let squad = Layout::fixed(Pattern::Column { spacing: 10.0 }, 3);
        let mut two = TwoLevelFormation::new(top, squad, 10).unwrap();

        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        two.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();

        assert_eq!(spawner.requests.len(), 2 + 2 * 3);
        assert_eq!(two.squads().len(), 2);
        assert_eq!(two.squad_usher(0), Some(AgentId(1)));
        assert_eq!(two.squads()[1].group(), GroupId(11));

        // Squad 0's usher spawns at the top-level left slot; its column
        // stretches back from there.
        let roster = world.markers.roster(GroupId(10));
        assert_eq!(roster.len(), 3);
        let last = world.markers.get(roster[2].marker).unwrap();
        assert!(close(last.position, Vec2::new(-20.0, 50.0)));
    }

    #[test]
    fn squad_group_base_must_clear_top_group() {
        let top = Formation::new(GroupId(5), AgentId(0), Layout::fixed(Pattern::Line { spacing: 10.0 }, 2)).unwrap();
        let squad = Layout::fixed(Pattern::Line { spacing: 10.0 }, 2);
        assert!(TwoLevelFormation::new(top, squad, 5).is_err());
    }

    #[test]
    fn squad_groups_past_u16_max_fail_before_spawning() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let top = Formation::new(GroupId(1), AgentId(0), Layout::fixed(Pattern::Line { spacing: 100.0 }, 3)).unwrap();
        let squad = Layout::fixed(Pattern::Column { spacing: 10.0 }, 2);
        let mut two = TwoLevelFormation::new(top, squad, u16::MAX - 1).unwrap();

        let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
        let err = two.sync_members(&fw, &mut world.markers, &mut spawner).unwrap_err();
        assert!(matches!(err, FormationError::InvalidLayout(_)), "{err}");
        assert!(spawner.requests.is_empty());
        assert!(two.squads().is_empty());
    }

    #[test]
    fn shrinking_top_level_dissolves_squads() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut spawner = RecordingSpawner::starting_at(1);
        let top = Formation::new(GroupId(1), AgentId(0), Layout::fixed(Pattern::Line { spacing: 100.0 }, 2)).unwrap();
        let mut two = TwoLevelFormation::new(top, Layout::fixed(Pattern::Column { spacing: 10.0 }, 2), 10).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            two.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }

        two.set_top_layout(Layout::fixed(Pattern::Line { spacing: 100.0 }, 1)).unwrap();
        {
            let fw = FormationWorld::new(&world.states, &[], &world.obstacles);
            two.sync_members(&fw, &mut world.markers, &mut spawner).unwrap();
        }
        assert_eq!(two.squads().len(), 1);
        // The second squad usher plus its two members.
        assert_eq!(spawner.despawned.len(), 3);
        assert!(world.markers.roster(GroupId(11)).is_empty());
    }
}

// ── Member, hinge and waiter behaviors ────────────────────────────────────────

#[cfg(test)]
mod behaviors {
    use sk_behavior::{Marker, Seek, SlotBinding, SteeringBehavior};
    use sk_core::math::{cross, shortest_angle};
    use sk_core::{AgentId, AgentRng, GroupId, SteeringOutput, Vec2};

    use super::helpers::*;
    use crate::{FormationMember, HingeState, UsherHinge, UsherWaiter, WaitMode};

    fn rng() -> AgentRng {
        AgentRng::new(3, AgentId(0))
    }

    #[test]
    fn settled_member_keeps_pace() {
        let mut world = World::new(vec![usher_at(100.0, 0.0, 0.0)]);
        let marker = world.markers.insert(Marker::posed(Vec2::new(100.0, 0.0), 0.0).with_velocity(Vec2::new(50.0, 0.0)));
        let mut member = FormationMember::new(marker);

        let out = member.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(out, Some(SteeringOutput::linear(Vec2::new(50.0, 0.0))));

        world.states[0].position = Vec2::ZERO;
        let out = member.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!(out.linear.x > 50.0);
    }

    #[test]
    fn settled_member_aligns_with_slot() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let marker = world.markers.insert(Marker::posed(Vec2::ZERO, 90.0));
        let mut member = FormationMember::new(marker);
        let out = member.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!(out.angular > 0.0);
    }

    #[test]
    fn member_declines_without_marker() {
        let world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut member = FormationMember::default();
        assert_eq!(member.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
        assert!(!member.validate().is_empty());
    }

    #[test]
    fn hinge_wheels_left_then_straightens() {
        let goal = Vec2::new(0.0, 500.0);
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut hinge = UsherHinge::new(goal);
        let mut rng = rng();

        let first = hinge.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
        assert_eq!(hinge.state(), HingeState::TurningLeft);
        assert!(close(hinge.hinge_position().unwrap(), Vec2::new(0.0, 50.0)));
        world.states[0].apply(first, DT);

        let mut straightened = false;
        for _ in 0..1500 {
            let out = hinge.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            world.states[0].apply(out, DT);
            if hinge.state() == HingeState::Straight {
                straightened = true;
            }
            // While wheeling the usher stays on the hinge circle.
            if let Some(h) = hinge.hinge_position() {
                assert!((world.states[0].position.distance(h) - 50.0).abs() < 0.5);
            }
        }
        assert!(straightened);
        assert!(world.states[0].position.distance(goal) < 6.0);
        assert!(world.states[0].speed() < 1.0);
    }

    #[test]
    fn hinge_switches_sides_mid_turn() {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut hinge = UsherHinge::new(Vec2::new(0.0, 500.0));
        let mut rng = rng();

        for _ in 0..20 {
            let out = hinge.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            world.states[0].apply(out, DT);
        }
        assert_eq!(hinge.state(), HingeState::TurningLeft);

        let goal = Vec2::new(0.0, -500.0);
        hinge.target = goal.into();
        let out = hinge.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
        assert_eq!(hinge.state(), HingeState::TurningRight);
        let usher = &world.states[0];
        let to_hinge = hinge.hinge_position().unwrap() - usher.position;
        assert!(cross(usher.forward(), to_hinge) < 0.0);
        assert!((to_hinge.length() - 50.0).abs() < 1e-2);
        world.states[0].apply(out, DT);

        for _ in 0..3000 {
            let out = hinge.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            world.states[0].apply(out, DT);
        }
        assert_eq!(hinge.state(), HingeState::Straight);
        assert!(world.states[0].position.distance(goal) < 6.0);
    }

    #[test]
    fn held_hinge_resumes_turn_after_wait() {
        let goal = Vec2::new(0.0, 500.0);
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0), usher_at(0.0, 0.0, 0.0)]);
        let marker = world.markers.insert(Marker::at(Vec2::ZERO));
        world.markers.set_roster(GroupId(1), vec![SlotBinding { marker, member: Some(AgentId(1)), obstructed: false }]);
        let mut usher = UsherWaiter::new(Box::new(UsherHinge::new(goal)), GroupId(1), WaitMode::Stop)
            .with_timers(100.0, 1.0);
        let mut rng = rng();

        for _ in 0..20 {
            let out = usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            world.states[0].apply(out, DT);
        }
        let mid_turn = world.states[0].orientation;
        assert!(mid_turn > 1.0 && mid_turn < 80.0);

        // Member falls behind; the usher is held mid-turn.
        world.states[1].position = Vec2::new(-100.0, 0.0);
        world.reindex();
        for _ in 0..60 {
            let out = usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            assert_eq!(out, Some(SteeringOutput::ZERO));
            world.states[0].apply(out, DT);
        }
        assert!(usher.is_waiting());
        assert!((world.states[0].orientation - mid_turn).abs() < 1e-3);

        world.states[1].position = Vec2::ZERO;
        world.reindex();
        for _ in 0..3000 {
            let out = usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            world.states[0].apply(out, DT);
        }
        assert!(!usher.is_waiting());
        assert!(world.states[0].position.distance(goal) < 6.0);
        assert!(shortest_angle(world.states[0].orientation, 90.0).abs() < 15.0);
    }

    #[test]
    fn hinge_goes_straight_when_aligned() {
        let world = World::new(vec![usher_at(0.0, 0.0, 0.0)]);
        let mut hinge = UsherHinge::new(Vec2::new(500.0, 5.0));
        let out = hinge.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert_eq!(hinge.state(), HingeState::Straight);
        assert_eq!(out.linear.y, 0.0);
        assert!(out.linear.x > 0.0);
    }

    fn lagging_world(lag: f32, obstructed: bool) -> World {
        let mut world = World::new(vec![usher_at(0.0, 0.0, 0.0), usher_at(-lag, 0.0, 0.0)]);
        let marker = world.markers.insert(Marker::at(Vec2::ZERO));
        world.markers.set_roster(GroupId(1), vec![SlotBinding { marker, member: Some(AgentId(1)), obstructed }]);
        world
    }

    fn waiter(mode: WaitMode) -> UsherWaiter {
        UsherWaiter::new(Box::new(Seek::new(5.0).targeting(Vec2::new(1000.0, 0.0))), GroupId(1), mode)
    }

    #[test]
    fn waiter_stops_until_members_catch_up() {
        let mut world = lagging_world(100.0, false);
        let mut usher = waiter(WaitMode::Stop);

        let out = usher.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(usher.is_waiting());
        assert_eq!(out, Some(SteeringOutput::ZERO));

        world.states[1].position = Vec2::new(-10.0, 0.0);
        world.reindex();
        let out = usher.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(!usher.is_waiting());
        assert_eq!(out, Some(SteeringOutput::linear(Vec2::new(100.0, 0.0))));
    }

    #[test]
    fn waiter_moves_on_after_advantage_timeout() {
        let world = lagging_world(100.0, false);
        let mut usher = waiter(WaitMode::Stop).with_timers(0.1, 1.0);
        let mut rng = rng();

        usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
        assert!(usher.is_waiting());
        for _ in 0..10 {
            usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
        }
        assert!(!usher.is_waiting());
        // The cooldown keeps it moving even though the lag persists.
        for _ in 0..30 {
            let out = usher.steering(&world.args(0), &world.ctx(), &mut rng).unwrap();
            assert!(!usher.is_waiting());
            assert_eq!(out, Some(SteeringOutput::linear(Vec2::new(100.0, 0.0))));
        }
    }

    #[test]
    fn waiter_ignores_obstructed_slots() {
        let world = lagging_world(100.0, true);
        let mut usher = waiter(WaitMode::Stop);
        usher.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(!usher.is_waiting());
        assert_eq!(usher.worst_lag(&world.ctx()), 0.0);
    }

    #[test]
    fn slow_mode_scales_with_lag() {
        let world = lagging_world(40.0, false);
        let mut usher = waiter(WaitMode::Slow { min_factor: 0.5 });
        let out = usher.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!((out.linear.x - 75.0).abs() < 1e-3);
    }

    #[test]
    fn waiter_validation_is_nested() {
        let usher = waiter(WaitMode::Slow { min_factor: 2.0 }).with_distances(10.0, 20.0);
        let issues = usher.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.path == "usher-waiter"));
    }
}
