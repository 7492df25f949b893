//! Unit tests for sk-behavior.
//!
//! Scenarios run against a small hand-built world; multi-tick tests step
//! agents with `KinematicState::apply` exactly as the host does.

#[cfg(test)]
mod helpers {
    use sk_core::{AgentId, AgentRng, KinematicState, Steering, Tick, Vec2};
    use sk_sense::{AgentIndex, ObstacleSet};

    use crate::{BoxedBehavior, MarkerBoard, SteeringArgs, SteeringContext};

    pub const DT: f32 = 1.0 / 60.0;

    /// Agents, markers and obstacles for one scenario.
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

        /// Poll every behavior against one snapshot, then integrate.
        pub fn step(&mut self, behaviors: &mut [BoxedBehavior], rngs: &mut [AgentRng]) -> Vec<Steering> {
            let outputs: Vec<Steering> = {
                let ctx = self.ctx();
                behaviors
                    .iter_mut()
                    .zip(rngs.iter_mut())
                    .enumerate()
                    .map(|(i, (b, rng))| b.steering(&self.args(i as u32), &ctx, rng).unwrap())
                    .collect()
            };
            for (state, out) in self.states.iter_mut().zip(&outputs) {
                state.apply(*out, DT);
            }
            self.index = AgentIndex::build(&self.states, &[]);
            outputs
        }
    }

    pub fn agent_at(x: f32, y: f32) -> KinematicState {
        KinematicState::at(Vec2::new(x, y), 0.0)
    }

    pub fn rng() -> AgentRng {
        AgentRng::new(7, AgentId(0))
    }

    /// `true` if `speeds` rises (weakly) and then falls (weakly), once.
    pub fn is_unimodal(speeds: &[f32]) -> bool {
        let mut falling = false;
        for w in speeds.windows(2) {
            if w[1] < w[0] - 1e-3 {
                falling = true;
            } else if falling && w[1] > w[0] + 1e-3 {
                return false;
            }
        }
        true
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod primitives {
    use sk_core::math::shortest_angle;
    use sk_core::{AgentId, SteeringOutput, Vec2};

    use super::helpers::*;
    use crate::{
        Align, Arrive, BoxedBehavior, Face, Flee, LinearArrive, Marker, MarkerSteering, Seek, SteeringArgs,
        SteeringBehavior, VelocityMatching, Wander,
    };

    #[test]
    fn seek_full_speed_then_zero() {
        let mut world = World::new(vec![agent_at(0.0, 0.0).with_max_speed(600.0)]);
        let mut seek = Seek::new(5.0).targeting(Vec2::new(1000.0, 0.0));

        let out = seek.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(out, Some(SteeringOutput::linear(Vec2::new(600.0, 0.0))));

        world.states[0].position = Vec2::new(997.0, 0.0);
        let out = seek.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(out, Some(SteeringOutput::ZERO));
    }

    #[test]
    fn seek_converges() {
        let goal = Vec2::new(500.0, 300.0);
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut behaviors: Vec<BoxedBehavior> = vec![Box::new(Seek::new(5.0).targeting(goal))];
        let mut rngs = vec![rng()];

        let mut arrived_at = None;
        for tick in 0..600 {
            let out = world.step(&mut behaviors, &mut rngs);
            if out[0] == Some(SteeringOutput::ZERO) {
                arrived_at = Some(tick);
                break;
            }
        }
        assert!(arrived_at.is_some(), "seek never arrived");
        assert!(world.states[0].position.distance(goal) <= 5.0);
    }

    #[test]
    fn flee_is_negated_seek() {
        let world = World::new(vec![agent_at(10.0, -20.0)]);
        let args = world.args(0);
        let threat = Marker::at(Vec2::new(40.0, 20.0));

        let seek = Seek::new(0.0).steer_to(&args, &threat, &mut rng()).unwrap();
        let flee = Flee::new(200.0).steer_to(&args, &threat, &mut rng()).unwrap();
        assert!((flee.linear + seek.linear).length() < 1e-4);
        assert!(flee.linear.length() > 0.0);
    }

    #[test]
    fn flee_declines_outside_panic_distance() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let out = Flee::new(50.0).steer_to(&world.args(0), &Marker::at(Vec2::new(51.0, 0.0)), &mut rng());
        assert_eq!(out, None);
    }

    /// Speeds over `ticks` steps and the final position.
    fn speed_profile(behavior: BoxedBehavior, ticks: usize) -> (Vec<f32>, Vec2) {
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut behaviors = vec![behavior];
        let mut rngs = vec![rng()];
        let mut speeds = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            world.step(&mut behaviors, &mut rngs);
            speeds.push(world.states[0].speed());
        }
        (speeds, world.states[0].position)
    }

    #[test]
    fn curve_arrive_speed_is_unimodal() {
        let goal = Vec2::new(500.0, 0.0);
        let (speeds, end) = speed_profile(Box::new(Arrive::default().targeting(goal)), 900);
        assert!(is_unimodal(&speeds), "speed profile not unimodal");
        assert!(end.distance(goal) <= 5.0 + 1e-3);
        assert!(speeds.iter().all(|&s| s <= 100.0 + 1e-3));
        assert_eq!(*speeds.last().unwrap(), 0.0);
    }

    #[test]
    fn linear_arrive_speed_is_unimodal() {
        let goal = Vec2::new(500.0, 0.0);
        let (speeds, end) = speed_profile(Box::new(LinearArrive::default().targeting(goal)), 900);
        assert!(is_unimodal(&speeds), "speed profile not unimodal");
        assert!(end.distance(goal) <= 5.0 + 1e-3);
        assert_eq!(*speeds.last().unwrap(), 0.0);
    }

    #[test]
    fn arrive_never_overshoots() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut arrive = Arrive::new(0.0, 0.0, 0.0);
        let out = arrive.steer_to(&world.args(0), &Marker::at(Vec2::new(0.5, 0.0)), &mut rng()).unwrap();
        // One tick at this velocity lands exactly on the target.
        assert!((out.linear.x * DT - 0.5).abs() < 1e-4);
    }

    #[test]
    fn linear_arrive_braking_radius() {
        assert_eq!(LinearArrive::braking_radius(100.0, 200.0), 25.0);
        assert_eq!(LinearArrive::braking_radius(100.0, 0.0), f32::INFINITY);
    }

    #[test]
    fn align_turns_the_short_way_without_overshoot() {
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        world.states[0].orientation = 170.0;
        let target = -170.0;
        let mut behaviors: Vec<BoxedBehavior> = vec![Box::new(Align::default().targeting(crate::Target::Pose {
            position:    Vec2::ZERO,
            orientation: target,
        }))];
        let mut rngs = vec![rng()];

        let first = world.step(&mut behaviors, &mut rngs)[0].unwrap();
        assert!(first.angular > 0.0, "should turn counter-clockwise through 180");

        for _ in 0..300 {
            world.step(&mut behaviors, &mut rngs);
            assert!(shortest_angle(world.states[0].orientation, target) >= -1e-3);
        }
        assert!(shortest_angle(world.states[0].orientation, target).abs() <= 1.0 + 1e-3);
    }

    #[test]
    fn align_declines_without_orientation() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let out = Align::default().steer_to(&world.args(0), &Marker::at(Vec2::X), &mut rng());
        assert_eq!(out, None);
    }

    #[test]
    fn face_turns_toward_point() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut face = Face::default();
        let out = face.steer_to(&world.args(0), &Marker::at(Vec2::new(0.0, 100.0)), &mut rng()).unwrap();
        assert!(out.angular > 0.0);
        assert_eq!(face.steer_to(&world.args(0), &Marker::at(Vec2::ZERO), &mut rng()), None);
    }

    #[test]
    fn wander_point_stays_on_circle() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut wander = Wander::default();
        let mut r = rng();
        let args: SteeringArgs = world.args(0);
        for _ in 0..50 {
            let out = wander.steering(&args, &world.ctx(), &mut r).unwrap();
            assert!(out.is_some());
            let point = wander.wander_target(&args).unwrap();
            let center = args.position + args.travel_direction() * 60.0;
            assert!((point.distance(center) - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn velocity_matching_reaches_target_without_overshoot() {
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        let target = Marker::at(Vec2::new(0.0, 50.0)).with_velocity(Vec2::new(100.0, 0.0));
        let mut matching = VelocityMatching::default();
        let mut r = rng();
        for _ in 0..60 {
            let out = matching.steer_to(&world.args(0), &target, &mut r);
            world.states[0].apply(out, DT);
            assert!(world.states[0].velocity.x <= 100.0 + 1e-3);
        }
        assert!((world.states[0].velocity - Vec2::new(100.0, 0.0)).length() < 1e-3);
        assert_eq!(world.states[0].velocity, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn velocity_matching_pushed_past_target_stays_limited() {
        let mut world = World::new(vec![agent_at(0.0, 0.0).with_max_speed(300.0)]);
        let target = Marker::at(Vec2::ZERO).with_velocity(Vec2::new(100.0, 0.0));
        let mut matching = VelocityMatching::default();
        let mut r = rng();
        matching.steer_to(&world.args(0), &target, &mut r);

        world.states[0].velocity = Vec2::new(200.0, 0.0);
        let out = matching.steer_to(&world.args(0), &target, &mut r).unwrap();
        let max_step = world.states[0].max_deceleration * DT;
        assert!((out.linear.x - (200.0 - max_step)).abs() < 1e-3);
        assert!(matching.acceleration().x < 0.0);
    }

    #[test]
    fn targeted_agent_that_vanished_declines() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut seek = Seek::default().targeting(AgentId(9));
        assert_eq!(seek.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }
}

// ── Group behaviors ───────────────────────────────────────────────────────────

#[cfg(test)]
mod group {
    use sk_core::{AgentId, SteeringOutput, Vec2};

    use super::helpers::*;
    use crate::{
        AgentSet, BehaviorError, Cohesion, Evade, Falloff, GroupAlign, Hide, Interpose, OffsetFollow, Pursue,
        Seek, Separation, SteeringBehavior, hiding_spot,
    };

    #[test]
    fn separation_pushes_away_inside_threshold() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(10.0, 0.0)]);
        let mut sep = Separation::new(AgentSet::All, 20.0, Falloff::Linear);
        let out = sep.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!(out.linear.x < 0.0);
        assert!(out.linear.y.abs() < 1e-4);
        // 200 × (20 − 10) / 20 for one tick.
        assert!((out.linear.x + 100.0 * DT).abs() < 1e-3);
    }

    #[test]
    fn separation_declines_out_of_range() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(50.0, 0.0)]);
        let mut sep = Separation::new(AgentSet::All, 20.0, Falloff::InverseSquare { decay: 1000.0 });
        assert_eq!(sep.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }

    #[test]
    fn cohesion_heads_for_centroid() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(100.0, 0.0), agent_at(100.0, 100.0)]);
        let mut cohesion = Cohesion::new(AgentSet::All, f32::INFINITY).with_approach(Seek::new(5.0));
        let out = cohesion.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        let expected = Vec2::new(100.0, 50.0).normalize() * 100.0;
        assert!((out.linear - expected).length() < 1e-3);
    }

    #[test]
    fn group_align_follows_average_heading() {
        let mut world = World::new(vec![agent_at(0.0, 0.0), agent_at(10.0, 0.0), agent_at(20.0, 0.0)]);
        world.states[1].orientation = 80.0;
        world.states[2].orientation = 100.0;
        let mut align = GroupAlign::new(AgentSet::All, 50.0);
        let out = align.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!(out.angular > 0.0);
    }

    #[test]
    fn pursue_leads_a_crossing_quarry() {
        let world = World::new(vec![
            agent_at(0.0, 0.0),
            agent_at(100.0, 0.0).with_velocity(Vec2::new(0.0, 50.0)),
        ]);
        let mut pursue = Pursue::new(AgentId(1));
        let out = pursue.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        // 100 / (0 + 50) = 2 s ahead → (100, 100).
        let expected = Vec2::new(100.0, 100.0).normalize() * 100.0;
        assert!((out.linear - expected).length() < 1e-3);
    }

    #[test]
    fn pursue_skips_prediction_when_quarry_approaches() {
        let world = World::new(vec![
            agent_at(0.0, 0.0),
            agent_at(100.0, 0.0).with_velocity(Vec2::new(-50.0, 0.0)),
        ]);
        let mut pursue = Pursue::new(AgentId(1));
        let out = pursue.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!((out.linear - Vec2::new(100.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn evade_declines_outside_panic_distance() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(1000.0, 0.0)]);
        let mut evade = Evade::new(AgentId(1), 200.0);
        assert_eq!(evade.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }

    #[test]
    fn interpose_aims_between_agents() {
        let world = World::new(vec![agent_at(50.0, 100.0), agent_at(0.0, 0.0), agent_at(100.0, 0.0)]);
        let mut interpose = Interpose::new(AgentId(1), AgentId(2));
        assert_eq!(interpose.predicted(), None);
        let out = interpose.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert_eq!(interpose.predicted(), Some(Vec2::new(50.0, 0.0)));
        assert!(out.linear.y < 0.0);
        assert!(out.linear.x.abs() < 1e-3);
    }

    #[test]
    fn hiding_spot_is_behind_obstacle() {
        let spot = hiding_spot(Vec2::ZERO, 10.0, Vec2::new(-50.0, 0.0), 5.0);
        assert!((spot - Vec2::new(15.0, 0.0)).length() < 1e-4);

        let hide = Hide::new(AgentId(1), vec![(Vec2::new(0.0, 0.0), 10.0), (Vec2::new(200.0, 0.0), 10.0)]);
        let best = hide.best_spot(Vec2::new(30.0, 0.0), Vec2::new(-50.0, 0.0)).unwrap();
        assert!((best - Vec2::new(20.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn hide_steering_is_unsupported() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(50.0, 0.0)]);
        let mut hide = Hide::new(AgentId(1), vec![(Vec2::new(0.0, 30.0), 10.0)]);
        let err = hide.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap_err();
        assert!(matches!(err, BehaviorError::Unsupported { behavior: "hide", .. }));
        assert!(!hide.validate().is_empty());
    }

    #[test]
    fn offset_follow_holds_slot_then_aligns() {
        let mut world = World::new(vec![agent_at(0.0, 0.0), agent_at(100.0, 0.0)]);
        world.states[1].orientation = 90.0;
        let mut follow = OffsetFollow::new(AgentId(1), Vec2::new(-20.0, 0.0));

        let out = follow.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        let to_slot = (Vec2::new(100.0, -20.0) - Vec2::ZERO).normalize();
        assert!(out.linear.normalize().dot(to_slot) > 0.999);

        world.states[0].position = Vec2::new(100.0, -20.0);
        let out = follow.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert_eq!(out.linear, Vec2::ZERO);
        assert!(out.angular > 0.0);

        world.states[0].orientation = 90.0;
        let out = follow.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(out, Some(SteeringOutput::ZERO));
    }
}

// ── Avoidance ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod avoidance {
    use sk_core::{AgentId, AgentRng, Vec2};
    use sk_sense::LayerMask;

    use super::helpers::*;
    use crate::{
        ActiveAgentAvoider, ActiveAvoider, AgentAvoider, AgentSet, BoxedBehavior, PassiveAvoider, Seek,
        SteeringArgs, SteeringBehavior, SteeringContext, WallAvoider,
    };

    fn head_on_pair(seed: u64) -> (f32, World) {
        let mut world = World::new(vec![agent_at(-300.0, 0.0), agent_at(300.0, 0.0)]);
        world.states[1].orientation = 180.0;

        let avoider = || {
            AgentAvoider::new(AgentSet::All, 200.0)
                .with_collision_distance(20.0)
                .with_too_aligned_factor(0.95)
        };
        let mut behaviors: Vec<BoxedBehavior> = vec![
            Box::new(ActiveAgentAvoider::new(Seek::new(5.0).targeting(Vec2::new(300.0, 0.0)), avoider(), 0.5)),
            Box::new(ActiveAgentAvoider::new(Seek::new(5.0).targeting(Vec2::new(-300.0, 0.0)), avoider(), 0.5)),
        ];
        let mut rngs = vec![AgentRng::new(seed, AgentId(0)), AgentRng::new(seed, AgentId(1))];

        let mut closest = f32::INFINITY;
        for _ in 0..1500 {
            world.step(&mut behaviors, &mut rngs);
            closest = closest.min(world.states[0].position.distance(world.states[1].position));
        }
        (closest, world)
    }

    #[test]
    fn head_on_pair_breaks_symmetry() {
        for seed in [1, 2, 3, 42] {
            let (closest, world) = head_on_pair(seed);
            assert!(closest >= 20.0, "seed {seed}: agents came within {closest}");
            assert!(world.states[0].position.distance(Vec2::new(300.0, 0.0)) <= 6.0, "seed {seed}: agent 0 stuck");
            assert!(world.states[1].position.distance(Vec2::new(-300.0, 0.0)) <= 6.0, "seed {seed}: agent 1 stuck");
        }
    }

    #[test]
    fn agent_avoider_ignores_diverging_agents() {
        let world = World::new(vec![
            agent_at(0.0, 0.0).with_velocity(Vec2::new(-50.0, 0.0)),
            agent_at(100.0, 0.0).with_velocity(Vec2::new(50.0, 0.0)),
        ]);
        let mut avoider = AgentAvoider::new(AgentSet::All, 500.0);
        assert_eq!(avoider.avoidance(&world.args(0), &world.ctx(), &mut rng()), None);
    }

    #[test]
    fn agent_avoider_pushes_apart_when_colliding() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(0.0, 10.0)]);
        let mut avoider = AgentAvoider::new(AgentSet::All, 100.0);
        let v = avoider.avoidance(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!((v - Vec2::new(0.0, -100.0)).length() < 1e-3);
    }

    #[test]
    fn wall_avoider_pushes_back_and_sideways() {
        let mut world = World::new(vec![agent_at(0.0, 0.0).with_velocity(Vec2::new(100.0, 0.0))]);
        world.obstacles.add_wall(Vec2::new(50.0, -100.0), Vec2::new(50.0, 100.0), LayerMask::default()).unwrap();
        let mut avoider = WallAvoider::new(LayerMask::ALL, 80.0);
        let push = avoider.avoidance(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        // Overshoot (80 − 50) / 80 of max speed, straight back plus a random side.
        assert!((push.x + 37.5).abs() < 1e-3);
        assert!((push.y.abs() - 37.5).abs() < 1e-3);
    }

    #[test]
    fn wall_avoider_sidesteps_away_from_hit_side() {
        let mut world = World::new(vec![agent_at(0.0, 0.0).with_velocity(Vec2::new(100.0, 0.0))]);
        world.obstacles.add_wall(Vec2::new(40.0, 5.0), Vec2::new(40.0, 100.0), LayerMask::default()).unwrap();
        let mut avoider = WallAvoider::new(LayerMask::ALL, 80.0);
        let push = avoider.avoidance(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(push.x < 0.0);
        assert!(push.y < 0.0, "hit on the left should push right");
    }

    #[test]
    fn wall_avoider_quiet_in_open_space() {
        let world = World::new(vec![agent_at(0.0, 0.0).with_velocity(Vec2::new(100.0, 0.0))]);
        let mut avoider = WallAvoider::new(LayerMask::ALL, 80.0);
        assert_eq!(avoider.avoidance(&world.args(0), &world.ctx(), &mut rng()), None);
    }

    /// Detects something on the first poll only.
    struct OneShot(bool);

    impl PassiveAvoider for OneShot {
        fn avoidance(&mut self, _: &SteeringArgs, _: &SteeringContext<'_>, _: &mut AgentRng) -> Option<Vec2> {
            let fire = !self.0;
            self.0 = true;
            fire.then_some(Vec2::new(0.0, 50.0))
        }

        fn name(&self) -> &'static str {
            "one-shot"
        }
    }

    #[test]
    fn active_avoider_holds_vector_through_cooldown() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut active = ActiveAvoider::new(Seek::new(5.0).targeting(Vec2::new(1000.0, 0.0)), OneShot(false), 0.1);
        let mut r = rng();

        let mut outputs = Vec::new();
        for _ in 0..12 {
            outputs.push(active.steering(&world.args(0), &world.ctx(), &mut r).unwrap().unwrap());
        }
        // Detection tick plus ~6 cooldown ticks carry the sidestep.
        assert!(outputs[0].linear.y > 0.0);
        assert!(outputs[4].linear.y > 0.0);
        assert_eq!(outputs[11].linear, Vec2::new(100.0, 0.0));
        assert!(!active.is_avoiding());
    }
}

// ── Combinators ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod blend {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sk_core::{AgentRng, Steering, SteeringOutput, Vec2};

    use super::helpers::*;
    use crate::{
        BehaviorResult, Flee, PriorityDitheringBlended, PriorityWeightBlended, Seek, SteeringArgs,
        SteeringBehavior, SteeringContext, WeightBlended,
    };

    /// Returns a fixed steering and counts how often it is polled.
    struct Probe {
        out: Steering,
        polls: Arc<AtomicUsize>,
    }

    impl Probe {
        fn new(out: Steering) -> (Self, Arc<AtomicUsize>) {
            let polls = Arc::new(AtomicUsize::new(0));
            (Self { out, polls: polls.clone() }, polls)
        }
    }

    impl SteeringBehavior for Probe {
        fn steering(&mut self, _: &SteeringArgs, _: &SteeringContext<'_>, _: &mut AgentRng) -> BehaviorResult<Steering> {
            self.polls.fetch_add(1, Ordering::Relaxed);
            Ok(self.out)
        }

        fn name(&self) -> &'static str {
            "probe"
        }
    }

    fn linear(x: f32, y: f32) -> Steering {
        Some(SteeringOutput::linear(Vec2::new(x, y)))
    }

    #[test]
    fn weight_blend_ignores_zero_and_declining_children() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let target = Vec2::new(100.0, 50.0);

        let mut alone = WeightBlended::new().with(1.0, Seek::new(5.0).targeting(target));
        let mut padded = WeightBlended::new()
            .with(1.0, Seek::new(5.0).targeting(target))
            .with(3.0, Seek::new(5.0).targeting(Vec2::ZERO))
            .with(2.0, Flee::new(10.0).targeting(Vec2::new(500.0, 0.0)));

        let a = alone.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        let b = padded.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!((a.linear - b.linear).length() < 1e-4);
    }

    #[test]
    fn weight_blend_renormalizes_over_contributors() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut blend = WeightBlended::new()
            .with(1.0, Probe::new(linear(10.0, 0.0)).0)
            .with(3.0, Probe::new(linear(0.0, 10.0)).0)
            .with(5.0, Probe::new(None).0);
        let out = blend.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap().unwrap();
        assert!((out.linear - Vec2::new(2.5, 7.5)).length() < 1e-4);
    }

    #[test]
    fn weight_blend_with_no_contributor_declines() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut blend = WeightBlended::new()
            .with(1.0, Probe::new(None).0)
            .with(1.0, Probe::new(Some(SteeringOutput::ZERO)).0);
        assert_eq!(blend.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }

    #[test]
    fn priority_picks_first_contributing_group() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let (quiet, _) = Probe::new(None);
        let (first, first_polls) = Probe::new(linear(1.0, 0.0));
        let (second, second_polls) = Probe::new(linear(0.0, 1.0));

        let mut priority = PriorityWeightBlended::new()
            .with(WeightBlended::new().with(1.0, quiet))
            .with(WeightBlended::new().with(1.0, first))
            .with(WeightBlended::new().with(1.0, second));

        let out = priority.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(out, linear(1.0, 0.0));
        assert_eq!(first_polls.load(Ordering::Relaxed), 1);
        assert_eq!(second_polls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn priority_with_nothing_to_do_declines() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut priority = PriorityWeightBlended::new().with(WeightBlended::new().with(1.0, Probe::new(None).0));
        assert_eq!(priority.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }

    #[test]
    fn dithering_skips_failed_rolls() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let (never, never_polls) = Probe::new(linear(1.0, 0.0));
        let (always, _) = Probe::new(linear(0.0, 1.0));
        let mut dither = PriorityDitheringBlended::new().with(0.0, never).with(1.0, always);

        let mut r = rng();
        for _ in 0..20 {
            let out = dither.steering(&world.args(0), &world.ctx(), &mut r).unwrap();
            assert_eq!(out, linear(0.0, 1.0));
        }
        assert_eq!(never_polls.load(Ordering::Relaxed), 0);
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod validation {
    use sk_core::{AgentId, Vec2};

    use crate::{Arrive, ConfigIssue, PriorityWeightBlended, Seek, SteeringBehavior, WeightBlended};

    #[test]
    fn nested_issue_paths() {
        let tree = PriorityWeightBlended::new()
            .with(WeightBlended::new().with(1.0, Seek::new(-1.0).targeting(Vec2::ZERO)));
        let issues = tree.validate();
        assert_eq!(
            issues,
            vec![ConfigIssue::new(
                "priority-weight-blended/groups[0]/weight-blended/children[0]/seek",
                "arrival distance must not be negative",
            )]
        );
    }

    #[test]
    fn unset_target_is_reported() {
        let seek = Seek::default().targeting(AgentId::INVALID);
        assert_eq!(seek.validate().len(), 1);
    }

    #[test]
    fn well_formed_tree_has_no_issues() {
        let tree = WeightBlended::new()
            .with(1.0, Seek::default().targeting(Vec2::X))
            .with(2.0, Arrive::default().targeting(Vec2::Y));
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn issue_display() {
        let issue = ConfigIssue::new("seek", "bad").within("weight-blended");
        assert_eq!(issue.to_string(), "weight-blended/seek: bad");
    }
}

// ── Path following ────────────────────────────────────────────────────────────

#[cfg(test)]
mod path_following {
    use std::sync::Arc;

    use sk_core::Vec2;
    use sk_path::{AStar, GraphNavigator, Path, PathError, TileGrid};

    use super::helpers::*;
    use crate::{BehaviorError, BoxedBehavior, Marker, PathFollowing, PathfindingFollower, SteeringBehavior};

    #[test]
    fn follows_waypoints_to_the_end() {
        let waypoints = vec![Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0), Vec2::new(0.0, 100.0)];
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut behaviors: Vec<BoxedBehavior> = vec![Box::new(PathFollowing::new(Path::new(waypoints, false)))];
        let mut rngs = vec![rng()];

        for _ in 0..900 {
            world.step(&mut behaviors, &mut rngs);
        }
        let end = world.states[0].position;
        assert!(end.distance(Vec2::new(0.0, 100.0)) <= 5.0 + 1e-3);
        assert!(world.states[0].speed() < 1e-3);
    }

    #[test]
    fn empty_path_declines() {
        let world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut follow = PathFollowing::new(Path::new(Vec::new(), false));
        assert_eq!(follow.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap(), None);
    }

    #[test]
    fn looping_path_keeps_moving() {
        let square = vec![
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(0.0, 50.0),
            Vec2::new(0.0, 0.0),
        ];
        let mut world = World::new(vec![agent_at(0.0, 0.0)]);
        let mut behaviors: Vec<BoxedBehavior> = vec![Box::new(PathFollowing::new(Path::new(square, true)))];
        let mut rngs = vec![rng()];
        for _ in 0..600 {
            world.step(&mut behaviors, &mut rngs);
            assert!(world.states[0].speed() > 50.0);
        }
    }

    #[test]
    fn pathfinding_follower_replans_when_target_moves() {
        let graph = TileGrid::open(Vec2::ZERO, 10.0, 10, 10).to_nav_graph().unwrap();
        let navigator = Arc::new(GraphNavigator::new(Arc::new(graph), AStar::default()));

        let mut world = World::new(vec![agent_at(5.0, 5.0)]);
        let marker = world.markers.insert(Marker::at(Vec2::new(95.0, 95.0)));
        let mut follower = PathfindingFollower::new(navigator, marker).with_replan_threshold(20.0);

        let out = follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(out.is_some());
        assert_eq!(follower.planned_for(), Some(Vec2::new(95.0, 95.0)));
        assert_eq!(follower.follower.path.waypoints().last(), Some(&Vec2::new(95.0, 95.0)));

        // Small moves keep the old plan.
        world.markers.set(marker, Marker::at(Vec2::new(90.0, 95.0)));
        follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(follower.planned_for(), Some(Vec2::new(95.0, 95.0)));

        world.markers.set(marker, Marker::at(Vec2::new(5.0, 95.0)));
        follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert_eq!(follower.planned_for(), Some(Vec2::new(5.0, 95.0)));
        assert_eq!(follower.follower.path.waypoints().last(), Some(&Vec2::new(5.0, 95.0)));
    }

    fn split_navigator() -> Arc<GraphNavigator<AStar>> {
        let mut grid = TileGrid::open(Vec2::ZERO, 10.0, 10, 10);
        for row in 0..10 {
            grid.block(5, row);
        }
        Arc::new(GraphNavigator::new(Arc::new(grid.to_nav_graph().unwrap()), AStar::default()))
    }

    #[test]
    fn first_plan_failure_is_an_error() {
        let world = World::new(vec![agent_at(5.0, 5.0)]);
        let mut follower = PathfindingFollower::new(split_navigator(), Vec2::new(95.0, 5.0));
        let err = follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap_err();
        assert!(matches!(err, BehaviorError::Path(PathError::NoPath { .. })));
        assert_eq!(follower.planned_for(), None);
    }

    #[test]
    fn failed_replan_keeps_previous_path() {
        let mut world = World::new(vec![agent_at(5.0, 5.0)]);
        let marker = world.markers.insert(Marker::at(Vec2::new(35.0, 95.0)));
        let mut follower = PathfindingFollower::new(split_navigator(), marker);
        follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        let planned = follower.follower.path.waypoints().to_vec();

        world.markers.set(marker, Marker::at(Vec2::new(95.0, 95.0)));
        let out = follower.steering(&world.args(0), &world.ctx(), &mut rng()).unwrap();
        assert!(out.is_some());
        assert_eq!(follower.follower.path.waypoints(), planned.as_slice());
        assert_eq!(follower.planned_for(), Some(Vec2::new(95.0, 95.0)));
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod context {
    use sk_core::{AgentId, GroupId, MarkerId, Vec2};

    use super::helpers::*;
    use crate::{AgentSet, Marker, MarkerBoard, SlotBinding, Target};

    #[test]
    fn marker_ids_are_reused_after_release() {
        let mut board = MarkerBoard::new();
        let a = board.allocate();
        let b = board.insert(Marker::at(Vec2::X));
        assert_eq!(a, MarkerId(0));
        assert_eq!(b, MarkerId(1));
        assert_eq!(board.len(), 1);

        board.release(a);
        board.set(a, Marker::at(Vec2::Y));
        assert!(board.get(a).is_none());

        let c = board.allocate();
        assert_eq!(c, a);
        assert!(board.get(c).is_none());
    }

    #[test]
    fn roster_defaults_to_empty() {
        let mut board = MarkerBoard::new();
        assert!(board.roster(GroupId(3)).is_empty());
        let slot = SlotBinding { marker: MarkerId(0), member: Some(AgentId(1)), obstructed: false };
        board.set_roster(GroupId(3), vec![slot]);
        assert_eq!(board.roster(GroupId(3)), &[slot]);
    }

    #[test]
    fn agents_near_excludes_self_and_sorts() {
        let world = World::new(vec![agent_at(0.0, 0.0), agent_at(30.0, 0.0), agent_at(5.0, 0.0), agent_at(500.0, 0.0)]);
        let ctx = world.ctx();
        let ids: Vec<_> = ctx.agents_near(&AgentSet::All, AgentId(0), Vec2::ZERO, 40.0).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![AgentId(1), AgentId(2)]);

        let list = AgentSet::List(vec![AgentId(3), AgentId(2), AgentId(2), AgentId(0)]);
        let ids: Vec<_> = ctx.agents_near(&list, AgentId(0), Vec2::ZERO, f32::INFINITY).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![AgentId(2), AgentId(3)]);
    }

    #[test]
    fn resolve_targets() {
        let mut world = World::new(vec![agent_at(7.0, 8.0)]);
        let id = world.markers.insert(Marker::posed(Vec2::Y, 45.0));
        let ctx = world.ctx();
        assert_eq!(ctx.resolve(&Target::Point(Vec2::X)), Some(Marker::at(Vec2::X)));
        assert_eq!(ctx.resolve(&Target::Agent(AgentId(0))).map(|m| m.position), Some(Vec2::new(7.0, 8.0)));
        assert_eq!(ctx.resolve(&Target::Marker(id)), Some(Marker::posed(Vec2::Y, 45.0)));
        assert_eq!(ctx.resolve(&Target::Marker(MarkerId(99))), None);
    }
}
