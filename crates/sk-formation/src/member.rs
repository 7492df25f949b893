use sk_core::{AgentRng, MarkerId, Steering, SteeringOutput};

use sk_behavior::{
    Align, Arrive, BehaviorResult, ConfigIssue, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext, Target,
};

/// Root behavior of a formation member: arrive at the slot marker, carried
/// along by the slot's own velocity, and align with the usher once settled.
///
/// Declines while the marker is unpublished.
#[derive(Clone, Debug, PartialEq)]
pub struct FormationMember {
    pub marker: MarkerId,
    pub arrive: Arrive,
    pub align: Align,
    /// Add the slot velocity to the arrive output so a member on its slot
    /// keeps pace with a moving usher.
    pub match_velocity: bool,
}

impl FormationMember {
    pub fn new(marker: MarkerId) -> Self {
        Self {
            marker,
            arrive: Arrive::new(3.0, 20.0, 60.0),
            align: Align::default(),
            match_velocity: true,
        }
    }

    pub fn with_arrive(mut self, arrive: Arrive) -> Self {
        self.arrive = arrive;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// The same steering settings bound to another slot.
    pub fn for_marker(&self, marker: MarkerId) -> Self {
        Self { marker, ..self.clone() }
    }
}

impl Default for FormationMember {
    fn default() -> Self {
        Self::new(MarkerId::INVALID)
    }
}

impl SteeringBehavior for FormationMember {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(slot) = ctx.resolve(&Target::Marker(self.marker)) else {
            return Ok(None);
        };
        let approach = self.arrive.steer_to(args, &slot, rng).unwrap_or(SteeringOutput::ZERO);
        let mut out = approach;
        if self.match_velocity {
            out.linear += slot.velocity;
        }
        if approach.is_zero() {
            out.angular = self.align.steer_to(args, &slot, rng).map_or(0.0, |a| a.angular);
        }
        Ok(Some(out.clamp_linear(args.max_speed)))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .arrive
            .validate()
            .into_iter()
            .chain(MarkerSteering::validate(&self.align))
            .map(|i| i.within("formation-member"))
            .collect();
        if self.marker == MarkerId::INVALID {
            issues.push(ConfigIssue::new("formation-member", "slot marker is unset"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "formation-member"
    }
}
