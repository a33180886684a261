//! The bouncing-ball reference model.
//!
//! A point mass falls under constant acceleration and bounces on a rigid
//! floor, losing energy through a restitution coefficient. Integration is
//! explicit forward Euler: velocity accumulates acceleration, then height
//! accumulates velocity, then the boundary rule fires if the height
//! crossed zero.

use lockstep_types::ValueReference;

use crate::{Model, ModelError};

/// State variables of the bouncing ball, addressed via the
/// value-reference table.
///
/// This is the typed accessor target a [`ValueReference`] resolves to;
/// resolution is fixed at construction time with no runtime name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable {
    Time,
    Height,
    Velocity,
    Acceleration,
    Restitution,
    MinVelocity,
}

/// Value-reference table for [`BouncingBall`].
///
/// Intentionally non-injective: velocity and acceleration are each exposed
/// under two reference numbers. The packaging pipeline's metadata document
/// must declare exactly these references.
const VALUE_REFERENCES: &[(u32, Variable)] = &[
    (0, Variable::Time),
    (1, Variable::Height),
    (2, Variable::Velocity),
    (3, Variable::Velocity),
    (4, Variable::Acceleration),
    (5, Variable::Acceleration),
    (6, Variable::Restitution),
    (7, Variable::MinVelocity),
];

/// Reference model: a ball bouncing on a rigid floor.
///
/// Default state: height 1.0, at rest, gravity -9.81, restitution -0.7.
/// The minimum-velocity parameter is exposed for controllers but takes no
/// part in the dynamics.
#[derive(Debug, Clone, PartialEq)]
pub struct BouncingBall {
    time: f64,
    height: f64,
    velocity: f64,
    acceleration: f64,
    restitution: f64,
    min_velocity: f64,
}

impl BouncingBall {
    /// Step interval the original service advanced by when the controller
    /// supplied none.
    pub const DEFAULT_STEP_SIZE: f64 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(reference: ValueReference) -> Result<Variable, ModelError> {
        VALUE_REFERENCES
            .iter()
            .find(|(raw, _)| *raw == reference.as_u32())
            .map(|(_, variable)| *variable)
            .ok_or(ModelError::UnresolvedValueReference(reference))
    }

    fn value_of(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Time => self.time,
            Variable::Height => self.height,
            Variable::Velocity => self.velocity,
            Variable::Acceleration => self.acceleration,
            Variable::Restitution => self.restitution,
            Variable::MinVelocity => self.min_velocity,
        }
    }

    fn assign(&mut self, variable: Variable, value: f64) {
        match variable {
            Variable::Time => self.time = value,
            Variable::Height => self.height = value,
            Variable::Velocity => self.velocity = value,
            Variable::Acceleration => self.acceleration = value,
            Variable::Restitution => self.restitution = value,
            Variable::MinVelocity => self.min_velocity = value,
        }
    }
}

impl Default for BouncingBall {
    fn default() -> Self {
        Self {
            time: 0.0,
            height: 1.0,
            velocity: 0.0,
            acceleration: -9.81,
            restitution: -0.7,
            min_velocity: 0.1,
        }
    }
}

impl Model for BouncingBall {
    fn step(&mut self, dt: f64) {
        self.velocity += self.acceleration * dt;
        self.height -= self.velocity * dt;

        // Boundary rule: reflect the height and invert-and-damp the
        // velocity once the floor is crossed.
        if self.height <= 0.0 {
            self.height = -self.height;
            self.velocity = -self.velocity * self.restitution;
        }

        self.time += dt;
    }

    fn read(&self, references: &[ValueReference]) -> Result<Vec<f64>, ModelError> {
        references
            .iter()
            .map(|&reference| Self::resolve(reference).map(|variable| self.value_of(variable)))
            .collect()
    }

    fn write(&mut self, references: &[ValueReference], values: &[f64]) -> Result<(), ModelError> {
        if references.len() != values.len() {
            return Err(ModelError::ValueCountMismatch {
                references: references.len(),
                values: values.len(),
            });
        }

        // Resolve everything before assigning anything so a bad reference
        // leaves the model untouched.
        let variables = references
            .iter()
            .map(|&reference| Self::resolve(reference))
            .collect::<Result<Vec<_>, _>>()?;

        for (variable, &value) in variables.iter().zip(values) {
            self.assign(*variable, value);
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Tests
// ============================================================================
