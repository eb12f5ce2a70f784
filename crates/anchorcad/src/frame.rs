//! Reference frames: a visible rendering of a connector's orientation.
//!
//! A frame is a small sphere at the origin with three colored arrows along
//! X (red), Y (green) and Z (blue).

use anchorcad_ir::Rgba;
use anchorcad_math::{Vector, AXIS_X, AXIS_Y, AXIS_Z};

use crate::assembly::{Assembly, ComponentId, NewComponent};
use crate::connector::Connector;
use crate::error::Result;
use crate::shape::{Anchor, Shape};

const ORIGIN_DIAMETER: f64 = 1.0;
const SHAFT_DIAMETER: f64 = 0.2;
const SHAFT_LENGTH: f64 = 2.0;
const TIP_DIAMETER: f64 = 0.3;
const TIP_LENGTH: f64 = 0.3;

/// Build a reference frame in the world orientation, optionally under
/// `parent`.
///
/// The returned container has four children: the origin sphere, then the
/// X, Y and Z arms.
pub fn reference_frame(assembly: &mut Assembly, parent: Option<ComponentId>) -> Result<ComponentId> {
    let origin = assembly.add(Shape::sphere(ORIGIN_DIAMETER));
    let x_arm = arm(assembly, AXIS_X, Rgba::rgb(1.0, 0.0, 0.0))?;
    let y_arm = arm(assembly, AXIS_Y, Rgba::rgb(0.0, 1.0, 0.0))?;
    let z_arm = arm(assembly, AXIS_Z, Rgba::rgb(0.0, 0.0, 1.0))?;

    let mut frame = NewComponent::new().children([origin, x_arm, y_arm, z_arm]);
    if let Some(parent) = parent {
        frame = frame.parent(parent);
    }
    assembly.create(frame)
}

/// Build a reference frame carried from the world frame onto `connector`.
pub fn reference_frame_from_connector(
    assembly: &mut Assembly,
    connector: &Connector,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let frame = reference_frame(assembly, parent)?;
    let steps = Connector::default().align(Some(connector))?;
    assembly.transform(frame, steps)?;
    Ok(frame)
}

fn arm(assembly: &mut Assembly, axis: Vector, color: Rgba) -> Result<ComponentId> {
    let shaft = assembly.add(Shape::cylinder(SHAFT_DIAMETER, SHAFT_LENGTH, false));
    let tip = assembly.add(Shape::cone(TIP_DIAMETER, TIP_LENGTH, false));

    // Seat the tip on top of the shaft
    let seat = assembly.anchor(shaft, Anchor::Top)?;
    let steps = assembly.anchor(tip, Anchor::Bottom)?.align(Some(&seat))?;
    assembly.transform(tip, steps)?;

    let arm = assembly.create(NewComponent::new().children([shaft, tip]).color(color))?;

    let direction = Connector::from_components([0.0; 3], axis.components(), 0.0)?;
    let steps = assembly.anchor(shaft, Anchor::Bottom)?.align(Some(&direction))?;
    assembly.transform(arm, steps)?;
    Ok(arm)
}
