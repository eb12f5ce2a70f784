//! OpenSCAD source export.
//!
//! Emits one statement per body node. Composition, transform and color
//! nodes open a block holding their children in order:
//!
//! ```text
//! difference() {
//!     cylinder(h = 7.5, d1 = 15, d2 = 15, center = false);
//!     translate(v = [0, 0, 1]) {
//!         sphere(d = 2);
//!     }
//! }
//! ```
//!
//! Nothing is written to disk and no `$fn` header is emitted.

use std::fmt::{self, Write};

use anchorcad_ir::{BooleanOp, Body, Primitive, Renderer, Rgba, RotationAngle, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Formatting options for [`ScadRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScadOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for ScadOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Renders a body expression as OpenSCAD source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScadRenderer {
    options: ScadOptions,
}

impl ScadRenderer {
    /// Create a renderer with the given options.
    pub fn new(options: ScadOptions) -> Self {
        Self { options }
    }

    fn write_body(&self, out: &mut String, body: &Body, depth: usize) -> fmt::Result {
        let pad = " ".repeat(depth * self.options.indent);
        match body {
            Body::Primitive { primitive } => {
                writeln!(out, "{pad}{};", primitive_call(primitive))
            }
            Body::Composition { operator, operands } => {
                let name = match operator {
                    BooleanOp::Union => "union",
                    BooleanOp::Difference => "difference",
                    BooleanOp::Intersection => "intersection",
                };
                writeln!(out, "{pad}{name}() {{")?;
                for operand in operands {
                    self.write_body(out, operand, depth + 1)?;
                }
                writeln!(out, "{pad}}}")
            }
            Body::Transform { transform, child } => {
                writeln!(out, "{pad}{} {{", transform_call(transform))?;
                self.write_body(out, child, depth + 1)?;
                writeln!(out, "{pad}}}")
            }
            Body::Color { rgba, child } => {
                let Rgba { r, g, b, a } = rgba;
                writeln!(out, "{pad}color(c = [{r}, {g}, {b}, {a}]) {{")?;
                self.write_body(out, child, depth + 1)?;
                writeln!(out, "{pad}}}")
            }
        }
    }
}

impl Renderer for ScadRenderer {
    type Output = String;
    type Error = fmt::Error;

    fn render(&self, body: &Body) -> Result<String, fmt::Error> {
        let mut out = String::new();
        self.write_body(&mut out, body, 0)?;
        Ok(out)
    }
}

fn vec3(v: &Vec3) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}

fn primitive_call(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Frustum {
            bottom_diameter,
            top_diameter,
            height,
            center,
            segments,
        } => {
            let segments = segments.map(|n| format!(", $fn = {n}")).unwrap_or_default();
            format!(
                "cylinder(h = {height}, d1 = {bottom_diameter}, d2 = {top_diameter}, center = {center}{segments})"
            )
        }
        Primitive::Sphere { diameter } => format!("sphere(d = {diameter})"),
    }
}

fn transform_call(transform: &Transform) -> String {
    match transform {
        Transform::Translate { offset } => format!("translate(v = {})", vec3(offset)),
        Transform::Rotate { angle, pole } => {
            let mut args = Vec::with_capacity(2);
            match angle {
                Some(RotationAngle::Single(a)) => args.push(format!("a = {a}")),
                Some(RotationAngle::Euler(angles)) => args.push(format!("a = {}", vec3(angles))),
                None => {}
            }
            if let Some(pole) = pole {
                args.push(format!("v = {}", vec3(pole)));
            }
            format!("rotate({})", args.join(", "))
        }
        Transform::Scale { factor } => format!("scale(v = {})", vec3(factor)),
    }
}
