//! The component tree.
//!
//! Components live in an [`Assembly`] arena and refer to each other by
//! [`ComponentId`]. A component may carry a primitive [`Shape`], children,
//! boolean compositions over other components, a color, and a list of
//! direct transformations. Its effective transformations are its own
//! followed by those of each ancestor, nearest first, so moving a parent
//! moves every descendant.

use std::collections::{HashMap, HashSet};

use anchorcad_ir::{BooleanOp, Body, Rgba};
use slotmap::{new_key_type, SlotMap};

use crate::affine::Historical;
use crate::connector::Connector;
use crate::error::{ComponentError, Result};
use crate::shape::{Anchor, Shape};
use crate::transform::AffineTransformation;

new_key_type! {
    /// Handle of a component inside an [`Assembly`].
    pub struct ComponentId;
}

/// A boolean operator and its ordered operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// The boolean operator.
    pub operator: BooleanOp,
    /// Operands, in application order.
    pub operands: Vec<ComponentId>,
}

/// One node of the tree.
#[derive(Debug, Clone, Default)]
pub struct Component {
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    direct_transformations: Vec<AffineTransformation>,
    compositions: Vec<Composition>,
    shape: Option<Shape>,
    color: Option<Rgba>,
}

impl Component {
    /// The parent, if any.
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    /// Children, in insertion order.
    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    /// Transformations applied to this component itself.
    pub fn direct_transformations(&self) -> &[AffineTransformation] {
        &self.direct_transformations
    }

    /// Compositions, in insertion order.
    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    /// The primitive shape, if any.
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// The color, if any.
    pub fn color(&self) -> Option<Rgba> {
        self.color
    }
}

/// Builder for [`Assembly::create`].
#[derive(Debug, Clone, Default)]
pub struct NewComponent {
    shape: Option<Shape>,
    color: Option<Rgba>,
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    compositions: Vec<Composition>,
}

impl NewComponent {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the component a shape.
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Give the component a color.
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Make the component a child of `parent`.
    pub fn parent(mut self, parent: ComponentId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Adopt `children`.
    pub fn children(mut self, children: impl IntoIterator<Item = ComponentId>) -> Self {
        self.children.extend(children);
        self
    }

    /// Add a composition. Operands are not adopted.
    pub fn composition(
        mut self,
        operator: BooleanOp,
        operands: impl IntoIterator<Item = ComponentId>,
    ) -> Self {
        self.compositions.push(Composition {
            operator,
            operands: operands.into_iter().collect(),
        });
        self
    }
}

/// Options for [`Assembly::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Compose isolated copies of the operands (and of the receiver, when
    /// not in place) instead of the originals.
    pub copy: bool,
    /// Record the composition on the receiver; otherwise a new component is
    /// created with the receiver as the last operand.
    pub inplace: bool,
    /// Adopt every operand not already a child of the resulting component.
    pub make_children: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            copy: false,
            inplace: true,
            make_children: true,
        }
    }
}

/// An arena of components.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    components: SlotMap<ComponentId, Component>,
}

impl Assembly {
    /// An empty assembly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if there are no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// True if `id` belongs to this assembly.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// The component behind `id`.
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    fn node(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id)
            .ok_or(ComponentError::UnknownComponent(id))
    }

    fn node_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.components
            .get_mut(id)
            .ok_or(ComponentError::UnknownComponent(id))
    }

    /// A read-only view of one component.
    pub fn component(&self, id: ComponentId) -> Result<ComponentRef<'_>> {
        self.node(id)?;
        Ok(ComponentRef { assembly: self, id })
    }

    // =========================================================================
    // Construction and parentage
    // =========================================================================

    /// Create a component.
    ///
    /// All referenced ids are validated before anything is inserted, so a
    /// failed call leaves the assembly unchanged.
    pub fn create(&mut self, new: NewComponent) -> Result<ComponentId> {
        for &child in &new.children {
            self.ensure_adoptable(None, child)?;
        }
        if let Some(parent) = new.parent {
            self.node(parent)?;
            // The new component would sit between `child` and its own descendant
            for &child in &new.children {
                if parent == child || self.parents(parent).any(|ancestor| ancestor == child) {
                    return Err(ComponentError::CyclicParent { child, parent });
                }
            }
        }
        for composition in &new.compositions {
            for &operand in &composition.operands {
                self.node(operand)?;
            }
        }
        if let Some(parent) = new.parent {
            let operands = new.compositions.iter().flat_map(|c| c.operands.iter());
            for &operand in new.children.iter().chain(operands) {
                if self.depends_on(operand, parent) {
                    return Err(ComponentError::CyclicComposition {
                        component: parent,
                        operand,
                    });
                }
            }
        }

        let id = self.components.insert(Component {
            shape: new.shape,
            color: new.color,
            compositions: new.compositions,
            ..Component::default()
        });
        if let Some(parent) = new.parent {
            self.link(parent, id);
        }
        for child in new.children {
            self.link(id, child);
        }
        Ok(id)
    }

    /// Create a parentless component with a shape.
    pub fn add(&mut self, shape: Shape) -> ComponentId {
        self.components.insert(Component {
            shape: Some(shape),
            ..Component::default()
        })
    }

    /// Create an empty, parentless container.
    pub fn container(&mut self) -> ComponentId {
        self.components.insert(Component::default())
    }

    /// Check that `child` may be adopted by `parent` (or by a brand-new
    /// component when `parent` is `None`).
    fn ensure_adoptable(&self, parent: Option<ComponentId>, child: ComponentId) -> Result<()> {
        let current = self.node(child)?.parent;
        let Some(parent) = parent else {
            return match current {
                Some(current) => Err(ComponentError::Reparent { child, current }),
                None => Ok(()),
            };
        };

        self.node(parent)?;
        if let Some(current) = current {
            if current != parent {
                log::debug!("refusing to move {child:?} from {current:?} to {parent:?}");
                return Err(ComponentError::Reparent { child, current });
            }
        }
        if parent == child || self.parents(parent).any(|ancestor| ancestor == child) {
            return Err(ComponentError::CyclicParent { child, parent });
        }
        if self.depends_on(child, parent) {
            return Err(ComponentError::CyclicComposition {
                component: parent,
                operand: child,
            });
        }
        Ok(())
    }

    /// True if `target` is `from` or is reachable from it through children
    /// and composition operands.
    fn depends_on(&self, from: ComponentId, target: ComponentId) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![from];
        while let Some(id) = pending.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.components.get(id) {
                pending.extend(node.children.iter().copied());
                pending.extend(
                    node.compositions
                        .iter()
                        .flat_map(|composition| composition.operands.iter().copied()),
                );
            }
        }
        false
    }

    /// Record parentage on both sides. Callers validate first.
    fn link(&mut self, parent: ComponentId, child: ComponentId) {
        if let Some(node) = self.components.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.components.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    /// Make `child` a child of `parent`.
    ///
    /// Fails with [`ComponentError::Reparent`] if `child` already has a
    /// different parent. Re-adding an existing child is a no-op.
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<()> {
        self.ensure_adoptable(Some(parent), child)?;
        self.link(parent, child);
        Ok(())
    }

    /// Make every id in `children` a child of `parent`, in order.
    pub fn add_children(
        &mut self,
        parent: ComponentId,
        children: impl IntoIterator<Item = ComponentId>,
    ) -> Result<()> {
        children
            .into_iter()
            .try_for_each(|child| self.add_child(parent, child))
    }

    /// Assign `parent` to `child`; the same as [`Assembly::add_child`].
    pub fn set_parent(&mut self, child: ComponentId, parent: ComponentId) -> Result<()> {
        self.add_child(parent, child)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The parent of `id`, if any.
    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.components.get(id).and_then(|node| node.parent)
    }

    /// Ancestors of `id`, nearest first.
    pub fn parents(&self, id: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        std::iter::successors(self.parent(id), move |&ancestor| self.parent(ancestor))
    }

    /// Children of `id`, in insertion order.
    pub fn children(&self, id: ComponentId) -> Result<&[ComponentId]> {
        Ok(&self.node(id)?.children)
    }

    /// Compositions of `id`, in insertion order.
    pub fn compositions(&self, id: ComponentId) -> Result<&[Composition]> {
        Ok(&self.node(id)?.compositions)
    }

    /// Transformations applied to `id` itself.
    pub fn direct_transformations(&self, id: ComponentId) -> Result<&[AffineTransformation]> {
        Ok(&self.node(id)?.direct_transformations)
    }

    /// The effective transformation sequence of `id`, first-applied first.
    pub fn transformations(&self, id: ComponentId) -> Result<Transformations<'_>> {
        Ok(Transformations::new(self, self.node(id)?))
    }

    /// The shape of `id`, if any.
    pub fn shape(&self, id: ComponentId) -> Result<Option<&Shape>> {
        Ok(self.node(id)?.shape.as_ref())
    }

    /// The color of `id`, if any.
    pub fn color(&self, id: ComponentId) -> Result<Option<Rgba>> {
        Ok(self.node(id)?.color)
    }

    /// Set or clear the color of `id`.
    pub fn set_color(&mut self, id: ComponentId, color: Option<Rgba>) -> Result<()> {
        self.node_mut(id)?.color = color;
        Ok(())
    }

    /// Every operand of every composition of `id`, in order, with repeats.
    pub fn composed_components(&self, id: ComponentId) -> Result<Vec<ComponentId>> {
        Ok(self
            .node(id)?
            .compositions
            .iter()
            .flat_map(|composition| composition.operands.iter().copied())
            .collect())
    }

    /// Children of `id` that are not operands of any of its compositions.
    pub fn uncomposed_children(&self, id: ComponentId) -> Result<Vec<ComponentId>> {
        let composed = self.composed_components(id)?;
        Ok(self
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|child| !composed.contains(child))
            .collect())
    }

    /// The connector for `anchor` on the shape of `id`, moved through the
    /// effective transformations of `id`.
    pub fn anchor(&self, id: ComponentId, anchor: Anchor) -> Result<Connector> {
        let untransformed = match self.node(id)?.shape.as_ref() {
            Some(shape) => shape.anchor(anchor)?,
            None => None,
        };
        let untransformed = untransformed.ok_or(ComponentError::MissingAnchor {
            component: id,
            anchor,
        })?;
        Ok(self.component(id)?.transformed(untransformed)?)
    }

    // =========================================================================
    // Transformation and composition
    // =========================================================================

    /// Append transformations to the direct list of `id`.
    pub fn transform(
        &mut self,
        id: ComponentId,
        transformations: impl IntoIterator<Item = AffineTransformation>,
    ) -> Result<()> {
        self.node_mut(id)?
            .direct_transformations
            .extend(transformations);
        Ok(())
    }

    /// Append one transformation to the direct list of `id`.
    pub fn transform_one(&mut self, id: ComponentId, transformation: AffineTransformation) -> Result<()> {
        self.transform(id, std::iter::once(transformation))
    }

    /// Combine `id` with `operands` under `operator`.
    ///
    /// In place, the composition is recorded on `id` and `id` is returned.
    /// Otherwise a new component is returned whose single composition lists
    /// the operands followed by `id`. See [`ComposeOptions`].
    pub fn compose(
        &mut self,
        id: ComponentId,
        operator: BooleanOp,
        operands: impl IntoIterator<Item = ComponentId>,
        options: ComposeOptions,
    ) -> Result<ComponentId> {
        self.node(id)?;
        let mut operands: Vec<ComponentId> = operands.into_iter().collect();
        for &operand in &operands {
            self.node(operand)?;
        }

        if options.copy {
            operands = operands
                .into_iter()
                .map(|operand| self.copy(operand, true))
                .collect::<Result<_>>()?;
        }

        let target = if options.inplace {
            let cyclic = operands.iter().copied().find(|&operand| self.depends_on(operand, id));
            if let Some(operand) = cyclic {
                log::debug!("refusing to compose {id:?} with {operand:?}, which depends on it");
                return Err(ComponentError::CyclicComposition {
                    component: id,
                    operand,
                });
            }
            if options.make_children {
                for &operand in &operands {
                    self.ensure_adoptable(Some(id), operand)?;
                }
            }
            self.node_mut(id)?.compositions.push(Composition {
                operator,
                operands: operands.clone(),
            });
            id
        } else {
            let receiver = if options.copy { self.copy(id, true)? } else { id };
            operands.push(receiver);
            if options.make_children {
                for &operand in &operands {
                    self.ensure_adoptable(None, operand)?;
                }
            }
            self.components.insert(Component {
                compositions: vec![Composition {
                    operator,
                    operands: operands.clone(),
                }],
                ..Component::default()
            })
        };
        log::debug!("{operator:?} of {operands:?} recorded on {target:?}");

        if options.make_children {
            for operand in operands {
                self.link(target, operand);
            }
        }
        Ok(target)
    }

    /// In-place union with default options.
    pub fn union(
        &mut self,
        id: ComponentId,
        operands: impl IntoIterator<Item = ComponentId>,
    ) -> Result<ComponentId> {
        self.compose(id, BooleanOp::Union, operands, ComposeOptions::default())
    }

    /// In-place difference with default options.
    pub fn difference(
        &mut self,
        id: ComponentId,
        operands: impl IntoIterator<Item = ComponentId>,
    ) -> Result<ComponentId> {
        self.compose(id, BooleanOp::Difference, operands, ComposeOptions::default())
    }

    /// In-place intersection with default options.
    pub fn intersection(
        &mut self,
        id: ComponentId,
        operands: impl IntoIterator<Item = ComponentId>,
    ) -> Result<ComponentId> {
        self.compose(id, BooleanOp::Intersection, operands, ComposeOptions::default())
    }

    // =========================================================================
    // Body, copy and equality
    // =========================================================================

    /// The body expression of `id`.
    ///
    /// The shape (wrapped in the effective transformations) and the bodies
    /// of the uncomposed children form the base; with any children present
    /// the base is their union. Compositions then fold onto the base in
    /// order, the first one seeding the body when there is no base. The
    /// color wraps the result.
    pub fn body(&self, id: ComponentId) -> Result<Body> {
        let node = self.node(id)?;

        let mut parts = Vec::new();
        if let Some(shape) = &node.shape {
            parts.push(self.component(id)?.wrapped(Body::primitive(shape.primitive())));
        }
        let uncomposed = self.uncomposed_children(id)?;
        let base = if uncomposed.is_empty() {
            parts.pop()
        } else {
            for child in uncomposed {
                parts.push(self.body(child)?);
            }
            Some(Body::composition(BooleanOp::Union, parts))
        };

        let mut compositions = node.compositions.iter();
        let mut body = match base {
            Some(base) => base,
            None => {
                let first = compositions
                    .next()
                    .ok_or(ComponentError::Disembodied(id))?;
                Body::composition(first.operator, self.bodies(&first.operands)?)
            }
        };
        for composition in compositions {
            let mut operands = vec![body];
            operands.extend(self.bodies(&composition.operands)?);
            body = Body::composition(composition.operator, operands);
        }

        Ok(match node.color {
            Some(color) => body.colored(color),
            None => body,
        })
    }

    fn bodies(&self, ids: &[ComponentId]) -> Result<Vec<Body>> {
        ids.iter().map(|&id| self.body(id)).collect()
    }

    /// Copy `id` and everything it owns.
    ///
    /// The copy gets the same shape, color and direct transformations.
    /// Each child is copied once, isolated, and that one copy serves both as
    /// the new child and in place of the original in every composition.
    /// Composition operands that are not children are shared, or copied in
    /// isolation when `isolate` is set. A non-isolated copy joins the
    /// original's parent, so it inherits the same transformations.
    pub fn copy(&mut self, id: ComponentId, isolate: bool) -> Result<ComponentId> {
        let original = self.node(id)?.clone();
        let copy = self.components.insert(Component {
            shape: original.shape,
            color: original.color,
            direct_transformations: original.direct_transformations.clone(),
            ..Component::default()
        });
        if !isolate {
            if let Some(parent) = original.parent {
                self.link(parent, copy);
            }
        }

        let mut copied_children = HashMap::new();
        for &child in &original.children {
            let child_copy = self.copy(child, true)?;
            copied_children.insert(child, child_copy);
            self.link(copy, child_copy);
        }

        for composition in &original.compositions {
            let mut operands = Vec::with_capacity(composition.operands.len());
            for &operand in &composition.operands {
                operands.push(match copied_children.get(&operand) {
                    Some(&child_copy) => child_copy,
                    None if isolate => self.copy(operand, true)?,
                    None => operand,
                });
            }
            self.node_mut(copy)?.compositions.push(Composition {
                operator: composition.operator,
                operands,
            });
        }

        log::debug!("copied {id:?} to {copy:?} (isolated: {isolate})");
        Ok(copy)
    }

    /// Structural equality of two components.
    ///
    /// Compares shapes, effective transformations (ordered, length
    /// sensitive), children (unordered) and compositions (unordered, each
    /// with unordered operands). Parentage and color are not compared.
    pub fn structurally_eq(&self, a: ComponentId, b: ComponentId) -> bool {
        if a == b {
            return self.contains(a);
        }
        let (Some(left), Some(right)) = (self.components.get(a), self.components.get(b)) else {
            return false;
        };

        left.shape == right.shape
            && Transformations::new(self, left).eq(Transformations::new(self, right))
            && same_multiset(&left.children, &right.children, |x, y| {
                self.structurally_eq(*x, *y)
            })
            && same_multiset(&left.compositions, &right.compositions, |x, y| {
                x.operator == y.operator
                    && same_multiset(&x.operands, &y.operands, |p, q| self.structurally_eq(*p, *q))
            })
    }
}

/// True when every element of `left` pairs off with a distinct equal
/// element of `right`.
fn same_multiset<T>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|l| {
        match (0..right.len()).find(|&i| !used[i] && eq(l, &right[i])) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Lazy iterator over a component's effective transformations.
#[derive(Debug, Clone)]
pub struct Transformations<'a> {
    assembly: &'a Assembly,
    node: Option<&'a Component>,
    index: usize,
}

impl<'a> Transformations<'a> {
    fn new(assembly: &'a Assembly, node: &'a Component) -> Self {
        Self {
            assembly,
            node: Some(node),
            index: 0,
        }
    }
}

impl<'a> Iterator for Transformations<'a> {
    type Item = &'a AffineTransformation;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.node?;
            if let Some(t) = node.direct_transformations.get(self.index) {
                self.index += 1;
                return Some(t);
            }
            self.node = node.parent.and_then(|p| self.assembly.components.get(p));
            self.index = 0;
        }
    }
}

/// A component together with the assembly it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRef<'a> {
    assembly: &'a Assembly,
    id: ComponentId,
}

impl<'a> ComponentRef<'a> {
    /// The component's id.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The component's node data.
    pub fn get(&self) -> Option<&'a Component> {
        self.assembly.get(self.id)
    }
}

impl Historical for ComponentRef<'_> {
    type Transformations<'b> = Transformations<'b> where Self: 'b;

    fn transformations(&self) -> Self::Transformations<'_> {
        Transformations {
            assembly: self.assembly,
            node: self.assembly.get(self.id),
            index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorcad_ir::{Primitive, Transform};
    use anchorcad_math::{Vector, AXIS_X};

    fn cylinder(asm: &mut Assembly) -> ComponentId {
        asm.add(Shape::cylinder(15.0, 7.5, false))
    }

    fn ball(asm: &mut Assembly) -> ComponentId {
        asm.add(Shape::sphere(2.0))
    }

    fn v(x: f64, y: f64, z: f64) -> Vector {
        Vector::new(x, y, z).unwrap()
    }

    #[test]
    fn bare_component_is_disembodied() {
        let mut asm = Assembly::new();
        let empty = asm.container();
        assert_eq!(asm.body(empty), Err(ComponentError::Disembodied(empty)));
    }

    #[test]
    fn unknown_component() {
        let mut asm = Assembly::new();
        let id = asm.container();
        let other = Assembly::new();
        assert_eq!(other.body(id), Err(ComponentError::UnknownComponent(id)));
    }

    #[test]
    fn add_child_sets_parent() {
        let mut asm = Assembly::new();
        let parent = asm.container();
        let child = ball(&mut asm);
        asm.add_child(parent, child).unwrap();
        assert_eq!(asm.parent(child), Some(parent));
        assert_eq!(asm.children(parent).unwrap(), &[child]);

        // Repeating is a no-op
        asm.add_child(parent, child).unwrap();
        asm.set_parent(child, parent).unwrap();
        assert_eq!(asm.children(parent).unwrap().len(), 1);
    }

    #[test]
    fn reparent_fails_without_mutation() {
        let mut asm = Assembly::new();
        let first = asm.container();
        let second = asm.container();
        let child = ball(&mut asm);
        asm.add_child(first, child).unwrap();

        assert_eq!(
            asm.add_child(second, child),
            Err(ComponentError::Reparent {
                child,
                current: first
            })
        );
        assert_eq!(asm.parent(child), Some(first));
        assert!(asm.children(second).unwrap().is_empty());
    }

    #[test]
    fn cyclic_parent_is_rejected() {
        let mut asm = Assembly::new();
        let root = asm.container();
        let mid = asm.create(NewComponent::new().parent(root)).unwrap();
        let leaf = asm.create(NewComponent::new().parent(mid)).unwrap();

        assert_eq!(
            asm.add_child(leaf, root),
            Err(ComponentError::CyclicParent { child: root, parent: leaf })
        );
        assert!(matches!(
            asm.add_child(root, root),
            Err(ComponentError::CyclicParent { .. })
        ));
        assert_eq!(asm.parents(leaf).collect::<Vec<_>>(), vec![mid, root]);
    }

    #[test]
    fn create_validates_before_inserting() {
        let mut asm = Assembly::new();
        let owner = asm.container();
        let taken = asm.create(NewComponent::new().parent(owner)).unwrap();
        let before = asm.len();

        let err = asm.create(NewComponent::new().children([taken])).unwrap_err();
        assert_eq!(err, ComponentError::Reparent { child: taken, current: owner });
        assert_eq!(asm.len(), before);
    }

    #[test]
    fn effective_transformations_own_first() {
        let mut asm = Assembly::new();
        let root = asm.container();
        let child = asm.create(NewComponent::new().parent(root)).unwrap();
        asm.transform_one(root, AffineTransformation::up(1.0).unwrap()).unwrap();
        asm.transform_one(child, AffineTransformation::rotate_z(90.0)).unwrap();
        asm.transform_one(child, AffineTransformation::right(2.0).unwrap()).unwrap();

        let effective: Vec<_> = asm.transformations(child).unwrap().copied().collect();
        assert_eq!(
            effective,
            vec![
                AffineTransformation::rotate_z(90.0),
                AffineTransformation::right(2.0).unwrap(),
                AffineTransformation::up(1.0).unwrap(),
            ]
        );
        assert_eq!(asm.transformations(child).unwrap().count(), 3);
        assert_eq!(asm.direct_transformations(child).unwrap().len(), 2);
    }

    #[test]
    fn shape_body_wraps_transformations() {
        let mut asm = Assembly::new();
        let cyl = cylinder(&mut asm);
        let lift = AffineTransformation::up(1.0).unwrap();
        asm.transform(cyl, [lift, AffineTransformation::rotate_z(45.0)])
            .unwrap();

        match asm.body(cyl).unwrap() {
            Body::Transform {
                transform: Transform::Rotate { .. },
                child,
            } => match *child {
                Body::Transform {
                    transform: Transform::Translate { .. },
                    child,
                } => assert!(matches!(*child, Body::Primitive { .. })),
                other => panic!("expected Translate, got {other:?}"),
            },
            other => panic!("expected Rotate, got {other:?}"),
        }
    }

    #[test]
    fn container_body_is_union_of_children() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let group = asm.create(NewComponent::new().children([a, b])).unwrap();

        let expected = Body::composition(
            BooleanOp::Union,
            vec![asm.body(a).unwrap(), asm.body(b).unwrap()],
        );
        assert_eq!(asm.body(group).unwrap(), expected);

        // A single child still yields a union
        let lone = ball(&mut asm);
        let single = asm.create(NewComponent::new().children([lone])).unwrap();
        match asm.body(single).unwrap() {
            Body::Composition { operator, operands } => {
                assert_eq!(operator, BooleanOp::Union);
                assert_eq!(operands.len(), 1);
            }
            other => panic!("expected Composition, got {other:?}"),
        }
    }

    #[test]
    fn shape_with_children_unions_both() {
        let mut asm = Assembly::new();
        let base = cylinder(&mut asm);
        let extra = ball(&mut asm);
        asm.add_child(base, extra).unwrap();

        match asm.body(base).unwrap() {
            Body::Composition { operator, operands } => {
                assert_eq!(operator, BooleanOp::Union);
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    &operands[0],
                    Body::Primitive { primitive: Primitive::Frustum { .. } }
                ));
            }
            other => panic!("expected Composition, got {other:?}"),
        }
    }

    #[test]
    fn difference_order_matters() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let ab = asm
            .create(NewComponent::new().composition(BooleanOp::Difference, [a, b]))
            .unwrap();
        let ba = asm
            .create(NewComponent::new().composition(BooleanOp::Difference, [b, a]))
            .unwrap();

        assert_ne!(asm.body(ab).unwrap(), asm.body(ba).unwrap());
        assert_eq!(
            asm.body(ab).unwrap(),
            Body::composition(
                BooleanOp::Difference,
                vec![asm.body(a).unwrap(), asm.body(b).unwrap()]
            )
        );
        // Structural equality ignores operand order
        assert!(asm.structurally_eq(ab, ba));
    }

    #[test]
    fn compositions_fold_onto_base() {
        let mut asm = Assembly::new();
        let block = cylinder(&mut asm);
        let hole = ball(&mut asm);
        let knob = ball(&mut asm);
        asm.difference(block, [hole]).unwrap();
        asm.union(block, [knob]).unwrap();

        // Every operand became a child, so the base is just the shape.
        assert!(asm.uncomposed_children(block).unwrap().is_empty());
        let shape = asm.component(block).unwrap().wrapped(Body::primitive(
            Shape::cylinder(15.0, 7.5, false).primitive(),
        ));
        let expected = Body::composition(
            BooleanOp::Union,
            vec![
                Body::composition(BooleanOp::Difference, vec![shape, asm.body(hole).unwrap()]),
                asm.body(knob).unwrap(),
            ],
        );
        assert_eq!(asm.body(block).unwrap(), expected);
    }

    #[test]
    fn first_composition_seeds_container() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let holder = asm.container();
        asm.intersection(holder, [a, b]).unwrap();

        assert_eq!(
            asm.body(holder).unwrap(),
            Body::composition(
                BooleanOp::Intersection,
                vec![asm.body(a).unwrap(), asm.body(b).unwrap()]
            )
        );
    }

    #[test]
    fn color_wraps_body() {
        let mut asm = Assembly::new();
        let red = Rgba::rgb(1.0, 0.0, 0.0);
        let a = asm
            .create(NewComponent::new().shape(Shape::sphere(1.0)).color(red))
            .unwrap();
        match asm.body(a).unwrap() {
            Body::Color { rgba, child } => {
                assert_eq!(rgba, red);
                assert!(matches!(*child, Body::Primitive { .. }));
            }
            other => panic!("expected Color, got {other:?}"),
        }
        asm.set_color(a, None).unwrap();
        assert!(matches!(asm.body(a).unwrap(), Body::Primitive { .. }));
    }

    #[test]
    fn compose_not_inplace_creates_new_component() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let options = ComposeOptions {
            inplace: false,
            ..ComposeOptions::default()
        };
        let result = asm.compose(a, BooleanOp::Difference, [b], options).unwrap();

        assert_ne!(result, a);
        assert_eq!(
            asm.compositions(result).unwrap(),
            &[Composition {
                operator: BooleanOp::Difference,
                operands: vec![b, a]
            }]
        );
        assert_eq!(asm.parent(a), Some(result));
        assert_eq!(asm.parent(b), Some(result));
        assert!(asm.compositions(a).unwrap().is_empty());
    }

    #[test]
    fn compose_with_copies_leaves_originals_alone() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let options = ComposeOptions {
            copy: true,
            inplace: false,
            make_children: true,
        };
        let result = asm.compose(a, BooleanOp::Union, [b], options).unwrap();

        let operands = asm.compositions(result).unwrap()[0].operands.clone();
        assert_eq!(operands.len(), 2);
        assert!(!operands.contains(&a) && !operands.contains(&b));
        assert_eq!(asm.parent(a), None);
        assert_eq!(asm.parent(b), None);
        assert!(asm.structurally_eq(operands[0], b));
        assert!(asm.structurally_eq(operands[1], a));
    }

    #[test]
    fn compose_without_adoption() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = ball(&mut asm);
        let options = ComposeOptions {
            make_children: false,
            ..ComposeOptions::default()
        };
        asm.compose(a, BooleanOp::Difference, [b], options).unwrap();
        assert_eq!(asm.parent(b), None);
        assert_eq!(asm.composed_components(a).unwrap(), vec![b]);
    }

    #[test]
    fn compose_rejects_owned_operand_before_mutating() {
        let mut asm = Assembly::new();
        let owner = asm.container();
        let a = cylinder(&mut asm);
        let b = asm
            .create(NewComponent::new().shape(Shape::sphere(1.0)).parent(owner))
            .unwrap();

        assert!(matches!(
            asm.difference(a, [b]),
            Err(ComponentError::Reparent { .. })
        ));
        assert!(asm.compositions(a).unwrap().is_empty());
    }

    #[test]
    fn compose_with_itself_is_rejected() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let keep_children = ComposeOptions {
            make_children: false,
            ..ComposeOptions::default()
        };

        assert_eq!(
            asm.compose(a, BooleanOp::Difference, [a], keep_children),
            Err(ComponentError::CyclicComposition { component: a, operand: a })
        );
        assert!(asm.compositions(a).unwrap().is_empty());
        assert!(matches!(asm.body(a).unwrap(), Body::Primitive { .. }));
    }

    #[test]
    fn compose_with_ancestor_is_rejected() {
        let mut asm = Assembly::new();
        let root = asm.container();
        let mid = asm.create(NewComponent::new().parent(root)).unwrap();
        let leaf = asm
            .create(NewComponent::new().shape(Shape::sphere(1.0)).parent(mid))
            .unwrap();

        for make_children in [false, true] {
            let options = ComposeOptions {
                make_children,
                ..ComposeOptions::default()
            };
            assert_eq!(
                asm.compose(leaf, BooleanOp::Union, [root], options),
                Err(ComponentError::CyclicComposition { component: leaf, operand: root })
            );
        }
        assert!(asm.compositions(leaf).unwrap().is_empty());
        assert_eq!(asm.body(root).unwrap().primitive_count(), 1);
    }

    #[test]
    fn indirect_composition_cycle_is_rejected() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let b = asm.add(Shape::sphere(2.0));
        let c = asm.add(Shape::cone(2.0, 1.0, false));
        let keep_children = ComposeOptions {
            make_children: false,
            ..ComposeOptions::default()
        };
        asm.compose(b, BooleanOp::Union, [a], keep_children).unwrap();
        asm.compose(c, BooleanOp::Union, [b], keep_children).unwrap();

        assert_eq!(
            asm.compose(a, BooleanOp::Intersection, [c], keep_children),
            Err(ComponentError::CyclicComposition { component: a, operand: c })
        );
        // Adopting a component that already uses the parent closes a loop too
        assert_eq!(
            asm.add_child(a, c),
            Err(ComponentError::CyclicComposition { component: a, operand: c })
        );
        assert_eq!(asm.parent(c), None);
        assert_eq!(asm.body(c).unwrap().primitive_count(), 3);
        let copy = asm.copy(c, true).unwrap();
        assert!(asm.structurally_eq(c, copy));
    }

    #[test]
    fn create_rejects_operand_using_parent() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let before = asm.len();

        assert_eq!(
            asm.create(
                NewComponent::new()
                    .parent(a)
                    .composition(BooleanOp::Difference, [a])
            ),
            Err(ComponentError::CyclicComposition { component: a, operand: a })
        );

        let user = asm.container();
        asm.compose(
            user,
            BooleanOp::Union,
            [a],
            ComposeOptions {
                make_children: false,
                ..ComposeOptions::default()
            },
        )
        .unwrap();
        assert!(matches!(
            asm.create(NewComponent::new().parent(a).children([user])),
            Err(ComponentError::CyclicComposition { .. })
        ));
        assert_eq!(asm.len(), before + 1);
    }

    #[test]
    fn anchor_replays_history() {
        let mut asm = Assembly::new();
        let root = asm.container();
        let cyl = asm
            .create(NewComponent::new().shape(Shape::cylinder(15.0, 7.5, false)).parent(root))
            .unwrap();
        asm.transform_one(root, AffineTransformation::rotate_about(90.0, AXIS_X))
            .unwrap();

        let top = asm.anchor(cyl, Anchor::Top).unwrap();
        assert_eq!(top.point, v(0.0, -7.5, 0.0));
        assert_eq!(top.axis, v(0.0, -1.0, 0.0));

        let empty = asm.container();
        assert_eq!(
            asm.anchor(empty, Anchor::Top),
            Err(ComponentError::MissingAnchor { component: empty, anchor: Anchor::Top })
        );
    }

    #[test]
    fn copy_is_equal() {
        let mut asm = Assembly::new();
        let root = asm.container();
        let a = asm
            .create(NewComponent::new().shape(Shape::cylinder(3.0, 4.0, true)).parent(root))
            .unwrap();
        asm.transform_one(root, AffineTransformation::rotate_euler([11.0, 12.0, 13.0]))
            .unwrap();
        asm.transform_one(a, AffineTransformation::up(2.0).unwrap()).unwrap();

        let copy = asm.copy(a, false).unwrap();
        assert_ne!(copy, a);
        assert_eq!(asm.parent(copy), Some(root));
        assert!(asm.structurally_eq(a, copy));
        assert_eq!(asm.body(a).unwrap(), asm.body(copy).unwrap());

        // Without the parent's rotation the isolated copy differs
        let isolated = asm.copy(a, true).unwrap();
        assert_eq!(asm.parent(isolated), None);
        assert!(!asm.structurally_eq(a, isolated));
    }

    #[test]
    fn copy_is_independent() {
        let mut asm = Assembly::new();
        let a = cylinder(&mut asm);
        let copy = asm.copy(a, false).unwrap();
        asm.transform_one(copy, AffineTransformation::up(1.0).unwrap()).unwrap();
        assert!(asm.direct_transformations(a).unwrap().is_empty());
        assert!(!asm.structurally_eq(a, copy));
    }

    #[test]
    fn copy_shares_child_copies_with_compositions() {
        let mut asm = Assembly::new();
        let block = cylinder(&mut asm);
        let hole = ball(&mut asm);
        let outside = ball(&mut asm);
        asm.difference(block, [hole]).unwrap();
        let options = ComposeOptions {
            make_children: false,
            ..ComposeOptions::default()
        };
        asm.compose(block, BooleanOp::Union, [outside], options).unwrap();

        let copy = asm.copy(block, false).unwrap();
        let children = asm.children(copy).unwrap().to_vec();
        let compositions = asm.compositions(copy).unwrap().to_vec();
        assert_eq!(children.len(), 1);
        assert_ne!(children[0], hole);
        assert_eq!(compositions[0].operands, children);
        assert_eq!(asm.parent(children[0]), Some(copy));
        // Non-child operands are shared by a plain copy...
        assert_eq!(compositions[1].operands, vec![outside]);
        assert!(asm.structurally_eq(block, copy));

        // ...and copied by an isolated one
        let isolated = asm.copy(block, true).unwrap();
        let operand = asm.compositions(isolated).unwrap()[1].operands[0];
        assert_ne!(operand, outside);
        assert!(asm.structurally_eq(operand, outside));
    }

    #[test]
    fn equality_ignores_child_order() {
        let mut asm = Assembly::new();
        let (a1, b1) = (cylinder(&mut asm), ball(&mut asm));
        let (a2, b2) = (cylinder(&mut asm), ball(&mut asm));
        let first = asm.create(NewComponent::new().children([a1, b1])).unwrap();
        let second = asm.create(NewComponent::new().children([b2, a2])).unwrap();
        assert!(asm.structurally_eq(first, second));

        let (a3, b3) = (cylinder(&mut asm), ball(&mut asm));
        let c3 = cylinder(&mut asm);
        let third = asm.create(NewComponent::new().children([a3, b3, c3])).unwrap();
        assert!(!asm.structurally_eq(first, third));
    }

    #[test]
    fn equality_compares_shapes() {
        let mut asm = Assembly::new();
        let a = asm.add(Shape::cylinder(2.0, 3.0, false));
        let b = asm.add(Shape::circular_frustum(2.0, 3.0, None, false));
        let c = asm.add(Shape::cylinder(2.0, 3.0, false));
        assert!(!asm.structurally_eq(a, b));
        assert!(asm.structurally_eq(a, c));
    }
}
