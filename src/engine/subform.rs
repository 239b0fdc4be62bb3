//! Sub-forms: composite fields rendered by a nested engine and lifted into the parent grid.
//!
//! A composite field contributes, in order:
//! - a separator
//! - a heading label carrying the field's display name
//! - every node the nested engine rendered, re-placed with the parent's cursor
//! - a closing separator
//!
//! The nested engine inherits the parent's configuration, toolkit and services and renders into a
//! staging container. Its nodes come back in insertion order and are regrouped: a label followed by
//! a control becomes a pair again, a separator stays a separator, and any other label becomes a
//! standalone heading.

use reflectgrid_core::MemberDescriptor;

use super::ReflectorGrid;
use super::target::{NestedTarget, ObjectIdentity, TargetHandle};
use crate::errors::BindError;
use crate::layout::{InsertionPosition, Layout};
use crate::toolkit::{GridContainer, Node};

impl ReflectorGrid {
    /// Render the composite `member` of `target` as a sub-form starting at `position`.
    pub(super) fn place_subform(
        &mut self,
        position: InsertionPosition,
        target: &TargetHandle,
        member: &MemberDescriptor,
        stack: &mut Vec<ObjectIdentity>,
    ) -> Result<InsertionPosition, BindError> {
        let nested_target = match target.nested(member.depth, member.name)? {
            NestedTarget::Handle(handle) => handle,
            NestedTarget::Null => {
                return Err(BindError::NullComposite {
                    type_name: member.declaring_type,
                    field: member.name,
                });
            }
        };
        if stack.contains(&nested_target.identity()?) {
            return Err(BindError::CyclicGraph {
                type_name: member.declaring_type,
                field: member.name,
            });
        }

        let mut nested = self.nested_engine(nested_target);
        nested.render(stack)?;

        let layout = self.config.layout.layout();
        let heading = self.factory().field_label(member);
        let grid = self.container.as_mut();
        let mut position = layout.place_separator(position, grid);
        position = layout.place_single(position, Node::label(heading, member.tooltip()), grid);
        position = lift(layout, position, nested.container.drain(), grid);
        position = layout.place_separator(position, grid);

        self.bindings.append(&mut nested.bindings);
        Ok(position)
    }
}

/// Re-place nodes drained from a nested grid, restoring label/control pairs.
pub(crate) fn lift(
    layout: &dyn Layout,
    mut position: InsertionPosition,
    nodes: Vec<Node>,
    grid: &mut dyn GridContainer,
) -> InsertionPosition {
    let mut pending: Option<Node> = None;
    for node in nodes {
        match node {
            Node::Control(_) => {
                position = match pending.take() {
                    Some(label) => layout.place_pair(position, label, node, grid),
                    None => layout.place_single(position, node, grid),
                };
            }
            Node::Label(_) => {
                if let Some(heading) = pending.replace(node) {
                    position = layout.place_single(position, heading, grid);
                }
            }
            Node::Separator => {
                if let Some(heading) = pending.take() {
                    position = layout.place_single(position, heading, grid);
                }
                position = layout.place_separator(position, grid);
            }
        }
    }
    if let Some(heading) = pending {
        position = layout.place_single(position, heading, grid);
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutStrategy;
    use crate::toolkit::Toolkit;
    use crate::toolkit::headless::{HeadlessGrid, HeadlessToolkit};

    fn drained(strategy: LayoutStrategy) -> Vec<Node> {
        let toolkit = HeadlessToolkit;
        let layout = strategy.layout();
        let mut grid = HeadlessGrid::default();
        let mut at = InsertionPosition::default();
        at = layout.place_pair(
            at,
            Node::label("Street", None),
            Node::Control(toolkit.single_line_text("Main")),
            &mut grid,
        );
        at = layout.place_separator(at, &mut grid);
        at = layout.place_single(at, Node::label("Geo", None), &mut grid);
        layout.place_pair(
            at,
            Node::label("Lat", None),
            Node::Control(toolkit.single_line_text("1")),
            &mut grid,
        );
        grid.drain()
    }

    #[test]
    fn test_lift_restores_pairs_under_stacked() {
        let mut grid = HeadlessGrid::default();
        let end = lift(
            LayoutStrategy::Stacked.layout(),
            InsertionPosition::new(4, 0),
            drained(LayoutStrategy::Stacked),
            &mut grid,
        );
        assert_eq!(end.row(), 4 + 2 + 1 + 1 + 2);
        assert_eq!(grid.structure(), ["label", "text", "separator", "label", "label", "text"]);
    }

    #[test]
    fn test_lift_into_a_different_strategy() {
        let mut grid = HeadlessGrid::default();
        let end = lift(
            LayoutStrategy::Paired.layout(),
            InsertionPosition::default(),
            drained(LayoutStrategy::Stacked),
            &mut grid,
        );
        assert_eq!(end.row(), 4);
        insta::assert_snapshot!(grid.render_text(), @r#"
        00:0 label "Street"
        00:1 text "Main"
        01:0+2 separator
        02:0 label "Geo"
        03:0 label "Lat"
        03:1 text "1"
        "#);
    }
}
