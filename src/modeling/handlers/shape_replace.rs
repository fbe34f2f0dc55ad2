use crate::command::*;
use crate::core::{Bounds, Element, ElementId};
use crate::error::ModelingError;
use crate::modeling::layout::{resized_source_anchor, resized_target_anchor};
use crate::modeling::Modeler;
use crate::rules::{self, Allowed, RuleContext};

/// Ersetzt ein Shape durch ein neues Element.
///
/// Das neue Shape entsteht im Pre-Execute am Mittelpunkt des alten, übernimmt
/// Host, Kinder und (soweit erlaubt) Verbindungen. Attacher behandelt das
/// Attach-Behavior. Das alte Shape wird im Post-Execute gelöscht.
pub struct ReplaceShapeHandler;

impl CommandHandler for ReplaceShapeHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_replace(SHAPE_REPLACE)?.clone();
        let old = modeler.canvas.element(&ctx.old_shape)?.clone();
        let Some(old_bounds) = old.bounds() else {
            return Err(ModelingError::UnexpectedKind {
                id: old.id.clone(),
                expected: "Shape",
            });
        };
        let parent = old.parent.clone().ok_or(ModelingError::MissingParent)?;

        let width = ctx.new_data.width.unwrap_or(old_bounds.width);
        let height = ctx.new_data.height.unwrap_or(old_bounds.height);
        let center = ctx.new_data.center.unwrap_or_else(|| old_bounds.center());
        let bounds = Bounds::from_center(center, width, height);

        let id = modeler.unique_id("shape");
        let mut template = Element::shape(id.clone(), ctx.new_data.element_type.clone(), bounds);
        template.properties = old.properties.clone();
        for (key, value) in &ctx.new_data.properties {
            template.properties.insert(key.clone(), value.clone());
        }

        let parent_index = modeler.canvas.index_in_parent(&ctx.old_shape);
        modeler.execute(
            SHAPE_CREATE,
            ShapeCreateContext {
                shape: template,
                position: Placement::Bounds(bounds),
                parent,
                parent_index,
                host: old.host().cloned(),
            },
        )?;

        if ctx.hints.move_children {
            let children: Vec<ElementId> = old
                .children
                .iter()
                .filter(|child| modeler.canvas.get(child).is_some_and(|c| !c.is_label()))
                .cloned()
                .collect();
            if !children.is_empty() {
                modeler.execute(
                    ELEMENTS_MOVE,
                    ElementsMoveContext {
                        shapes: children,
                        delta: glam::Vec2::ZERO,
                        new_parent: Some(id.clone()),
                        new_host: None,
                        hints: MoveHints {
                            attach: Some(false),
                            ..MoveHints::default()
                        },
                        closure: None,
                    },
                )?;
            }
        }

        let new_bounds = modeler.canvas.shape(&id)?.bounds;
        for connection in old.incoming().to_vec() {
            let data = modeler.canvas.connection(&connection)?;
            let source = data.source.clone();
            let verdict = modeler.allowed(
                rules::CONNECTION_RECONNECT,
                &RuleContext::ConnectionReconnect {
                    connection: &connection,
                    source: &source,
                    target: &id,
                },
            );
            if verdict == Allowed::No {
                continue;
            }
            let hints = LayoutHints {
                connection_end: Some(resized_target_anchor(data, &new_bounds, &old_bounds)),
                ..LayoutHints::default()
            };
            modeler.execute(
                CONNECTION_RECONNECT,
                ConnectionReconnectContext::new(connection, source, id.clone(), hints),
            )?;
        }
        for connection in old.outgoing().to_vec() {
            let data = modeler.canvas.connection(&connection)?;
            let target = data.target.clone();
            let verdict = modeler.allowed(
                rules::CONNECTION_RECONNECT,
                &RuleContext::ConnectionReconnect {
                    connection: &connection,
                    source: &id,
                    target: &target,
                },
            );
            if verdict == Allowed::No {
                continue;
            }
            let hints = LayoutHints {
                connection_start: Some(resized_source_anchor(data, &new_bounds, &old_bounds)),
                ..LayoutHints::default()
            };
            modeler.execute(
                CONNECTION_RECONNECT,
                ConnectionReconnectContext::new(connection, id.clone(), target, hints),
            )?;
        }

        let ctx = context.as_shape_replace_mut(SHAPE_REPLACE)?;
        ctx.new_shape = Some(id);
        ctx.old_bounds = Some(old_bounds);
        Ok(())
    }

    fn execute(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }

    fn post_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_replace(SHAPE_REPLACE)?;
        let old_shape = ctx.old_shape.clone();
        modeler.execute(SHAPE_DELETE, ShapeDeleteContext::new(old_shape))?;
        Ok(())
    }

    fn revert(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }
}
