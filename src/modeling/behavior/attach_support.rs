//! Host/Attacher-Pflege bei Move, Create, Resize, Replace und Delete.
//!
//! Invariante nach jedem Übergang:
//! `attacher.host == h` genau dann, wenn `h.attachers` den Attacher enthält.
//! Die Canvas-Primitive halten beide Seiten symmetrisch; dieses Behavior
//! entscheidet nur, wann angeheftet, gelöst oder mitbewegt wird.

use crate::command::*;
use crate::core::{get_new_attach_shape_delta, ElementId};
use crate::error::ModelingError;
use crate::modeling::handlers::remove_element;
use crate::modeling::Modeler;
use crate::rules::{self, Allowed, RuleContext};
use glam::Vec2;

#[derive(Debug, Default, Clone, Copy)]
pub struct AttachSupport;

impl CommandInterceptor for AttachSupport {
    fn intercept(
        &self,
        phase: Phase,
        command: &str,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        match (phase, command) {
            (Phase::PreExecuted, ELEMENTS_MOVE) => add_attachers_to_closure(modeler, context),
            (Phase::PostExecuted, ELEMENTS_MOVE) => update_attachments_after_move(modeler, context),
            (Phase::PostExecute, SHAPE_CREATE) => attach_created_shape(modeler, context),
            (Phase::PostExecute, SHAPE_RESIZE) => move_attachers_on_resize(modeler, context),
            (Phase::PreExecute, SHAPE_DELETE) => remove_attachers(modeler, context),
            (Phase::PostExecute, SHAPE_REPLACE) => replace_attachers(modeler, context),
            _ => Ok(()),
        }
    }
}

/// Attacher bewegter Shapes wandern mit; top-level genau dann, wenn der Host top-level ist.
fn add_attachers_to_closure(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_elements_move_mut(ELEMENTS_MOVE)?;
    let Some(closure) = ctx.closure.as_mut() else {
        return Ok(());
    };

    let mut index = 0;
    while let Some(shape) = closure.all_shapes.get_index(index).cloned() {
        index += 1;
        let Some(element) = modeler.canvas.get(&shape) else {
            continue;
        };
        let attachers: Vec<ElementId> = element
            .attachers()
            .iter()
            .filter(|attacher| !closure.all_shapes.contains(*attacher))
            .cloned()
            .collect();
        let is_top_level = closure.top_level.contains(&shape);
        for attacher in &attachers {
            closure.add(&modeler.canvas, attacher, is_top_level);
        }
    }
    Ok(())
}

/// Heftet nach dem Verschieben an `new_host` an bzw. löst vom alten Host.
fn update_attachments_after_move(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_elements_move(ELEMENTS_MOVE)?.clone();
    if ctx.hints.attach == Some(false) {
        return Ok(());
    }
    // Anheften nur für genau ein Shape
    if ctx.new_host.is_some() && ctx.shapes.len() != 1 {
        return Ok(());
    }
    let closure = ctx.closure.unwrap_or_default();

    let mut changed = Vec::new();
    for shape in &ctx.shapes {
        let Some(element) = modeler.canvas.get(shape) else {
            continue;
        };
        if !element.is_shape() || element.is_label() {
            continue;
        }
        let current = element.host().cloned();

        let new_host = match (&ctx.new_host, &current) {
            (Some(host), current) if current.as_ref() != Some(host) => Some(host.clone()),
            (None, Some(host)) if !closure.all_shapes.contains(host) => None,
            _ => continue,
        };
        modeler.execute(
            ATTACHMENT_UPDATE,
            AttachmentUpdateContext::new(shape.clone(), new_host),
        )?;
        changed.push(shape.clone());
    }

    for attacher in &changed {
        remove_disallowed_connections(modeler, attacher)?;
    }
    Ok(())
}

/// Entfernt Connections eines Attachers, deren Verbindung die Regeln nicht mehr erlauben.
fn remove_disallowed_connections(
    modeler: &mut Modeler,
    attacher: &ElementId,
) -> Result<(), ModelingError> {
    let connections: Vec<ElementId> = modeler.canvas.element(attacher)?.connections().cloned().collect();
    for connection in connections {
        let data = modeler.canvas.connection(&connection)?;
        let verdict = modeler.allowed(
            rules::CONNECTION_RECONNECT,
            &RuleContext::ConnectionReconnect {
                connection: &connection,
                source: &data.source,
                target: &data.target,
            },
        );
        if verdict == Allowed::No {
            log::debug!("Connection '{}' nach Host-Wechsel entfernt", connection);
            modeler.execute(CONNECTION_DELETE, ConnectionDeleteContext::new(connection))?;
        }
    }
    Ok(())
}

fn attach_created_shape(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_shape_create(SHAPE_CREATE)?;
    let Some(host) = ctx.host.clone() else {
        return Ok(());
    };
    let shape = ctx.shape.id.clone();
    if modeler.canvas.shape(&shape)?.host.as_ref() == Some(&host) {
        return Ok(());
    }
    modeler.execute(
        ATTACHMENT_UPDATE,
        AttachmentUpdateContext::new(shape, Some(host)),
    )?;
    Ok(())
}

/// Attacher behalten ihre relative Lage zum Host-Mittelpunkt.
fn move_attachers_on_resize(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_shape_resize(SHAPE_RESIZE)?;
    let Some(old_bounds) = ctx.old_bounds else {
        return Ok(());
    };
    if !ctx.hints.attach_support {
        return Ok(());
    }
    let new_bounds = ctx.new_bounds;
    let attachers = modeler.canvas.element(&ctx.shape)?.attachers().to_vec();

    for attacher in attachers {
        let bounds = modeler.canvas.shape(&attacher)?.bounds;
        let delta = get_new_attach_shape_delta(&bounds, &old_bounds, &new_bounds);
        if delta != Vec2::ZERO {
            modeler.execute(SHAPE_MOVE, ShapeMoveContext::new(attacher, delta))?;
        }
    }
    Ok(())
}

/// Attacher werden mit ihrem Host gelöscht; ein Attacher selbst wird vorher gelöst.
fn remove_attachers(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let shape = context.as_shape_delete(SHAPE_DELETE)?.shape.clone();
    let Some(element) = modeler.canvas.get(&shape) else {
        return Ok(());
    };
    let attachers = element.attachers().to_vec();
    let has_host = element.host().is_some();

    for attacher in &attachers {
        remove_element(modeler, attacher)?;
    }
    if has_host {
        modeler.execute(ATTACHMENT_UPDATE, AttachmentUpdateContext::new(shape, None))?;
    }
    Ok(())
}

/// Übernimmt die freigegebenen Attacher an das neue Shape, alle anderen werden gelöst.
fn replace_attachers(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_shape_replace(SHAPE_REPLACE)?.clone();
    let (Some(new_shape), Some(old_bounds)) = (ctx.new_shape, ctx.old_bounds) else {
        return Ok(());
    };
    let attachers = modeler.canvas.element(&ctx.old_shape)?.attachers().to_vec();
    let new_bounds = modeler.canvas.shape(&new_shape)?.bounds;

    for attacher in attachers {
        if !ctx.hints.retain_attachment_ids.contains(&attacher) {
            modeler.execute(
                ATTACHMENT_UPDATE,
                AttachmentUpdateContext::new(attacher, None),
            )?;
            continue;
        }

        modeler.execute(
            ATTACHMENT_UPDATE,
            AttachmentUpdateContext::new(attacher.clone(), Some(new_shape.clone())),
        )?;
        let bounds = modeler.canvas.shape(&attacher)?.bounds;
        let delta = get_new_attach_shape_delta(&bounds, &old_bounds, &new_bounds);
        if delta != Vec2::ZERO {
            modeler.execute(SHAPE_MOVE, ShapeMoveContext::new(attacher, delta))?;
        }
    }
    Ok(())
}
