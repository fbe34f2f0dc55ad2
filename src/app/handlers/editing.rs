//! Handler für Erzeugen, Ändern und Löschen von Diagramm-Elementen.

use crate::app::AppState;
use crate::command::{Placement, ReplaceData, ReplaceHints};
use crate::core::{Bounds, Element, ElementId};
use crate::rules::{self, Allowed, RuleContext};
use glam::Vec2;
use serde_json::{Map, Value};

/// Legt ein Shape an und selektiert es.
///
/// Ohne `parent` landet das Shape beim Parent des Hosts bzw. im aktiven Root.
pub fn create_shape(
    state: &mut AppState,
    id: Option<ElementId>,
    element_type: &str,
    position: Vec2,
    size: Option<Vec2>,
    parent: Option<ElementId>,
    host: Option<ElementId>,
) -> anyhow::Result<()> {
    let mut shape = state.modeler.shape_template(element_type, size);
    if let Some(id) = id {
        shape.id = id;
    }

    let parent = match (parent, &host) {
        (Some(parent), _) => parent,
        (None, Some(host)) => state
            .modeler
            .element(host)?
            .parent
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Host '{}' hat keinen Parent", host))?,
        (None, None) => state.modeler.root()?,
    };

    let id = state.modeler.create_shape_with(
        shape,
        Placement::Center(position),
        &parent,
        host.as_ref(),
    )?;
    log::info!("Shape '{}' ({}) angelegt", id, element_type);

    state.selection.selected.clear();
    state.selection.selected.insert(id);
    Ok(())
}

/// Legt ein Label für `target` an; `text` landet in der Property `name`.
pub fn create_label(
    state: &mut AppState,
    target: &ElementId,
    position: Vec2,
    text: Option<String>,
) -> anyhow::Result<()> {
    let id = state.modeler.unique_id("label");
    let mut label = Element::label(id, "label", target.clone(), Bounds::default());
    if let Some(text) = text {
        label = label.with_property("name", text);
    }

    let id = state.modeler.create_label(target, position, Some(label))?;
    log::info!("Label '{}' für '{}' angelegt", id, target);
    Ok(())
}

/// Verbindet zwei Shapes, sofern die Regeln es erlauben.
pub fn create_connection(
    state: &mut AppState,
    id: Option<ElementId>,
    source: &ElementId,
    target: &ElementId,
    element_type: &str,
) -> anyhow::Result<()> {
    let verdict = state.modeler.allowed(
        rules::CONNECTION_CREATE,
        &RuleContext::ConnectionCreate { source, target },
    );
    if verdict == Allowed::No {
        log::warn!("Verbindung {} → {} nicht erlaubt", source, target);
        return Ok(());
    }

    let id = id.unwrap_or_else(|| state.modeler.unique_id("connection"));
    let template = Element::connection(id, element_type, source.clone(), target.clone(), Vec::new());
    let id = state.modeler.create_connection(source, target, template, None)?;
    log::info!("Verbindung '{}' angelegt: {} → {}", id, source, target);
    Ok(())
}

/// Setzt neue Bounds, sofern die Regeln es erlauben.
pub fn resize_shape(state: &mut AppState, shape: &ElementId, bounds: Bounds) -> anyhow::Result<()> {
    let verdict = state.modeler.allowed(
        rules::SHAPE_RESIZE,
        &RuleContext::ShapeResize {
            shape,
            new_bounds: bounds,
        },
    );
    if verdict == Allowed::No {
        log::warn!("Resize von '{}' nicht erlaubt", shape);
        return Ok(());
    }

    state.modeler.resize_shape(shape, bounds, None)?;
    Ok(())
}

/// Ersetzt ein Shape; die Selektion folgt dem neuen Shape.
///
/// Nur Attacher aus `retain_attachments` wandern zum neuen Shape, ohne
/// Whitelist werden alle gelöst.
pub fn replace_shape(
    state: &mut AppState,
    shape: &ElementId,
    element_type: String,
    retain_attachments: Option<Vec<ElementId>>,
) -> anyhow::Result<()> {
    let hints = ReplaceHints {
        retain_attachment_ids: retain_attachments.unwrap_or_default(),
        ..ReplaceHints::default()
    };

    let new_shape = state
        .modeler
        .replace_shape(shape, ReplaceData::new(element_type), hints)?;
    log::info!("Shape '{}' durch '{}' ersetzt", shape, new_shape);

    if state.selection.selected.shift_remove(shape) {
        state.selection.selected.insert(new_shape);
    }
    Ok(())
}

/// Heftet ein Shape an bzw. löst es.
pub fn update_attachment(
    state: &mut AppState,
    shape: &ElementId,
    host: Option<&ElementId>,
) -> anyhow::Result<()> {
    state.modeler.update_attachment(shape, host)?;
    match host {
        Some(host) => log::info!("'{}' an '{}' geheftet", shape, host),
        None => log::info!("'{}' gelöst", shape),
    }
    Ok(())
}

pub fn update_properties(
    state: &mut AppState,
    element: &ElementId,
    properties: Map<String, Value>,
) -> anyhow::Result<()> {
    state.modeler.update_properties(element, properties)?;
    Ok(())
}

/// Löscht Elemente samt abhängiger Elemente in einem Undo-Schritt.
pub fn delete_elements(state: &mut AppState, ids: &[ElementId]) -> anyhow::Result<()> {
    state.modeler.remove_elements(ids)?;
    state.prune_selection();
    log::info!("{} Element(e) gelöscht", ids.len());
    Ok(())
}
