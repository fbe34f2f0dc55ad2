//! High-Level-API der Session: jede Methode führt genau eine
//! Top-Level-Operation aus (ein Undo-Schritt).

use super::Modeler;
use crate::command::*;
use crate::copy_paste::Descriptor;
use crate::core::{Bounds, Element, ElementId, Waypoint};
use crate::error::ModelingError;
use glam::Vec2;
use indexmap::IndexMap;
use serde_json::{Map, Value};

impl Modeler {
    // ── Templates ──────────────────────────────────────────────────

    /// Shape-Template mit freier ID (Standardgröße aus den Optionen).
    pub fn shape_template(&mut self, element_type: &str, size: Option<Vec2>) -> Element {
        let size = size.unwrap_or(Vec2::new(
            self.options.default_shape_width,
            self.options.default_shape_height,
        ));
        let id = self.unique_id("shape");
        Element::shape(id, element_type, Bounds::new(0.0, 0.0, size.x, size.y))
    }

    // ── Erzeugen ───────────────────────────────────────────────────

    /// Legt ein Shape mit Mittelpunkt `position` unter `parent` an.
    pub fn create_shape(
        &mut self,
        shape: Element,
        position: Vec2,
        parent: &ElementId,
    ) -> Result<ElementId, ModelingError> {
        self.create_shape_with(shape, Placement::Center(position), parent, None)
    }

    /// Legt ein Shape an, optional direkt an einen Host geheftet.
    pub fn create_shape_with(
        &mut self,
        shape: Element,
        position: Placement,
        parent: &ElementId,
        host: Option<&ElementId>,
    ) -> Result<ElementId, ModelingError> {
        let id = shape.id.clone();
        self.execute(
            SHAPE_CREATE,
            ShapeCreateContext {
                shape,
                position,
                parent: parent.clone(),
                parent_index: None,
                host: host.cloned(),
            },
        )?;
        Ok(id)
    }

    /// Legt ein Label für `target` an (Parent = Parent des Targets).
    ///
    /// Ohne Template wird ein Label in Standardgröße erzeugt.
    pub fn create_label(
        &mut self,
        target: &ElementId,
        position: Vec2,
        label: Option<Element>,
    ) -> Result<ElementId, ModelingError> {
        let parent = match self.element(target)?.parent.clone() {
            Some(parent) => parent,
            None => self.root()?,
        };
        let label = match label {
            Some(label) => label,
            None => {
                let id = self.unique_id("label");
                Element::label(id, "label", target.clone(), Bounds::default())
            }
        };
        let id = label.id.clone();
        self.execute(
            LABEL_CREATE,
            LabelCreateContext {
                label,
                label_target: target.clone(),
                position: Placement::Center(position),
                parent,
                parent_index: None,
            },
        )?;
        Ok(id)
    }

    /// Verbindet zwei Shapes. Ohne Wegpunkte im Template wird gelayoutet.
    ///
    /// Standard-Parent ist der Parent der Source.
    pub fn create_connection(
        &mut self,
        source: &ElementId,
        target: &ElementId,
        connection: Element,
        parent: Option<&ElementId>,
    ) -> Result<ElementId, ModelingError> {
        let parent = match parent {
            Some(parent) => parent.clone(),
            None => self
                .element(source)?
                .parent
                .clone()
                .ok_or(ModelingError::MissingParent)?,
        };
        let id = connection.id.clone();
        self.execute(
            CONNECTION_CREATE,
            ConnectionCreateContext {
                connection,
                source: source.clone(),
                target: target.clone(),
                parent,
                parent_index: None,
                hints: LayoutHints::default(),
            },
        )?;
        Ok(id)
    }

    /// Legt Elemente aus Deskriptoren an; liefert Deskriptor-ID → neue ID.
    pub fn create_elements(
        &mut self,
        descriptors: Vec<Descriptor>,
        parent: &ElementId,
        position: Option<Vec2>,
    ) -> Result<IndexMap<ElementId, ElementId>, ModelingError> {
        let context = self.execute(
            ELEMENTS_CREATE,
            ElementsCreateContext {
                descriptors,
                parent: parent.clone(),
                position,
                created: IndexMap::new(),
            },
        )?;
        Ok(context.as_elements_create(ELEMENTS_CREATE)?.created.clone())
    }

    // ── Verschieben ────────────────────────────────────────────────

    /// Verschiebt ein Shape samt Kindern, Label und Verbindungs-Ankern.
    pub fn move_shape(
        &mut self,
        shape: &ElementId,
        delta: Vec2,
        new_parent: Option<&ElementId>,
    ) -> Result<(), ModelingError> {
        let mut context = ShapeMoveContext::new(shape.clone(), delta);
        context.new_parent = new_parent.cloned();
        self.execute(SHAPE_MOVE, context)?;
        Ok(())
    }

    /// Verschiebt eine Connection starr.
    pub fn move_connection(
        &mut self,
        connection: &ElementId,
        delta: Vec2,
        new_parent: Option<&ElementId>,
    ) -> Result<(), ModelingError> {
        let mut context = ConnectionMoveContext::new(connection.clone(), delta);
        context.new_parent = new_parent.cloned();
        self.execute(CONNECTION_MOVE, context)?;
        Ok(())
    }

    /// Verschiebt eine Selektion.
    ///
    /// Mit `hints.attach == Some(true)` wird an `target` angeheftet und der
    /// Parent des Hosts übernommen, sonst wird `target` der neue Parent.
    pub fn move_elements(
        &mut self,
        shapes: &[ElementId],
        delta: Vec2,
        target: Option<&ElementId>,
        hints: MoveHints,
    ) -> Result<(), ModelingError> {
        let (new_parent, new_host) = match target {
            Some(target) if hints.attach == Some(true) => {
                let parent = self.element(target)?.parent.clone();
                (parent, Some(target.clone()))
            }
            Some(target) => (Some(target.clone()), None),
            None => (None, None),
        };

        self.execute(
            ELEMENTS_MOVE,
            ElementsMoveContext {
                shapes: shapes.to_vec(),
                delta,
                new_parent,
                new_host,
                hints,
                closure: None,
            },
        )?;
        Ok(())
    }

    // ── Ändern ─────────────────────────────────────────────────────

    /// Setzt neue Bounds; `min_size` überschreibt die Mindestgröße der Optionen.
    pub fn resize_shape(
        &mut self,
        shape: &ElementId,
        new_bounds: Bounds,
        min_size: Option<Vec2>,
    ) -> Result<(), ModelingError> {
        let mut context = ShapeResizeContext::new(shape.clone(), new_bounds);
        context.min_size = min_size;
        self.execute(SHAPE_RESIZE, context)?;
        Ok(())
    }

    /// Ersetzt ein Shape und liefert die ID des neuen.
    pub fn replace_shape(
        &mut self,
        old_shape: &ElementId,
        new_data: ReplaceData,
        hints: ReplaceHints,
    ) -> Result<ElementId, ModelingError> {
        let context = self.execute(
            SHAPE_REPLACE,
            ShapeReplaceContext {
                old_shape: old_shape.clone(),
                new_data,
                hints,
                new_shape: None,
                old_bounds: None,
            },
        )?;
        context
            .as_shape_replace(SHAPE_REPLACE)?
            .new_shape
            .clone()
            .ok_or_else(|| ModelingError::CannotExecute(SHAPE_REPLACE.to_owned()))
    }

    /// Hängt den Start an `new_source`; `anchor` wird neuer Start-Punkt.
    pub fn reconnect_start(
        &mut self,
        connection: &ElementId,
        new_source: &ElementId,
        anchor: Vec2,
    ) -> Result<(), ModelingError> {
        let target = self.canvas.connection(connection)?.target.clone();
        let hints = LayoutHints {
            connection_start: Some(anchor),
            ..LayoutHints::default()
        };
        self.execute(
            CONNECTION_RECONNECT,
            ConnectionReconnectContext::new(connection.clone(), new_source.clone(), target, hints),
        )?;
        Ok(())
    }

    /// Hängt das Ende an `new_target`; `anchor` wird neuer End-Punkt.
    pub fn reconnect_end(
        &mut self,
        connection: &ElementId,
        new_target: &ElementId,
        anchor: Vec2,
    ) -> Result<(), ModelingError> {
        let source = self.canvas.connection(connection)?.source.clone();
        let hints = LayoutHints {
            connection_end: Some(anchor),
            ..LayoutHints::default()
        };
        self.execute(
            CONNECTION_RECONNECT,
            ConnectionReconnectContext::new(connection.clone(), source, new_target.clone(), hints),
        )?;
        Ok(())
    }

    /// Hängt beide Enden um, optional mit expliziten Wegpunkten.
    pub fn reconnect(
        &mut self,
        connection: &ElementId,
        new_source: &ElementId,
        new_target: &ElementId,
        waypoints: Option<Vec<Waypoint>>,
    ) -> Result<(), ModelingError> {
        let mut context = ConnectionReconnectContext::new(
            connection.clone(),
            new_source.clone(),
            new_target.clone(),
            LayoutHints::default(),
        );
        context.waypoints = waypoints;
        self.execute(CONNECTION_RECONNECT, context)?;
        Ok(())
    }

    pub fn layout_connection(
        &mut self,
        connection: &ElementId,
        hints: LayoutHints,
    ) -> Result<(), ModelingError> {
        self.execute(
            CONNECTION_LAYOUT,
            ConnectionLayoutContext::new(connection.clone(), hints),
        )?;
        Ok(())
    }

    /// Heftet `shape` an `new_host` bzw. löst es (`None`).
    pub fn update_attachment(
        &mut self,
        shape: &ElementId,
        new_host: Option<&ElementId>,
    ) -> Result<(), ModelingError> {
        self.execute(
            ATTACHMENT_UPDATE,
            AttachmentUpdateContext::new(shape.clone(), new_host.cloned()),
        )?;
        Ok(())
    }

    pub fn update_properties(
        &mut self,
        element: &ElementId,
        properties: Map<String, Value>,
    ) -> Result<(), ModelingError> {
        self.execute(
            PROPERTIES_UPDATE,
            PropertiesUpdateContext::new(element.clone(), properties),
        )?;
        Ok(())
    }

    // ── Löschen ────────────────────────────────────────────────────

    /// Löscht ein Shape samt Label, Attachern, Kindern und Verbindungen.
    pub fn remove_shape(&mut self, shape: &ElementId) -> Result<(), ModelingError> {
        self.execute(SHAPE_DELETE, ShapeDeleteContext::new(shape.clone()))?;
        Ok(())
    }

    pub fn remove_connection(&mut self, connection: &ElementId) -> Result<(), ModelingError> {
        self.execute(CONNECTION_DELETE, ConnectionDeleteContext::new(connection.clone()))?;
        Ok(())
    }

    /// Löscht mehrere Elemente in einem Undo-Schritt.
    pub fn remove_elements(&mut self, elements: &[ElementId]) -> Result<(), ModelingError> {
        self.execute(
            ELEMENTS_DELETE,
            ElementsDeleteContext {
                elements: elements.to_vec(),
            },
        )?;
        Ok(())
    }
}
