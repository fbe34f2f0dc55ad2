//! Wendet ein Delta auf eine Closure an.
//!
//! Shapes werden einzeln verschoben (ohne Rekursion und ohne Layout, die
//! Closure enthält bereits alles). Eingeschlossene Connections mit beiden
//! Endpunkten in der Closure werden starr verschoben, alle anderen nur an
//! der bewegten Seite neu verankert.

use super::layout::{moved_source_anchor, moved_target_anchor};
use super::move_closure::{get_closure, Closure};
use super::Modeler;
use crate::command::{
    ConnectionLayoutContext, ConnectionMoveContext, LayoutHints, MoveHints, ShapeMoveContext,
    CONNECTION_LAYOUT, CONNECTION_MOVE, SHAPE_MOVE,
};
use crate::core::ElementId;
use crate::error::ModelingError;
use glam::Vec2;

impl Modeler {
    /// Verschiebt Elemente samt Nachfahren (ohne Parent-Wechsel der Nachfahren).
    pub(crate) fn move_recursive(
        &mut self,
        elements: &[ElementId],
        delta: Vec2,
        new_parent: Option<&ElementId>,
    ) -> Result<(), ModelingError> {
        let closure = get_closure(&self.canvas, elements);
        self.move_closure(&closure, delta, new_parent, None)
    }

    /// Verschiebt alle Elemente einer Closure um `delta`.
    ///
    /// Nur `top_level`-Elemente wechseln zu `new_parent`, und nur wenn sich der
    /// Parent tatsächlich ändert. Liegt `primary_shape` bereits in `new_parent`,
    /// behalten alle Elemente ihren Parent.
    pub(crate) fn move_closure(
        &mut self,
        closure: &Closure,
        delta: Vec2,
        new_parent: Option<&ElementId>,
        primary_shape: Option<&ElementId>,
    ) -> Result<(), ModelingError> {
        let keep_parent = match (primary_shape, new_parent) {
            (Some(primary), Some(parent)) => self
                .canvas
                .get(primary)
                .is_some_and(|p| p.parent.as_ref() == Some(parent)),
            _ => false,
        };

        for shape in &closure.all_shapes {
            let parent = self.reparent_target(closure, shape, new_parent, keep_parent);
            let mut context = ShapeMoveContext::new(shape.clone(), delta);
            context.new_parent = parent;
            context.hints = MoveHints {
                recurse: false,
                layout: false,
                ..MoveHints::default()
            };
            self.execute(SHAPE_MOVE, context)?;
        }

        for connection in &closure.all_connections {
            let Ok(data) = self.canvas.connection(connection) else {
                continue;
            };
            let source_moved = closure.all_shapes.contains(&data.source);
            let target_moved = closure.all_shapes.contains(&data.target);

            if closure.enclosed_connections.contains(connection) && source_moved && target_moved {
                let parent = self.reparent_target(closure, connection, new_parent, keep_parent);
                let mut context = ConnectionMoveContext::new(connection.clone(), delta);
                context.new_parent = parent;
                self.execute(CONNECTION_MOVE, context)?;
                continue;
            }

            let mut hints = LayoutHints::default();
            if source_moved {
                let bounds = self.canvas.shape(&data.source)?.bounds;
                hints.connection_start = Some(moved_source_anchor(data, &bounds, delta));
            }
            if target_moved {
                let bounds = self.canvas.shape(&data.target)?.bounds;
                hints.connection_end = Some(moved_target_anchor(data, &bounds, delta));
            }
            self.execute(CONNECTION_LAYOUT, ConnectionLayoutContext::new(connection.clone(), hints))?;
        }

        Ok(())
    }

    /// Neuer Parent eines Closure-Elements (`None` = Parent bleibt).
    fn reparent_target(
        &self,
        closure: &Closure,
        id: &ElementId,
        new_parent: Option<&ElementId>,
        keep_parent: bool,
    ) -> Option<ElementId> {
        if keep_parent || !closure.top_level.contains(id) {
            return None;
        }
        let parent = new_parent?;
        let current = self.canvas.get(id).and_then(|e| e.parent.as_ref());
        (current != Some(parent)).then(|| parent.clone())
    }
}
