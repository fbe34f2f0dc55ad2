//! Standard-Behaviors, die sich als Interceptors in primitive Commands einhängen.

mod attach_support;
mod label_support;

pub use attach_support::AttachSupport;
pub use label_support::LabelSupport;

use crate::command::CommandStack;
use std::rc::Rc;

/// Priorität der Standard-Behaviors (über der Standard-Priorität 1000).
pub const BEHAVIOR_PRIORITY: i32 = 1500;

/// Registriert Attach- und Label-Support.
pub fn register_default_behaviors(stack: &mut CommandStack) {
    stack.register_interceptor(BEHAVIOR_PRIORITY, Rc::new(AttachSupport));
    stack.register_interceptor(BEHAVIOR_PRIORITY, Rc::new(LabelSupport));
}
