//! Bounded resolution of follow-up commands.

use futures::future::BoxFuture;
use log::debug;

use crate::command::{Command, Effect};
use crate::model::Model;

/// How many chained follow-up updates a single event may trigger.
///
/// An update that returns [`Command::message`] is fed back into `update`
/// immediately; the result of that update may chain once more. Anything
/// deeper is dropped.
pub const MAX_EFFECT_DEPTH: usize = 2;

/// Work left over after the synchronous part of a command was resolved
/// under the program lock.
pub(crate) struct Effects<Msg: Send + 'static> {
    /// Async effects with the depth their result will be applied at.
    pub(crate) pending: Vec<(usize, BoxFuture<'static, Msg>)>,
    pub(crate) quit: bool,
}

impl<Msg: Send + 'static> Default for Effects<Msg> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            quit: false,
        }
    }
}

impl<Msg: Send + 'static> Effects<Msg> {
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty() && !self.quit
    }
}

/// Run `update(msg)` and resolve whatever it returns.
///
/// `depth` is the number of follow-ups already applied in this chain; an
/// event coming off the wire starts at zero.
pub(crate) fn dispatch<M: Model>(
    program: &mut M,
    msg: M::Message,
    depth: usize,
    effects: &mut Effects<M::Message>,
) {
    let cmd = program.update(msg);
    resolve(program, cmd, depth, effects);
}

/// Resolve a command produced at `depth`.
pub(crate) fn resolve<M: Model>(
    program: &mut M,
    cmd: Command<M::Message>,
    depth: usize,
    effects: &mut Effects<M::Message>,
) {
    match cmd.effect {
        Effect::Nothing => {}
        Effect::Send(msg) => {
            if depth < MAX_EFFECT_DEPTH {
                dispatch(program, msg, depth + 1, effects);
            } else {
                debug!("dropping follow-up message beyond depth {MAX_EFFECT_DEPTH}");
            }
        }
        Effect::Quit => effects.quit = true,
        Effect::Task(fut) => effects.pending.push((depth, fut)),
        Effect::Many(cmds) => {
            for cmd in cmds {
                resolve(program, cmd, depth, effects);
            }
        }
    }
}
