use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

/// What a program asks the session to do after an update.
///
/// Returned from [`Model::init`](crate::Model::init),
/// [`Model::update`](crate::Model::update) and
/// [`Model::resize`](crate::Model::resize). Messages are fed back into
/// `update` straight away, up to
/// [`MAX_EFFECT_DEPTH`](crate::session::MAX_EFFECT_DEPTH) links deep.
/// Futures run on their own task and report back as a message.
///
/// ```rust,ignore
/// fn update(&mut self, msg: Msg) -> Command<Msg> {
///     match msg {
///         Msg::Refresh => Command::perform(fetch_status(), Msg::Status),
///         Msg::Status(status) => {
///             self.status = status;
///             Command::none()
///         }
///         Msg::Leave => Command::quit(),
///     }
/// }
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) effect: Effect<Msg>,
}

pub(crate) enum Effect<Msg: Send + 'static> {
    Nothing,
    Send(Msg),
    Quit,
    Task(BoxFuture<'static, Msg>),
    Many(Vec<Command<Msg>>),
}

type Mapper<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

impl<Msg: Send + 'static> Command<Msg> {
    fn from_effect(effect: Effect<Msg>) -> Self {
        Command { effect }
    }

    pub fn none() -> Self {
        Self::from_effect(Effect::Nothing)
    }

    /// Deliver `msg` to `update` before the next render.
    pub fn message(msg: Msg) -> Self {
        Self::from_effect(Effect::Send(msg))
    }

    /// Stop the session and close the client's connection.
    pub fn quit() -> Self {
        Self::from_effect(Effect::Quit)
    }

    /// Await `future` off the program lock and turn its output into a message.
    pub fn perform<F, T>(future: F, into_msg: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::from_effect(Effect::Task(Box::pin(async move { into_msg(future.await) })))
    }

    /// Combine several commands. No-ops are dropped and a lone survivor is
    /// returned unwrapped.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut kept: Vec<_> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        if kept.len() > 1 {
            return Self::from_effect(Effect::Many(kept));
        }
        kept.pop().unwrap_or_else(Command::none)
    }

    /// Lift a child's command into the parent's message type.
    pub fn map<Out: Send + 'static>(
        self,
        f: impl Fn(Msg) -> Out + Send + Sync + 'static,
    ) -> Command<Out> {
        self.lift(Arc::new(f))
    }

    fn lift<Out: Send + 'static>(self, f: Mapper<Msg, Out>) -> Command<Out> {
        let effect = match self.effect {
            Effect::Nothing => Effect::Nothing,
            Effect::Quit => Effect::Quit,
            Effect::Send(msg) => Effect::Send(f(msg)),
            Effect::Task(task) => Effect::Task(Box::pin(async move { f(task.await) })),
            Effect::Many(cmds) => {
                Effect::Many(cmds.into_iter().map(|cmd| cmd.lift(Arc::clone(&f))).collect())
            }
        };
        Command { effect }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.effect, Effect::Nothing)
    }

    pub fn is_quit(&self) -> bool {
        matches!(self.effect, Effect::Quit)
    }

    /// The message this command carries, if it is a plain message.
    pub fn into_message(self) -> Option<Msg> {
        match self.effect {
            Effect::Send(msg) => Some(msg),
            _ => None,
        }
    }

    /// The members of a batch.
    pub fn into_batch(self) -> Option<Vec<Command<Msg>>> {
        match self.effect {
            Effect::Many(cmds) => Some(cmds),
            _ => None,
        }
    }
}
