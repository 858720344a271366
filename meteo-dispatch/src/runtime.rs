//! Event/action/render loop for effect-based stores.

use std::io;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effect::{EffectStore, EffectStoreLike};
use crate::event::{process_raw_event, spawn_event_poller, EventKind, RawEvent};
use crate::subscriptions::Subscriptions;
use crate::tasks::TaskManager;
use crate::Action;

/// Timeout passed to each `crossterm::event::poll` call
const POLL_TIMEOUT: Duration = Duration::from_millis(10);
/// Sleep between poll cycles
const POLL_LOOP_SLEEP: Duration = Duration::from_millis(16);

/// Result of mapping an event into actions plus an optional render hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome<A> {
    pub actions: Vec<A>,
    /// Force a re-render even if no action changes state.
    pub needs_render: bool,
}

impl<A> EventOutcome<A> {
    pub fn ignored() -> Self {
        Self {
            actions: Vec::new(),
            needs_render: false,
        }
    }

    pub fn action(action: A) -> Self {
        Self {
            actions: vec![action],
            needs_render: false,
        }
    }

    /// Collect a component's `handle_event` output.
    pub fn from_actions(iter: impl IntoIterator<Item = A>) -> Self {
        Self {
            actions: iter.into_iter().collect(),
            needs_render: false,
        }
    }

    pub fn with_render(mut self) -> Self {
        self.needs_render = true;
        self
    }
}

impl<A> Default for EventOutcome<A> {
    fn default() -> Self {
        Self::ignored()
    }
}

impl<A> From<Vec<A>> for EventOutcome<A> {
    fn from(actions: Vec<A>) -> Self {
        Self::from_actions(actions)
    }
}

/// Context passed to effect handlers.
pub struct EffectContext<'a, A: Action> {
    tasks: &'a mut TaskManager<A>,
    subscriptions: &'a mut Subscriptions<A>,
}

impl<'a, A: Action> EffectContext<'a, A> {
    pub fn new(tasks: &'a mut TaskManager<A>, subscriptions: &'a mut Subscriptions<A>) -> Self {
        Self {
            tasks,
            subscriptions,
        }
    }

    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        self.tasks
    }

    pub fn subscriptions(&mut self) -> &mut Subscriptions<A> {
        self.subscriptions
    }
}

/// Runtime for effect-based stores.
///
/// Owns the action channel, the task manager and the subscriptions. Both
/// terminal events (mapped to actions) and task results arrive on the same
/// channel and are reduced one at a time, so the store has a single writer.
pub struct EffectRuntime<S, A: Action, E, St: EffectStoreLike<S, A, E> = EffectStore<S, A, E>> {
    store: St,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    should_render: bool,
    tasks: TaskManager<A>,
    subscriptions: Subscriptions<A>,
    _marker: std::marker::PhantomData<(S, E)>,
}

impl<S: 'static, A: Action, E, St: EffectStoreLike<S, A, E>> EffectRuntime<S, A, E, St> {
    pub fn from_store(store: St) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let tasks = TaskManager::new(action_tx.clone());
        let subscriptions = Subscriptions::new(action_tx.clone());

        Self {
            store,
            action_tx,
            action_rx,
            should_render: true,
            tasks,
            subscriptions,
            _marker: std::marker::PhantomData,
        }
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn subscriptions(&mut self) -> &mut Subscriptions<A> {
        &mut self.subscriptions
    }

    /// Dispatch one action and run its effects; returns the change flag.
    ///
    /// The loop in [`run`](Self::run) uses this for every queued action. It
    /// is public so the reducer/effect wiring can be driven without a
    /// terminal.
    pub fn dispatch<FEffect>(&mut self, action: A, handle_effect: &mut FEffect) -> bool
    where
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        let result = self.store.dispatch(action);
        if result.has_effects() {
            let mut ctx = EffectContext::new(&mut self.tasks, &mut self.subscriptions);
            for effect in result.effects {
                handle_effect(effect, &mut ctx);
            }
        }
        result.changed
    }

    /// Run the event/action loop until `should_quit` accepts an action.
    pub async fn run<B, FRender, FEvent, FQuit, FEffect>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut render: FRender,
        mut map_event: FEvent,
        mut should_quit: FQuit,
        mut handle_effect: FEffect,
    ) -> io::Result<()>
    where
        B: Backend,
        FRender: FnMut(&mut Frame, Rect, &S),
        FEvent: FnMut(&EventKind, &S) -> EventOutcome<A>,
        FQuit: FnMut(&A) -> bool,
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let cancel_token = CancellationToken::new();
        let _poller = spawn_event_poller(
            event_tx,
            POLL_TIMEOUT,
            POLL_LOOP_SLEEP,
            cancel_token.clone(),
        );

        loop {
            if self.should_render {
                let state = self.store.state();
                terminal.draw(|frame| {
                    let area = frame.area();
                    render(frame, area, state);
                })?;
                self.should_render = false;
            }

            tokio::select! {
                Some(raw_event) = event_rx.recv() => {
                    let Some(event) = process_raw_event(raw_event) else {
                        continue;
                    };
                    let outcome = map_event(&event, self.store.state());
                    if outcome.needs_render {
                        self.should_render = true;
                    }
                    for action in outcome.actions {
                        let _ = self.action_tx.send(action);
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    if should_quit(&action) {
                        break;
                    }
                    if self.dispatch(action, &mut handle_effect) {
                        self.should_render = true;
                    }
                }

                else => {
                    break;
                }
            }
        }

        cancel_token.cancel();
        self.subscriptions.cancel_all();
        self.tasks.cancel_all();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DispatchResult;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Fetch,
        DidFetch(u32),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Fetch => "Fetch",
                TestAction::DidFetch(_) => "DidFetch",
            }
        }
    }

    enum TestEffect {
        Load,
    }

    #[derive(Default)]
    struct TestState {
        loading: bool,
        value: Option<u32>,
    }

    fn reducer(state: &mut TestState, action: TestAction) -> DispatchResult<TestEffect> {
        match action {
            TestAction::Fetch => {
                state.loading = true;
                DispatchResult::changed_with(TestEffect::Load)
            }
            TestAction::DidFetch(value) => {
                state.loading = false;
                state.value = Some(value);
                DispatchResult::changed()
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_effects_through_tasks() {
        let mut runtime: EffectRuntime<TestState, TestAction, TestEffect> =
            EffectRuntime::from_store(EffectStore::new(TestState::default(), reducer));
        let mut handle_effect = |effect: TestEffect, ctx: &mut EffectContext<TestAction>| match effect {
            TestEffect::Load => {
                ctx.tasks().spawn("load", async { TestAction::DidFetch(7) });
            }
        };

        assert!(runtime.dispatch(TestAction::Fetch, &mut handle_effect));
        assert!(runtime.state().loading);

        let action = tokio::time::timeout(Duration::from_millis(100), runtime.action_rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action, TestAction::DidFetch(7));

        runtime.dispatch(action, &mut handle_effect);
        assert!(!runtime.state().loading);
        assert_eq!(runtime.state().value, Some(7));
    }

    #[test]
    fn test_event_outcome_builders() {
        let outcome: EventOutcome<TestAction> = EventOutcome::ignored();
        assert!(outcome.actions.is_empty());
        assert!(!outcome.needs_render);

        let outcome = EventOutcome::action(TestAction::Fetch).with_render();
        assert_eq!(outcome.actions, vec![TestAction::Fetch]);
        assert!(outcome.needs_render);

        let outcome: EventOutcome<TestAction> = vec![TestAction::Fetch, TestAction::Fetch].into();
        assert_eq!(outcome.actions.len(), 2);
    }
}
