use tracing::{debug, trace};

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    state::{EngineCtx, ServerId, TaskId, Ticks},
};
use crate::scheduler::Scheduler;

pub struct SchedCore<S: Scheduler> {
    pub ctx: EngineCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(num_servers: usize) -> Self {
        Self {
            ctx: EngineCtx::new(num_servers),
            scheduler: S::init(),
            observer: Observer::new(),
        }
    }

    /// Frees every server whose segment has run to completion by `now`.
    pub fn release(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = Vec::new();
        let now = self.ctx.now;
        for server in 0..self.ctx.servers.len() {
            let srv = &self.ctx.servers[server];
            if srv.current.is_some() && srv.completion <= now {
                let task = self.ctx.complete(server);
                events.push(SchedCoreEvent::TaskCompleted { task, server });
            }
        }
        events
    }

    pub fn wake_task(&mut self, task: TaskId) -> SchedCoreEvent {
        let key = self.scheduler.wait_key(self.ctx.task(task));
        self.ctx.enqueue(task, key);
        SchedCoreEvent::TaskArrived { task }
    }

    /// Preempts where the discipline allows it, then hands waiting tasks to
    /// idle servers in ascending server order.
    pub fn schedule(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = Vec::new();
        self.preempt(&mut events);
        self.dispatch(&mut events);
        self.observer.observe(&self.ctx);
        events
    }

    // Each server is compared against the waiting head once per instant
    fn preempt(&mut self, events: &mut Vec<SchedCoreEvent>) {
        for server in 0..self.ctx.servers.len() {
            let Some(running) = self.ctx.servers[server].current else {
                continue;
            };
            let Some(head) = self.ctx.peek_waiting() else {
                return;
            };

            if !self
                .scheduler
                .should_preempt(self.ctx.task(running), self.ctx.task(head))
            {
                continue;
            }

            let (task, remaining) = self.ctx.preempt(server);
            trace!(
                now = self.ctx.now,
                task,
                server,
                by = head,
                remaining,
                "preempted"
            );
            let key = self.scheduler.wait_key(self.ctx.task(task));
            self.ctx.enqueue(task, key);
            events.push(SchedCoreEvent::TaskPreempted {
                task,
                server,
                by: head,
                remaining,
            });
        }
    }

    fn dispatch(&mut self, events: &mut Vec<SchedCoreEvent>) {
        for server in 0..self.ctx.servers.len() {
            if !self.ctx.server_is_idle(server) {
                continue;
            }
            match self.ctx.pop_waiting() {
                Some(task) => {
                    let until = self.ctx.set_running(server, task);
                    debug!(now = self.ctx.now, task, server, until, "dispatched");
                    events.push(SchedCoreEvent::TaskStarted {
                        task,
                        server,
                        until,
                    });
                }
                None => events.push(SchedCoreEvent::ServerIdle { server }),
            }
        }
    }

    pub fn advance_to(&mut self, t: Ticks) {
        self.ctx.advance_to(t);
    }

    pub fn next_completion(&self) -> Option<Ticks> {
        self.ctx.next_completion()
    }

    /// No task waiting and every server idle.
    pub fn is_drained(&self) -> bool {
        self.ctx.waiting.is_empty() && self.ctx.all_servers_idle()
    }

    pub fn server_task(&self, server: ServerId) -> Option<TaskId> {
        self.ctx.servers[server].current
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
