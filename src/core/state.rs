use keyed_priority_queue::KeyedPriorityQueue;
use serde::{Deserialize, Serialize};

// Index into Task Vec
pub type TaskId = usize;
pub type ServerId = usize;
pub type Ticks = u64;
pub type Priority = u32;

/// Ordering key of a waiting task. The smallest `(priority, arrival, seq)`
/// triple is served first.
///
/// `seq` is stamped by [`EngineCtx::enqueue`], so equal `(priority, arrival)`
/// pairs leave in the order they joined the waiting set. A preempted task
/// therefore queues behind equal-key tasks that were already waiting.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct WaitKey {
    pub priority: Priority,
    pub arrival: Ticks,
    pub seq: u64,
}

impl WaitKey {
    pub fn new(priority: Priority, arrival: Ticks) -> Self {
        Self {
            priority,
            arrival,
            seq: 0,
        }
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop WaitKey's Ord
impl PartialOrd for WaitKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WaitKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.priority, other.arrival, other.seq).cmp(&(self.priority, self.arrival, self.seq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    NotArrived,
    Waiting,
    Running,
    Finished,
}

/// A contiguous interval `[start, end)` during which a task occupies a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Ticks,
    pub end: Ticks,
    pub server: ServerId,
}

impl Segment {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }

    pub fn covers(&self, t: Ticks) -> bool {
        self.start <= t && t < self.end
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub state: TaskState,
    pub arrival_time: Ticks,
    pub required_service: Ticks,
    pub remaining_service: Ticks,
    pub priority: Option<Priority>,
    pub current_server: Option<ServerId>,
    pub segments: Vec<Segment>,
    pub completion_time: Option<Ticks>,
}

impl Task {
    /// Priority class used for ordering; tasks without one all share class 0.
    pub fn priority_class(&self) -> Priority {
        self.priority.unwrap_or(0)
    }

    /// Start of the first segment, if the task ever ran.
    pub fn start_time(&self) -> Option<Ticks> {
        self.segments.first().map(|seg| seg.start)
    }

    pub fn consumed_service(&self) -> Ticks {
        self.segments.iter().map(Segment::duration).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }
}

#[derive(Debug)]
pub struct ServerState {
    pub id: ServerId,
    pub current: Option<TaskId>,
    // End of the current segment; meaningless while idle
    pub completion: Ticks,
}

#[derive(Debug)]
pub struct EngineCtx {
    pub now: Ticks,
    pub servers: Vec<ServerState>,
    pub tasks: Vec<Task>,
    pub waiting: KeyedPriorityQueue<TaskId, WaitKey>,
    // Next enqueue sequence number
    enqueued: u64,
    pub preemptions: u64,
}

impl EngineCtx {
    pub fn new(num_servers: usize) -> Self {
        Self {
            now: 0,
            servers: (0..num_servers)
                .map(|id| ServerState {
                    id,
                    current: None,
                    completion: 0,
                })
                .collect(),
            tasks: Vec::new(),
            waiting: KeyedPriorityQueue::new(),
            enqueued: 0,
            preemptions: 0,
        }
    }

    pub fn create_task(
        &mut self,
        arrival_time: Ticks,
        required_service: Ticks,
        priority: Option<Priority>,
    ) -> TaskId {
        assert!(required_service > 0, "Task service time must be positive");
        let id = self.tasks.len();

        self.tasks.push(Task {
            id,
            state: TaskState::NotArrived,
            arrival_time,
            required_service,
            remaining_service: required_service,
            priority,
            current_server: None,
            segments: Vec::new(),
            completion_time: None,
        });

        id
    }

    pub fn advance_to(&mut self, t: Ticks) {
        debug_assert!(t >= self.now, "Clock must never move backwards");
        self.now = t;
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn server_is_idle(&self, server: ServerId) -> bool {
        self.servers[server].current.is_none()
    }

    pub fn all_servers_idle(&self) -> bool {
        self.servers.iter().all(|srv| srv.current.is_none())
    }

    pub fn next_completion(&self) -> Option<Ticks> {
        self.servers
            .iter()
            .filter(|srv| srv.current.is_some())
            .map(|srv| srv.completion)
            .min()
    }

    /// Adds `task_id` to the waiting set under `key`, stamped with the next
    /// sequence number.
    pub fn enqueue(&mut self, task_id: TaskId, key: WaitKey) {
        assert!(
            self.waiting.get_priority(&task_id).is_none(),
            "Task {task_id} already waiting"
        );

        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Finished && task.current_server.is_none(),
            "Task {task_id} must not be Finished or on a server when enqueued"
        );
        task.state = TaskState::Waiting;

        let seq = self.enqueued;
        self.enqueued += 1;
        self.waiting.push(task_id, WaitKey { seq, ..key });
    }

    pub fn peek_waiting(&self) -> Option<TaskId> {
        self.waiting.peek().map(|(task, _)| *task)
    }

    pub fn pop_waiting(&mut self) -> Option<TaskId> {
        self.waiting.pop().map(|(task, _)| task)
    }

    /// Opens a segment `[now, now + remaining)` for `task_id` on `server`.
    pub fn set_running(&mut self, server: ServerId, task_id: TaskId) -> Ticks {
        debug_assert!(
            self.waiting.get_priority(&task_id).is_none(),
            "Running task {task_id} must not be waiting"
        );
        debug_assert!(
            self.server_is_idle(server),
            "Server {server} already running a task"
        );

        let now = self.now;
        let task = self.task_mut(task_id);
        let completion = now
            .checked_add(task.remaining_service)
            .expect("Segment end overflows the clock");
        task.state = TaskState::Running;
        task.current_server = Some(server);
        task.segments.push(Segment {
            start: now,
            end: completion,
            server,
        });

        let srv = &mut self.servers[server];
        srv.current = Some(task_id);
        srv.completion = completion;
        completion
    }

    /// Finalizes the task on `server`, whose last segment ends now.
    pub fn complete(&mut self, server: ServerId) -> TaskId {
        let task_id = self.servers[server]
            .current
            .take()
            .expect("Completing an idle server");
        let now = self.now;

        let task = self.task_mut(task_id);
        debug_assert_eq!(
            task.segments.last().map(|seg| seg.end),
            Some(now),
            "Task {task_id} completed away from its segment end"
        );
        task.state = TaskState::Finished;
        task.current_server = None;
        task.remaining_service = 0;
        task.completion_time = Some(now);

        task_id
    }

    /// Interrupts the task on `server`: its open segment closes now and the
    /// unfinished work is kept as remaining service.
    pub fn preempt(&mut self, server: ServerId) -> (TaskId, Ticks) {
        let srv = &mut self.servers[server];
        let task_id = srv.current.take().expect("Preempting an idle server");
        let remaining = srv.completion - self.now;
        let now = self.now;

        let task = self.task_mut(task_id);
        let segment = task
            .segments
            .last_mut()
            .expect("Running task must have an open segment");
        debug_assert!(segment.start < now, "Preempted segment must be non-empty");
        segment.end = now;
        task.remaining_service = remaining;
        task.current_server = None;
        self.preemptions += 1;

        (task_id, remaining)
    }
}
