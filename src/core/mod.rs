pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::SchedCoreEvent;
pub use state::{
    EngineCtx, Priority, Segment, ServerId, ServerState, Task, TaskId, TaskState, Ticks, WaitKey,
};
