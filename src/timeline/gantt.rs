use serde::Serialize;

use crate::core::state::{ServerId, Task, TaskId, Ticks};

/// A busy (`task` set) or idle (`task` empty) stretch of one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineSlot {
    pub task: Option<TaskId>,
    pub start: Ticks,
    pub end: Ticks,
}

impl TimelineSlot {
    pub fn is_idle(&self) -> bool {
        self.task.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerTimeline {
    pub server: ServerId,
    pub slots: Vec<TimelineSlot>,
}

impl ServerTimeline {
    pub fn busy_time(&self) -> Ticks {
        self.slots
            .iter()
            .filter(|slot| !slot.is_idle())
            .map(|slot| slot.end - slot.start)
            .sum()
    }
}

/// Per-server segments in time order, with back-to-back segments of the same
/// task merged and the gaps up to `horizon` filled as idle.
pub fn server_timelines(tasks: &[Task], num_servers: usize, horizon: Ticks) -> Vec<ServerTimeline> {
    (0..num_servers)
        .map(|server| {
            let mut busy: Vec<TimelineSlot> = tasks
                .iter()
                .flat_map(|task| {
                    task.segments
                        .iter()
                        .filter(move |seg| seg.server == server)
                        .map(move |seg| TimelineSlot {
                            task: Some(task.id),
                            start: seg.start,
                            end: seg.end,
                        })
                })
                .collect();
            busy.sort_by_key(|slot| slot.start);

            let mut merged: Vec<TimelineSlot> = Vec::with_capacity(busy.len());
            for slot in busy {
                match merged.last_mut() {
                    Some(last) if last.task == slot.task && last.end == slot.start => {
                        last.end = slot.end;
                    }
                    _ => merged.push(slot),
                }
            }

            let mut slots = Vec::with_capacity(merged.len() * 2 + 1);
            let mut last_end = 0;
            for slot in merged {
                if slot.start > last_end {
                    slots.push(TimelineSlot {
                        task: None,
                        start: last_end,
                        end: slot.start,
                    });
                }
                last_end = slot.end;
                slots.push(slot);
            }
            if last_end < horizon {
                slots.push(TimelineSlot {
                    task: None,
                    start: last_end,
                    end: horizon,
                });
            }

            ServerTimeline { server, slots }
        })
        .collect()
}
