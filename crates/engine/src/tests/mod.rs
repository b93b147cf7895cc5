// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod clock_flow_tests;
mod decision_flow_tests;
mod lifecycle_tests;

use std::cell::RefCell;
use std::rc::Rc;

use time::OffsetDateTime;
use time::macros::datetime;
use vhc_audit::{Actor, AuditRecord};
use vhc_domain::{ActorRole, JobStatus};
use vhc_persistence::Persistence;

use crate::collaborators::{
    AuditSink, NotificationSink, ReminderScheduler, RepairItemGenerator,
};
use crate::engine::WorkflowEngine;

pub const TECH_ID: i64 = 7;
pub const ADVISOR_ID: i64 = 3;

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

pub fn technician() -> Actor {
    Actor::staff(TECH_ID, ActorRole::Technician)
}

pub fn advisor() -> Actor {
    Actor::staff(ADVISOR_ID, ActorRole::Advisor)
}

pub fn customer() -> Actor {
    Actor::new(None, ActorRole::Customer)
}

/// Shared event log for the recording collaborators.
pub type EventLog = Rc<RefCell<Vec<String>>>;

/// A collaborator that records every call for assertion.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub events: EventLog,
}

impl NotificationSink for Recorder {
    fn status_changed(
        &mut self,
        job_id: i64,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("status:{job_id}:{from}->{to}"));
        Ok(())
    }

    fn technician_clocked_in(&mut self, job_id: i64, technician_id: i64) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("clock_in:{job_id}:{technician_id}"));
        Ok(())
    }

    fn technician_clocked_out(
        &mut self,
        job_id: i64,
        technician_id: i64,
        duration_minutes: i64,
    ) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("clock_out:{job_id}:{technician_id}:{duration_minutes}"));
        Ok(())
    }

    fn customer_action(&mut self, job_id: i64, action: &str, amount: i64) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("customer:{job_id}:{action}:{amount}"));
        Ok(())
    }
}

impl ReminderScheduler for Recorder {
    fn schedule(
        &mut self,
        job_id: i64,
        _sent_at: OffsetDateTime,
        _expires_at: OffsetDateTime,
    ) -> Result<(), String> {
        self.events.borrow_mut().push(format!("schedule:{job_id}"));
        Ok(())
    }

    fn cancel(&mut self, job_id: i64) -> Result<(), String> {
        self.events.borrow_mut().push(format!("cancel:{job_id}"));
        Ok(())
    }
}

impl RepairItemGenerator for Recorder {
    fn auto_generate(&mut self, job_id: i64) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("auto_generate:{job_id}"));
        Ok(())
    }

    fn from_flagged_findings(&mut self, job_id: i64, site_id: i64) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("from_findings:{job_id}:{site_id}"));
        Ok(())
    }
}

impl AuditSink for Recorder {
    fn record(&mut self, record: &AuditRecord) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("audit:{}:{}", record.action, record.resource_id));
        Ok(())
    }
}

/// A notification sink whose every delivery fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotificationSink;

impl NotificationSink for FailingNotificationSink {
    fn status_changed(
        &mut self,
        _job_id: i64,
        _from: JobStatus,
        _to: JobStatus,
    ) -> Result<(), String> {
        Err(String::from("delivery channel down"))
    }

    fn technician_clocked_in(&mut self, _job_id: i64, _technician_id: i64) -> Result<(), String> {
        Err(String::from("delivery channel down"))
    }

    fn technician_clocked_out(
        &mut self,
        _job_id: i64,
        _technician_id: i64,
        _duration_minutes: i64,
    ) -> Result<(), String> {
        Err(String::from("delivery channel down"))
    }

    fn customer_action(&mut self, _job_id: i64, _action: &str, _amount: i64) -> Result<(), String> {
        Err(String::from("delivery channel down"))
    }
}

/// An engine over a fresh in-memory database with recording collaborators.
pub fn create_test_engine() -> (WorkflowEngine, EventLog) {
    let recorder = Recorder::default();
    let events = Rc::clone(&recorder.events);
    let persistence = Persistence::new_in_memory().expect("in-memory database");
    let engine = WorkflowEngine::new(persistence)
        .with_notifications(Box::new(recorder.clone()))
        .with_reminders(Box::new(recorder.clone()))
        .with_generator(Box::new(recorder.clone()))
        .with_audit_sink(Box::new(recorder));
    (engine, events)
}

/// Drives a fresh job through arrival and assignment to `assigned`.
pub fn job_at_assigned(engine: &mut WorkflowEngine) -> i64 {
    let job = engine
        .create_job(1, "AB12 CDE", "Jane Driver", advisor(), t0())
        .expect("create job");
    engine
        .request_transition(
            job.job_id,
            JobStatus::AwaitingCheckin,
            advisor(),
            None,
            t0(),
        )
        .expect("arrival");
    engine
        .request_transition(job.job_id, JobStatus::Created, advisor(), None, t0())
        .expect("check-in");
    engine
        .assign_technician(job.job_id, TECH_ID, advisor(), t0())
        .expect("assignment");
    job.job_id
}

/// Drives a job to `tech_completed` via the technician's clock.
pub fn job_at_tech_completed(engine: &mut WorkflowEngine) -> i64 {
    let job_id = job_at_assigned(engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");
    engine
        .clock_out(job_id, TECH_ID, true, technician(), t0())
        .expect("clock out");
    job_id
}

/// Drives a job to `sent` with one priced repair item. Returns
/// `(job_id, item_id)`.
pub fn job_at_sent(engine: &mut WorkflowEngine) -> (i64, i64) {
    let job_id = job_at_tech_completed(engine);
    let item_id = engine
        .create_item(job_id, None, "Front brake pads", advisor(), t0())
        .expect("item");
    engine
        .add_labour_line(item_id, None, "Fit pads", 9000, advisor(), t0())
        .expect("labour line");
    engine
        .set_no_parts_required(item_id, true, advisor(), t0())
        .expect("no parts flag");
    engine
        .mark_labour_complete(item_id, advisor(), t0())
        .expect("labour complete");
    engine
        .request_transition(job_id, JobStatus::ReadyToSend, advisor(), None, t0())
        .expect("ready to send");
    engine
        .send_quote(job_id, advisor(), None, t0())
        .expect("send");
    (job_id, item_id)
}
