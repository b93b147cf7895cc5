// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The workflow engine: the one operation surface over jobs.
//!
//! Every operation follows the same shape: load current state, run the
//! pure apply function, persist the outcome through the conditional
//! commit, then dispatch the outcome's effects to the collaborators.
//! Effects run strictly after the state write; a failed effect is logged
//! at `warn!` and never fails the operation.

use time::OffsetDateTime;
use tracing::{info, warn};
use vhc_audit::{Actor, AuditRecord, Source, StatusHistoryEntry};
use vhc_core::{
    ClockInOutcome, ClockOutOutcome, Command, Effect, LineChangeOutcome, TransitionOutcome,
    WorkflowPolicy, apply_clock_in, apply_clock_out, apply_close, apply_customer_decisions,
    apply_line_change, apply_transition,
};
use vhc_domain::{
    ActorRole, InspectionJob, JobStatus, OutcomeStatus, PublicToken, RagCounts, RepairItem,
    TimeEntry,
};
use vhc_persistence::{Persistence, PersistenceError};

use crate::capabilities::{JobCapabilities, compute_job_capabilities};
use crate::collaborators::{
    AuditSink, NoopAuditSink, NoopNotificationSink, NoopReminderScheduler,
    NoopRepairItemGenerator, NotificationSink, ReminderScheduler, RepairItemGenerator,
};
use crate::error::EngineError;
use crate::token::issue_token;

/// One customer decision within a bulk submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    /// The item being decided.
    pub item_id: i64,
    /// True approves the work, false declines it.
    pub approved: bool,
    /// The pricing option chosen, if any.
    pub selected_option_id: Option<i64>,
    /// Optional decline reason.
    pub reason: Option<String>,
}

/// Orchestrates workflow operations over one persistence handle.
pub struct WorkflowEngine {
    persistence: Persistence,
    policy: WorkflowPolicy,
    notifications: Box<dyn NotificationSink>,
    reminders: Box<dyn ReminderScheduler>,
    generator: Box<dyn RepairItemGenerator>,
    audit_sink: Box<dyn AuditSink>,
}

impl WorkflowEngine {
    /// Creates an engine with the default policy and no-op collaborators.
    #[must_use]
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence,
            policy: WorkflowPolicy::default(),
            notifications: Box::new(NoopNotificationSink),
            reminders: Box::new(NoopReminderScheduler),
            generator: Box::new(NoopRepairItemGenerator),
            audit_sink: Box::new(NoopAuditSink),
        }
    }

    /// Replaces the workflow policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: WorkflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the notification sink.
    #[must_use]
    pub fn with_notifications(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notifications = sink;
        self
    }

    /// Replaces the reminder scheduler.
    #[must_use]
    pub fn with_reminders(mut self, scheduler: Box<dyn ReminderScheduler>) -> Self {
        self.reminders = scheduler;
        self
    }

    /// Replaces the repair item generator.
    #[must_use]
    pub fn with_generator(mut self, generator: Box<dyn RepairItemGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Replaces the external audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit_sink = sink;
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetches a job.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the job does not exist.
    pub fn job(&mut self, job_id: i64) -> Result<InspectionJob, EngineError> {
        Ok(self.persistence.get_job(job_id)?)
    }

    /// Fetches a job through the customer portal token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown or expired tokens; an expired token
    /// is indistinguishable from a missing one on purpose.
    pub fn job_by_token(
        &mut self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job_by_token(token)?;
        if job.has_live_token(now) {
            Ok(job)
        } else {
            Err(EngineError::NotFound {
                resource_type: String::from("job"),
                message: String::from("no job matches this link"),
            })
        }
    }

    /// The job's full status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn history(&mut self, job_id: i64) -> Result<Vec<StatusHistoryEntry>, EngineError> {
        Ok(self.persistence.history_for_job(job_id)?)
    }

    /// All repair items on a job, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn items(&mut self, job_id: i64) -> Result<Vec<RepairItem>, EngineError> {
        Ok(self.persistence.items_for_job(job_id)?)
    }

    /// All time entries on a job, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn time_entries(&mut self, job_id: i64) -> Result<Vec<TimeEntry>, EngineError> {
        Ok(self.persistence.entries_for_job(job_id)?)
    }

    /// Advisory capability flags for one actor on one job.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the job does not exist.
    pub fn capabilities(
        &mut self,
        job_id: i64,
        role: ActorRole,
        actor_id: Option<i64>,
    ) -> Result<JobCapabilities, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        Ok(compute_job_capabilities(&job, role, actor_id))
    }

    // ========================================================================
    // Job lifecycle
    // ========================================================================

    /// Creates a job awaiting the vehicle's arrival and records the
    /// creation history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_job(
        &mut self,
        site_id: i64,
        vehicle_registration: &str,
        customer_name: &str,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let mut job = InspectionJob::new(0, site_id, vehicle_registration, customer_name, now);
        job.job_id = self.persistence.create_job(&job)?;
        self.persistence.append_history(&StatusHistoryEntry::new(
            job.job_id,
            None,
            job.status,
            actor,
            Source::User,
            None,
            now,
        ))?;
        info!(job_id = job.job_id, site_id, "created inspection job");
        Ok(job)
    }

    /// Executes a command against a job, returning the job afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the underlying operation's rejection.
    pub fn execute(
        &mut self,
        job_id: i64,
        command: Command,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        match command {
            Command::RequestTransition { to, note } => {
                self.request_transition(job_id, to, actor, note, now)
            }
            Command::ClockIn { technician_id } => {
                self.clock_in(job_id, technician_id, actor, now)?;
                self.job(job_id)
            }
            Command::ClockOut {
                technician_id,
                inspection_complete,
            } => {
                self.clock_out(job_id, technician_id, inspection_complete, actor, now)?;
                self.job(job_id)
            }
            Command::CloseJob { note } => self.close_job(job_id, actor, note, now),
            Command::RecordDecision {
                item_id,
                approved,
                selected_option_id,
                reason,
            } => self.record_decision(
                job_id,
                DecisionRequest {
                    item_id,
                    approved,
                    selected_option_id,
                    reason,
                },
                actor,
                now,
            ),
            Command::MarkLabourComplete { item_id } => {
                self.mark_labour_complete(item_id, actor, now)?;
                self.job(job_id)
            }
            Command::MarkPartsComplete { item_id } => {
                self.mark_parts_complete(item_id, actor, now)?;
                self.job(job_id)
            }
            Command::SetNoLabourRequired { item_id, flag } => {
                self.set_no_labour_required(item_id, flag, actor, now)?;
                self.job(job_id)
            }
            Command::SetNoPartsRequired { item_id, flag } => {
                self.set_no_parts_required(item_id, flag, actor, now)?;
                self.job(job_id)
            }
            Command::MarkWorkComplete { item_id } => {
                self.mark_work_complete(item_id, actor, now)?;
                self.job(job_id)
            }
        }
    }

    /// Requests a plain status transition.
    ///
    /// # Errors
    ///
    /// Returns the transition engine's rejection, or `PreconditionFailed`
    /// when a concurrent writer moved the job first.
    pub fn request_transition(
        &mut self,
        job_id: i64,
        to: JobStatus,
        actor: Actor,
        note: Option<String>,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let outcome = apply_transition(&job, to, actor, Source::User, note, &self.policy, now)?;
        self.commit(outcome)
    }

    /// Assigns a technician and moves the job to `assigned`.
    ///
    /// # Errors
    ///
    /// Returns the transition engine's rejection.
    pub fn assign_technician(
        &mut self,
        job_id: i64,
        technician_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let mut job = self.persistence.get_job(job_id)?;
        job.technician_id = Some(technician_id);
        let outcome = apply_transition(
            &job,
            JobStatus::Assigned,
            actor,
            Source::User,
            None,
            &self.policy,
            now,
        )?;
        self.commit(outcome)
    }

    /// Updates the RAG finding counters.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn set_rag_counts(
        &mut self,
        job_id: i64,
        counts: RagCounts,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        if !actor.role.is_staff() {
            return Err(EngineError::Forbidden {
                action: String::from("update finding counts"),
                required_role: String::from("staff"),
            });
        }
        let mut job = self.persistence.get_job(job_id)?;
        job.rag_counts = counts;
        job.updated_at = now;
        self.persistence.update_job(&job)?;
        self.audit(
            "UpdateFindingCounts",
            actor,
            "job",
            job_id,
            Some(format!(
                "red={} amber={} green={}",
                counts.red, counts.amber, counts.green
            )),
            now,
        );
        Ok(job)
    }

    // ========================================================================
    // Time tracking
    // ========================================================================

    /// Clocks a technician in, recovering any stale open entry first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the actor may not drive this job's clock,
    /// or `PreconditionFailed` when the job is not clockable.
    pub fn clock_in(
        &mut self,
        job_id: i64,
        technician_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<TimeEntry, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let open = self.persistence.find_open_entry(job_id, technician_id)?;
        let ClockInOutcome {
            recovered,
            mut entry,
            transition,
            effects,
        } = apply_clock_in(&job, technician_id, open, actor, &self.policy, now)?;

        let committed = if let Some(outcome) = transition {
            Some(self.commit(outcome)?)
        } else {
            None
        };
        entry.entry_id = self.persistence.record_clock_in(recovered.as_ref(), &entry)?;

        if let Some(stale) = &recovered {
            warn!(
                job_id,
                technician_id,
                stale_entry_id = stale.entry_id,
                "auto-closed stale time entry on clock-in"
            );
            self.audit(
                "RecoverTimeEntry",
                Actor::system(),
                "time_entry",
                stale.entry_id,
                Some(format!(
                    "auto-closed at clock-in; duration {} min",
                    stale.duration_minutes.unwrap_or(0)
                )),
                now,
            );
        }
        self.dispatch(committed.as_ref().unwrap_or(&job), &effects);
        Ok(entry)
    }

    /// Clocks a technician out, pausing or completing the inspection.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when no open entry exists, or the
    /// transition engine's rejection.
    pub fn clock_out(
        &mut self,
        job_id: i64,
        technician_id: i64,
        inspection_complete: bool,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<TimeEntry, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let open = self.persistence.find_open_entry(job_id, technician_id)?;
        let ClockOutOutcome {
            entry,
            transition,
            effects,
        } = apply_clock_out(
            &job,
            technician_id,
            open,
            inspection_complete,
            actor,
            &self.policy,
            now,
        )?;

        let committed = if let Some(outcome) = transition {
            Some(self.commit(outcome)?)
        } else {
            None
        };
        self.persistence.close_time_entry(&entry)?;
        self.dispatch(committed.as_ref().unwrap_or(&job), &effects);
        Ok(entry)
    }

    // ========================================================================
    // Pricing
    // ========================================================================

    /// Creates a repair item on a job.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn create_item(
        &mut self,
        job_id: i64,
        parent_id: Option<i64>,
        name: &str,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<i64, EngineError> {
        self.require_staff(&actor, "create repair item")?;
        self.persistence.get_job(job_id)?;
        let item_id = self.persistence.create_item(job_id, parent_id, name)?;
        self.audit(
            "CreateRepairItem",
            actor,
            "repair_item",
            item_id,
            Some(name.to_string()),
            now,
        );
        Ok(item_id)
    }

    /// Creates a pricing option under an item.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn create_pricing_option(
        &mut self,
        item_id: i64,
        name: &str,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<i64, EngineError> {
        self.require_staff(&actor, "create pricing option")?;
        self.persistence.get_item(item_id)?;
        let option_id = self.persistence.create_option(item_id, name, now)?;
        self.audit(
            "CreatePricingOption",
            actor,
            "repair_item",
            item_id,
            Some(name.to_string()),
            now,
        );
        Ok(option_id)
    }

    /// Adds a labour line and re-aggregates the item.
    ///
    /// The first line added while the job sits at `tech_completed` starts
    /// the pricing phase.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn add_labour_line(
        &mut self,
        item_id: i64,
        option_id: Option<i64>,
        description: &str,
        amount: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<i64, EngineError> {
        self.require_staff(&actor, "add labour line")?;
        let item = self.persistence.get_item(item_id)?;
        let line_id = self.persistence.add_labour_line(
            option_id.is_none().then_some(item_id),
            option_id,
            description,
            amount,
            now,
        )?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "AddLabourLine",
            actor,
            "repair_item",
            item_id,
            Some(format!("'{description}' amount={amount}")),
            now,
        );
        Ok(line_id)
    }

    /// Adds a parts line and re-aggregates the item.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn add_parts_line(
        &mut self,
        item_id: i64,
        option_id: Option<i64>,
        description: &str,
        amount: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<i64, EngineError> {
        self.require_staff(&actor, "add parts line")?;
        let item = self.persistence.get_item(item_id)?;
        let line_id = self.persistence.add_parts_line(
            option_id.is_none().then_some(item_id),
            option_id,
            description,
            amount,
            now,
        )?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "AddPartsLine",
            actor,
            "repair_item",
            item_id,
            Some(format!("'{description}' amount={amount}")),
            now,
        );
        Ok(line_id)
    }

    /// Removes a labour line and re-aggregates the item.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn delete_labour_line(
        &mut self,
        item_id: i64,
        line_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        self.require_staff(&actor, "remove labour line")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence.delete_labour_line(line_id)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "DeleteLabourLine",
            actor,
            "repair_item",
            item_id,
            Some(format!("line {line_id}")),
            now,
        );
        Ok(())
    }

    /// Removes a parts line and re-aggregates the item.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn delete_parts_line(
        &mut self,
        item_id: i64,
        line_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        self.require_staff(&actor, "remove parts line")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence.delete_parts_line(line_id)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "DeletePartsLine",
            actor,
            "repair_item",
            item_id,
            Some(format!("line {line_id}")),
            now,
        );
        Ok(())
    }

    /// Explicitly marks an item's labour side complete.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn mark_labour_complete(
        &mut self,
        item_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        let staff_id = self.require_staff(&actor, "mark labour complete")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence.mark_labour_complete(item_id, staff_id, now)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit("MarkLabourComplete", actor, "repair_item", item_id, None, now);
        Ok(())
    }

    /// Explicitly marks an item's parts side complete.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn mark_parts_complete(
        &mut self,
        item_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        let staff_id = self.require_staff(&actor, "mark parts complete")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence.mark_parts_complete(item_id, staff_id, now)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit("MarkPartsComplete", actor, "repair_item", item_id, None, now);
        Ok(())
    }

    /// Sets or clears the "no labour needed" flag.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn set_no_labour_required(
        &mut self,
        item_id: i64,
        flag: bool,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        let staff_id = self.require_staff(&actor, "set no-labour flag")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence
            .set_no_labour_required(item_id, flag, staff_id, now)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "SetNoLabourRequired",
            actor,
            "repair_item",
            item_id,
            Some(flag.to_string()),
            now,
        );
        Ok(())
    }

    /// Sets or clears the "no parts needed" flag.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn set_no_parts_required(
        &mut self,
        item_id: i64,
        flag: bool,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        let staff_id = self.require_staff(&actor, "set no-parts flag")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence
            .set_no_parts_required(item_id, flag, staff_id, now)?;
        self.reaggregate(item.job_id, item_id, now)?;
        self.audit(
            "SetNoPartsRequired",
            actor,
            "repair_item",
            item_id,
            Some(flag.to_string()),
            now,
        );
        Ok(())
    }

    /// Soft-deletes an item and re-folds the job's customer response,
    /// since removing an undecided item can complete the response.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-staff actors.
    pub fn delete_item(
        &mut self,
        item_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        self.require_staff(&actor, "remove repair item")?;
        let item = self.persistence.get_item(item_id)?;
        self.persistence.soft_delete_item(item_id)?;
        self.audit("DeleteRepairItem", actor, "repair_item", item_id, None, now);
        let job = self.persistence.get_job(item.job_id)?;
        self.refresh_customer_response(job, now)?;
        Ok(())
    }

    /// Records that an authorised item's work has been carried out.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the item is not authorised.
    pub fn mark_work_complete(
        &mut self,
        item_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        self.require_staff(&actor, "mark work complete")?;
        let item = self.persistence.get_item(item_id)?;
        let authorised = item.effective_outcome() == Some(OutcomeStatus::Authorised)
            || item.customer_approved == Some(true);
        if !authorised {
            return Err(EngineError::PreconditionFailed {
                reason: format!("item {item_id} is not authorised"),
            });
        }
        self.persistence.mark_work_complete(item_id, now)?;
        self.audit("MarkWorkComplete", actor, "repair_item", item_id, None, now);
        Ok(())
    }

    // ========================================================================
    // Sending & customer response
    // ========================================================================

    /// Issues a fresh public token for the job.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-privileged actors, or
    /// `PreconditionFailed` on a terminal job.
    pub fn issue_public_token(
        &mut self,
        job_id: i64,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<PublicToken, EngineError> {
        if !actor.role.is_privileged() {
            return Err(EngineError::Forbidden {
                action: String::from("issue public token"),
                required_role: String::from("advisor or admin"),
            });
        }
        let mut job = self.persistence.get_job(job_id)?;
        if job.status.is_terminal() {
            return Err(EngineError::PreconditionFailed {
                reason: format!("cannot issue a token for a {} job", job.status),
            });
        }
        let token = issue_token(self.policy.token_ttl_hours, now);
        job.public_token = Some(token.clone());
        job.updated_at = now;
        self.persistence.update_job(&job)?;
        self.audit("IssuePublicToken", actor, "job", job_id, None, now);
        Ok(token)
    }

    /// Sends the quote to the customer, issuing a token first when the
    /// job has none (or only an expired one).
    ///
    /// # Errors
    ///
    /// Returns the transition engine's rejection.
    pub fn send_quote(
        &mut self,
        job_id: i64,
        actor: Actor,
        note: Option<String>,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let job = if job.has_live_token(now) {
            job
        } else {
            self.issue_public_token(job_id, actor.clone(), now)?;
            self.persistence.get_job(job_id)?
        };
        let outcome = apply_transition(
            &job,
            JobStatus::Sent,
            actor,
            Source::User,
            note,
            &self.policy,
            now,
        )?;
        self.commit(outcome)
    }

    /// Records a single customer decision and re-folds the job's
    /// response status.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the item already carries a
    /// decision or the job is terminal.
    pub fn record_decision(
        &mut self,
        job_id: i64,
        decision: DecisionRequest,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        self.record_one_decision(&job, &decision, &actor, now)?;
        self.refresh_customer_response(job, now)
    }

    /// Records a batch of customer decisions, folding the response status
    /// once at the end.
    ///
    /// # Errors
    ///
    /// Fails on the first rejected decision; earlier decisions in the
    /// batch remain recorded.
    pub fn record_decisions(
        &mut self,
        job_id: i64,
        decisions: &[DecisionRequest],
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        for decision in decisions {
            self.record_one_decision(&job, decision, &actor, now)?;
        }
        self.refresh_customer_response(job, now)
    }

    // ========================================================================
    // Closure & expiry
    // ========================================================================

    /// Closes a job out through the outcome gate.
    ///
    /// # Errors
    ///
    /// Returns the gate's rejection listing every blocking item.
    pub fn close_job(
        &mut self,
        job_id: i64,
        actor: Actor,
        note: Option<String>,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let items = self.persistence.items_for_job(job_id)?;
        let outcome = apply_close(&job, &items, actor, note, now)?;
        self.commit(outcome)
    }

    /// Expires every non-terminal job whose public token has lapsed.
    ///
    /// Returns the ids of the jobs that moved. A job that changes status
    /// mid-sweep is skipped, not failed.
    ///
    /// # Errors
    ///
    /// Returns an error only for persistence failures other than losing
    /// the conditional update.
    pub fn sweep_expired(&mut self, now: OffsetDateTime) -> Result<Vec<i64>, EngineError> {
        let due = self.persistence.jobs_with_expired_tokens(now)?;
        let mut expired = Vec::new();
        for job in due {
            let outcome = match apply_transition(
                &job,
                JobStatus::Expired,
                Actor::system(),
                Source::System,
                Some(String::from("public token expired")),
                &self.policy,
                now,
            ) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(job_id = job.job_id, error = %err, "expiry sweep skipped job");
                    continue;
                }
            };
            match self.persistence.commit_transition(
                &outcome.job,
                outcome.prior_status,
                outcome.history.as_ref(),
            ) {
                Ok(()) => {
                    self.dispatch(&outcome.job, &outcome.effects);
                    expired.push(job.job_id);
                }
                Err(PersistenceError::StaleStatus { .. }) => {
                    warn!(job_id = job.job_id, "expiry sweep lost the race; skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "expiry sweep completed");
        }
        Ok(expired)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Persists a transition outcome and dispatches its effects.
    fn commit(&mut self, outcome: TransitionOutcome) -> Result<InspectionJob, EngineError> {
        if outcome.changed {
            self.persistence.commit_transition(
                &outcome.job,
                outcome.prior_status,
                outcome.history.as_ref(),
            )?;
        } else if let Some(entry) = &outcome.history {
            // Recorded no-op: one history row, no status write.
            self.persistence.append_history(entry)?;
        }
        self.dispatch(&outcome.job, &outcome.effects);
        Ok(outcome.job)
    }

    /// Dispatches effects to the collaborators, after the state write.
    fn dispatch(&mut self, job: &InspectionJob, effects: &[Effect]) {
        for effect in effects {
            let result = match effect {
                Effect::NotifyStatusChanged { job_id, from, to } => {
                    self.notifications.status_changed(*job_id, *from, *to)
                }
                Effect::NotifyTechnicianClockedIn {
                    job_id,
                    technician_id,
                } => self
                    .notifications
                    .technician_clocked_in(*job_id, *technician_id),
                Effect::NotifyTechnicianClockedOut {
                    job_id,
                    technician_id,
                    duration_minutes,
                } => self.notifications.technician_clocked_out(
                    *job_id,
                    *technician_id,
                    *duration_minutes,
                ),
                Effect::NotifyCustomerAction {
                    job_id,
                    action,
                    amount,
                } => self.notifications.customer_action(*job_id, action, *amount),
                Effect::ScheduleReminders {
                    job_id,
                    sent_at,
                    expires_at,
                } => self.reminders.schedule(*job_id, *sent_at, *expires_at),
                Effect::CancelReminders { job_id } => self.reminders.cancel(*job_id),
                Effect::AutoGenerateRepairItems { job_id } => {
                    self.generator.auto_generate(*job_id)
                }
                Effect::AutoCreateItemsFromFindings { job_id } => {
                    self.generator.from_flagged_findings(*job_id, job.site_id)
                }
                Effect::LogAudit(record) => self
                    .persistence
                    .log_audit(record)
                    .map(|_| ())
                    .map_err(|err| err.to_string())
                    .and(self.audit_sink.record(record)),
            };
            if let Err(reason) = result {
                warn!(job_id = job.job_id, %reason, "effect dispatch failed");
            }
        }
    }

    /// Writes an engine-originated audit record, best-effort.
    fn audit(
        &mut self,
        action: &str,
        actor: Actor,
        resource_type: &str,
        resource_id: i64,
        details: Option<String>,
        now: OffsetDateTime,
    ) {
        let record = AuditRecord::new(
            action.to_string(),
            actor,
            resource_type.to_string(),
            resource_id,
            details,
            now,
        );
        if let Err(err) = self.persistence.log_audit(&record) {
            warn!(action, resource_id, error = %err, "audit write failed");
        }
        if let Err(reason) = self.audit_sink.record(&record) {
            warn!(action, resource_id, %reason, "audit sink rejected record");
        }
    }

    fn require_staff(&self, actor: &Actor, action: &str) -> Result<i64, EngineError> {
        if !actor.role.is_staff() {
            return Err(EngineError::Forbidden {
                action: action.to_string(),
                required_role: String::from("staff"),
            });
        }
        actor.id.ok_or_else(|| EngineError::PreconditionFailed {
            reason: format!("'{action}' requires an identified staff actor"),
        })
    }

    /// Re-aggregates one item and runs the pricing-started cascade.
    fn reaggregate(
        &mut self,
        job_id: i64,
        item_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        let job = self.persistence.get_job(job_id)?;
        let item = self.persistence.get_item(item_id)?;
        let counts = self.persistence.line_counts(&item)?;
        let LineChangeOutcome { update, transition } =
            apply_line_change(&job, &item, &counts, &self.policy, now)?;
        if update.changed {
            self.persistence.apply_progress_update(&item, &update)?;
        }
        let (labour_total, parts_total) = self.persistence.line_totals(&item)?;
        if (labour_total, parts_total) != (item.labour_total, item.parts_total) {
            self.persistence
                .update_item_totals(item_id, labour_total, parts_total)?;
        }
        if let Some(outcome) = transition {
            self.commit(outcome)?;
        }
        Ok(())
    }

    fn record_one_decision(
        &mut self,
        job: &InspectionJob,
        decision: &DecisionRequest,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<(), EngineError> {
        if job.status.is_terminal() {
            return Err(EngineError::PreconditionFailed {
                reason: format!("cannot record decisions on a {} job", job.status),
            });
        }
        let item = self.persistence.get_item(decision.item_id)?;
        if item.job_id != job.job_id {
            return Err(EngineError::PreconditionFailed {
                reason: format!(
                    "item {} does not belong to job {}",
                    decision.item_id, job.job_id
                ),
            });
        }
        self.persistence.record_decision(
            decision.item_id,
            decision.approved,
            decision.selected_option_id,
            decision.reason.as_deref(),
            now,
        )?;
        // Selecting an option changes which lines count towards the item.
        self.reaggregate(job.job_id, decision.item_id, now)?;

        let item = self.persistence.get_item(decision.item_id)?;
        let amount = item.labour_total + item.parts_total;
        let action = if decision.approved {
            "authorised"
        } else {
            "declined"
        };
        self.dispatch(
            job,
            &[Effect::NotifyCustomerAction {
                job_id: job.job_id,
                action: action.to_string(),
                amount,
            }],
        );
        self.audit(
            "RecordDecision",
            actor.clone(),
            "repair_item",
            decision.item_id,
            Some(format!("{action} amount={amount}")),
            now,
        );
        Ok(())
    }

    /// Folds the stored decision tally back into the job status.
    fn refresh_customer_response(
        &mut self,
        job: InspectionJob,
        now: OffsetDateTime,
    ) -> Result<InspectionJob, EngineError> {
        let tally = self.persistence.decision_tally(job.job_id)?;
        let outcome = apply_customer_decisions(&job, &tally, Actor::system(), now)?;
        if outcome.changed {
            self.commit(outcome)
        } else {
            // Only timestamps moved; no history, no conditional write.
            self.persistence.update_job(&outcome.job)?;
            self.dispatch(&outcome.job, &outcome.effects);
            Ok(outcome.job)
        }
    }
}
