//! Task triggers: declarative rules that schedule a delayed task when a
//! clock transition of the right kind happens.
//!
//! Rules are written loosely in the config file (`TriggerSpec`) and turned
//! into a validated `TaskTrigger` before use. Combinations that make no
//! sense (a required text field that is not shown, a sound without an
//! alert, an empty day list, ...) are rejected at that point.

use crate::core::store::TriggerLedger;
use crate::errors::{AppError, AppResult};
use crate::models::clock_event::{ClockEvent, ClockEventKind};
use crate::models::session::{EmployeeId, SessionId};
use crate::models::task::ScheduledTask;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;

/// Longest accepted trigger delay (one year).
pub const MAX_DELAY_MINUTES: i64 = 366 * 24 * 60;

/// Trigger as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerSpec {
    pub name: String,
    pub on_event: Option<ClockEventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Weekday names ("mon", "Tuesday", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
    /// "HH:MM-HH:MM", local time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_firings_per_day: Option<u32>,
    pub delay_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub show_alert: bool,
    pub play_sound: bool,
    pub has_text_field: bool,
    pub text_field_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_field_label: Option<String>,
}

/// Set of weekdays, one bit per day starting from Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySet(u8);

impl DaySet {
    pub fn from_days(days: &[Weekday]) -> Self {
        DaySet(
            days.iter()
                .fold(0u8, |acc, d| acc | 1 << d.num_days_from_monday()),
        )
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut day = Weekday::Mon;
        let mut names = Vec::new();
        for _ in 0..7 {
            if self.contains(day) {
                names.push(format!("{:?}", day).to_lowercase());
            }
            day = day.succ();
        }
        write!(f, "{}", names.join(","))
    }
}

/// Local time-of-day window, start inclusive, end exclusive.
/// A window whose start is after its end wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn parse(s: &str) -> Result<Self, String> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| format!("time window '{}' is not HH:MM-HH:MM", s))?;
        let parse = |t: &str| {
            NaiveTime::parse_from_str(t.trim(), "%H:%M")
                .map_err(|_| format!("bad time '{}' in window '{}'", t.trim(), s))
        };
        let (start, end) = (parse(a)?, parse(b)?);
        if start == end {
            return Err(format!("time window '{}' is empty", s));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start < self.end {
            t >= self.start && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Only(Vec<EmployeeId>),
}

impl Audience {
    pub fn includes(&self, employee: &EmployeeId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Only(list) => list.contains(employee),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    Silent,
    Visible { sound: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextField {
    Hidden,
    Optional(String),
    Required(String),
}

impl TextField {
    pub fn label(&self) -> Option<&str> {
        match self {
            TextField::Hidden => None,
            TextField::Optional(l) | TextField::Required(l) => Some(l),
        }
    }
}

/// Validated trigger rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTrigger {
    pub name: String,
    pub on_event: ClockEventKind,
    pub enabled: bool,
    pub days: Option<DaySet>,
    pub window: Option<TimeWindow>,
    pub audience: Audience,
    pub max_firings_per_day: Option<NonZeroU32>,
    pub delay: Duration,
    pub title: String,
    pub alert: Alert,
    pub text_field: TextField,
}

impl TryFrom<&TriggerSpec> for TaskTrigger {
    type Error = AppError;

    fn try_from(spec: &TriggerSpec) -> Result<Self, Self::Error> {
        let name = spec.name.trim().to_string();
        let invalid = |msg: String| AppError::InvalidTrigger(format!("'{}': {}", name, msg));

        if name.is_empty() {
            return Err(AppError::InvalidTrigger("trigger without a name".into()));
        }

        let on_event = spec
            .on_event
            .ok_or_else(|| invalid("missing onEvent".into()))?;

        let days = match &spec.days {
            None => None,
            Some(list) if list.is_empty() => return Err(invalid("empty day list".into())),
            Some(list) => {
                let parsed = list
                    .iter()
                    .map(|d| {
                        d.trim()
                            .parse::<Weekday>()
                            .map_err(|_| invalid(format!("unknown weekday '{}'", d)))
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                Some(DaySet::from_days(&parsed))
            }
        };

        let window = spec
            .time_window
            .as_deref()
            .map(TimeWindow::parse)
            .transpose()
            .map_err(invalid)?;

        let audience = match &spec.assigned_to {
            None => Audience::Everyone,
            Some(list) if list.is_empty() => return Err(invalid("empty assignee list".into())),
            Some(list) => Audience::Only(
                list.iter()
                    .map(|e| EmployeeId::new(e.as_str()))
                    .collect::<AppResult<Vec<_>>>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
        };

        let max_firings_per_day = match spec.max_firings_per_day {
            None => None,
            Some(n) => Some(NonZeroU32::new(n).ok_or_else(|| invalid("firing cap of 0".into()))?),
        };

        if spec.delay_minutes < 0 {
            return Err(invalid(format!("negative delay {}", spec.delay_minutes)));
        }
        if spec.delay_minutes > MAX_DELAY_MINUTES {
            return Err(invalid(format!(
                "delay {} exceeds {} minutes",
                spec.delay_minutes, MAX_DELAY_MINUTES
            )));
        }
        let delay = Duration::try_minutes(spec.delay_minutes)
            .ok_or_else(|| invalid(format!("delay {} out of range", spec.delay_minutes)))?;

        let alert = match (spec.show_alert, spec.play_sound) {
            (false, true) => return Err(invalid("playSound requires showAlert".into())),
            (false, false) => Alert::Silent,
            (true, sound) => Alert::Visible { sound },
        };

        let label = spec
            .text_field_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());
        let text_field = match (spec.has_text_field, spec.text_field_required) {
            (false, true) => {
                return Err(invalid("textFieldRequired without hasTextField".into()));
            }
            (false, false) if label.is_some() => {
                return Err(invalid("textFieldLabel without hasTextField".into()));
            }
            (false, false) => TextField::Hidden,
            (true, false) => TextField::Optional(label.unwrap_or("Notes").to_string()),
            (true, true) => TextField::Required(label.unwrap_or("Notes").to_string()),
        };

        let title = spec
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&name)
            .to_string();

        Ok(TaskTrigger {
            on_event,
            enabled: spec.enabled.unwrap_or(true),
            days,
            window,
            audience,
            max_firings_per_day,
            delay,
            title,
            alert,
            text_field,
            name,
        })
    }
}

impl TaskTrigger {
    /// Event-type, assignee, weekday and time-window checks (no firing cap).
    pub fn matches(&self, event: &ClockEvent, offset: FixedOffset) -> bool {
        if !self.enabled || self.on_event != event.kind {
            return false;
        }
        if !self.audience.includes(&event.employee_id) {
            return false;
        }

        let local = event.at.with_timezone(&offset);
        if let Some(days) = self.days
            && !days.contains(local.weekday())
        {
            return false;
        }
        if let Some(window) = self.window
            && !window.contains(local.time())
        {
            return false;
        }
        true
    }

    /// The task for `event`, due `delay` after it.
    pub fn schedule(&self, event: &ClockEvent) -> AppResult<ScheduledTask> {
        let (show_alert, play_sound) = match self.alert {
            Alert::Silent => (false, false),
            Alert::Visible { sound } => (true, sound),
        };
        let due_at = event.at.checked_add_signed(self.delay).ok_or_else(|| {
            AppError::InvalidTrigger(format!(
                "'{}': due time of event at {} is out of range",
                self.name, event.at
            ))
        })?;
        Ok(ScheduledTask {
            id: 0,
            trigger: self.name.clone(),
            employee_id: event.employee_id.clone(),
            session_id: event.session_id,
            event: event.kind,
            fired_at: event.at,
            due_at,
            title: self.title.clone(),
            show_alert,
            play_sound,
            text_field: self.text_field.label().map(str::to_string),
            text_required: matches!(self.text_field, TextField::Required(_)),
        })
    }
}

/// Validated trigger set evaluated in a fixed local offset.
#[derive(Debug, Clone)]
pub struct TriggerEngine {
    triggers: Vec<TaskTrigger>,
    offset: FixedOffset,
}

impl TriggerEngine {
    pub fn new(triggers: Vec<TaskTrigger>, offset: FixedOffset) -> Self {
        Self { triggers, offset }
    }

    /// Validate every spec; names must be unique.
    pub fn from_specs(specs: &[TriggerSpec], offset: FixedOffset) -> AppResult<Self> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::with_capacity(specs.len());
        for spec in specs {
            let t = TaskTrigger::try_from(spec)?;
            if !seen.insert(t.name.clone()) {
                return Err(AppError::InvalidTrigger(format!(
                    "duplicate trigger name '{}'",
                    t.name
                )));
            }
            triggers.push(t);
        }
        Ok(Self::new(triggers, offset))
    }

    pub fn triggers(&self) -> &[TaskTrigger] {
        &self.triggers
    }

    pub fn find(&self, name: &str) -> Option<&TaskTrigger> {
        self.triggers.iter().find(|t| t.name == name)
    }

    /// Run every trigger against `event`, record and return the tasks scheduled.
    pub fn dispatch<L: TriggerLedger>(
        &self,
        ledger: &mut L,
        event: &ClockEvent,
    ) -> AppResult<Vec<ScheduledTask>> {
        let mut scheduled = Vec::new();
        for trigger in &self.triggers {
            if let Some(task) = self.try_schedule(ledger, trigger, event)? {
                scheduled.push(task);
            }
        }
        Ok(scheduled)
    }

    /// Fire a `Manual` trigger by name. `None` when the rule filters the event out
    /// or its daily cap is reached.
    pub fn fire_manual<L: TriggerLedger>(
        &self,
        ledger: &mut L,
        name: &str,
        employee: &EmployeeId,
        session: Option<SessionId>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<ScheduledTask>> {
        let trigger = self
            .find(name)
            .ok_or_else(|| AppError::InvalidTrigger(format!("no trigger named '{}'", name)))?;

        if trigger.on_event != ClockEventKind::Manual {
            return Err(AppError::InvalidTrigger(format!(
                "'{}' fires on {:?}, not manually",
                name, trigger.on_event
            )));
        }

        let event = ClockEvent::new(ClockEventKind::Manual, employee.clone(), session, at);
        self.try_schedule(ledger, trigger, &event)
    }

    fn try_schedule<L: TriggerLedger>(
        &self,
        ledger: &mut L,
        trigger: &TaskTrigger,
        event: &ClockEvent,
    ) -> AppResult<Option<ScheduledTask>> {
        if !trigger.matches(event, self.offset) {
            return Ok(None);
        }

        if let Some(cap) = trigger.max_firings_per_day {
            let (from, to) = self.local_day_bounds(event.at)?;
            let fired = ledger.firing_count(&trigger.name, &event.employee_id, from, to)?;
            if fired >= cap.get() {
                return Ok(None);
            }
        }

        let task = ledger.record_task(&trigger.schedule(event)?)?;
        Ok(Some(task))
    }

    /// `[midnight, next midnight)` of the local day containing `at`, in UTC.
    fn local_day_bounds(&self, at: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let day = at.with_timezone(&self.offset).date_naive();
        let start = day
            .and_time(NaiveTime::MIN)
            .and_local_timezone(self.offset)
            .single()
            .ok_or_else(|| AppError::Other(format!("cannot resolve local midnight of {}", day)))?
            .with_timezone(&Utc);
        Ok((start, start + Duration::days(1)))
    }
}
